//! API utility functions
//!
//! Pure, stateless helpers for HTTP request processing, kept out of
//! services.rs so they can be unit tested on their own.

use axum::response::{IntoResponse, Response};
use std::ops::Range;

use crate::proxy::StreamResponse;

/// Outcome of interpreting a `Range` header against an object size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: serve the whole object
    Full,
    /// Half-open byte range within the object
    Partial(Range<u64>),
    Unsatisfiable,
}

/// Parses a single `bytes=` range.
///
/// Accepts `a-b`, `a-` and `-n`. Multi-range requests, other units and
/// malformed values are ignored (whole object), as RFC 9110 allows.
pub fn parse_range(header: Option<&str>, size: u64) -> ByteRange {
    let Some(header) = header else {
        return ByteRange::Full;
    };

    let Some(ranges) = header
        .trim()
        .strip_prefix("bytes=")
        .filter(|ranges| !ranges.contains(','))
    else {
        return ByteRange::Full;
    };

    let Some((start, end)) = ranges.trim().split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        // -n: final n bytes
        (true, false) => {
            let Ok(suffix) = end.parse::<u64>() else {
                return ByteRange::Full;
            };
            if suffix == 0 || size == 0 {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial(size.saturating_sub(suffix)..size)
        }
        // a-
        (false, true) => {
            let Ok(first) = start.parse::<u64>() else {
                return ByteRange::Full;
            };
            if first >= size {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial(first..size)
        }
        // a-b, inclusive
        (false, false) => {
            let (Ok(first), Ok(last)) = (start.parse::<u64>(), end.parse::<u64>()) else {
                return ByteRange::Full;
            };
            if first > last {
                return ByteRange::Full;
            }
            if first >= size {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial(first..last.min(size - 1) + 1)
        }
        (true, true) => ByteRange::Full,
    }
}

/// `Content-Range` value for a served half-open range
pub fn content_range(range: &Range<u64>, size: u64) -> String {
    format!("bytes {}-{}/{}", range.start, range.end.saturating_sub(1), size)
}

impl IntoResponse for StreamResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header_is_full() {
        assert_eq!(parse_range(None, 100), ByteRange::Full);
    }

    #[test]
    fn test_bounded_range() {
        assert_eq!(parse_range(Some("bytes=0-9"), 100), ByteRange::Partial(0..10));
        assert_eq!(parse_range(Some("bytes=90-200"), 100), ByteRange::Partial(90..100));
        assert_eq!(parse_range(Some("bytes=5-5"), 100), ByteRange::Partial(5..6));
    }

    #[test]
    fn test_open_and_suffix_ranges() {
        assert_eq!(parse_range(Some("bytes=40-"), 100), ByteRange::Partial(40..100));
        assert_eq!(parse_range(Some("bytes=-10"), 100), ByteRange::Partial(90..100));
        assert_eq!(parse_range(Some("bytes=-500"), 100), ByteRange::Partial(0..100));
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(parse_range(Some("bytes=100-"), 100), ByteRange::Unsatisfiable);
        assert_eq!(parse_range(Some("bytes=150-160"), 100), ByteRange::Unsatisfiable);
        assert_eq!(parse_range(Some("bytes=-0"), 100), ByteRange::Unsatisfiable);
        assert_eq!(parse_range(Some("bytes=-5"), 0), ByteRange::Unsatisfiable);
    }

    #[test]
    fn test_ignored_ranges() {
        for header in ["items=0-5", "bytes=0-5,10-15", "bytes=abc-", "bytes=9-3", "bytes=-", "bytes"] {
            assert_eq!(parse_range(Some(header), 100), ByteRange::Full, "{header}");
        }
    }

    #[test]
    fn test_content_range() {
        assert_eq!(content_range(&(0..10), 100), "bytes 0-9/100");
        assert_eq!(content_range(&(90..100), 100), "bytes 90-99/100");
    }
}
