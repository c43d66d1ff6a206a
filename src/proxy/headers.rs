use reqwest::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, HeaderMap, HeaderValue,
};

pub const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";
pub const CACHE_DIRECTIVE: &str = "public, max-age=86400";

const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "Range, Content-Type";
const EXPOSE_HEADERS: &str = "Content-Length, Content-Range, Accept-Ranges";

/// Upstream headers copied verbatim when present
const PASSTHROUGH: [reqwest::header::HeaderName; 3] = [CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES];

pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers
}

/// CORS set + content type, 24h cache directive and the upstream's
/// length/range headers
pub fn audio_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = cors_headers();

    let content_type = upstream
        .get(CONTENT_TYPE)
        .filter(|value| media_type(value).is_some())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_DIRECTIVE));

    for name in PASSTHROUGH {
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }

    headers
}

/// Upstream content types that do not parse as a media type are replaced
fn media_type(value: &HeaderValue) -> Option<mime::Mime> {
    value.to_str().ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_set_is_complete() {
        let headers = cors_headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, HEAD, OPTIONS");
        assert!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS]
                .to_str()
                .unwrap()
                .contains("Range")
        );
        assert_eq!(
            headers[ACCESS_CONTROL_EXPOSE_HEADERS],
            "Content-Length, Content-Range, Accept-Ranges"
        );
    }

    #[test]
    fn defaults_content_type() {
        let headers = audio_headers(&HeaderMap::new());
        assert_eq!(headers[CONTENT_TYPE], "audio/mpeg");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=86400");
        assert!(headers.get(CONTENT_LENGTH).is_none());
        assert!(headers.get(CONTENT_RANGE).is_none());
    }

    #[test]
    fn forwards_range_headers_verbatim() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("audio/ogg"));
        upstream.insert(CONTENT_LENGTH, HeaderValue::from_static("100"));
        upstream.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 100-199/5000"));
        upstream.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        upstream.insert("set-cookie", HeaderValue::from_static("session=1"));

        let headers = audio_headers(&upstream);
        assert_eq!(headers[CONTENT_TYPE], "audio/ogg");
        assert_eq!(headers[CONTENT_LENGTH], "100");
        assert_eq!(headers[CONTENT_RANGE], "bytes 100-199/5000");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
        assert!(headers.get("set-cookie").is_none());
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn garbage_content_type_falls_back() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("not a media type"));

        let headers = audio_headers(&upstream);
        assert_eq!(headers[CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }
}
