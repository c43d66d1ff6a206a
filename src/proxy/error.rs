use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing url parameter")]
    MissingParameter,

    #[error("Invalid url: {0}")]
    MalformedUrl(String),

    /// The host is kept for logs only; callers just learn it was refused
    #[error("Unauthorized domain")]
    ForbiddenOrigin { host: String },

    #[error("Failed to fetch audio: upstream returned {status}")]
    UpstreamFetchFailed { status: StatusCode },

    #[error("Failed to reach origin: {0}")]
    UpstreamUnreachable(String),

    #[error("Cache lookup failed: {0}")]
    CacheLookupFailed(#[source] StorageError),

    #[error("Failed to cache audio: {0}")]
    CacheWriteFailed(#[source] StorageError),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingParameter | ProxyError::MalformedUrl(_) => StatusCode::BAD_REQUEST,
            ProxyError::ForbiddenOrigin { .. } => StatusCode::FORBIDDEN,
            ProxyError::UpstreamFetchFailed { .. }
            | ProxyError::UpstreamUnreachable(_)
            | ProxyError::CacheLookupFailed(_)
            | ProxyError::CacheWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::MissingParameter => "MISSING_PARAMETER",
            ProxyError::MalformedUrl(_) => "MALFORMED_URL",
            ProxyError::ForbiddenOrigin { .. } => "FORBIDDEN_ORIGIN",
            ProxyError::UpstreamFetchFailed { .. } => "UPSTREAM_FETCH_FAILED",
            ProxyError::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            ProxyError::CacheLookupFailed(_) => "CACHE_LOOKUP_FAILED",
            ProxyError::CacheWriteFailed(_) => "CACHE_WRITE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_facing_messages() {
        assert_eq!(ProxyError::MissingParameter.to_string(), "Missing url parameter");
        assert_eq!(
            ProxyError::ForbiddenOrigin {
                host: "evil.example.com".into()
            }
            .to_string(),
            "Unauthorized domain"
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ProxyError::MissingParameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::MalformedUrl("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::ForbiddenOrigin { host: "a".into() }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ProxyError::UpstreamFetchFailed {
                status: StatusCode::NOT_FOUND
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::CacheWriteFailed(StorageError::UploadFailed("disk full".into()))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_status_is_in_message() {
        let err = ProxyError::UpstreamFetchFailed {
            status: StatusCode::BAD_GATEWAY,
        };
        assert!(err.to_string().contains("502"));
        assert!(!err.status_code().is_client_error());
    }
}
