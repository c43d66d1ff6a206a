use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use thiserror::Error;

use super::models::ResolveResponse;
use crate::proxy::{ProxyError, headers::cors_headers};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable { size: u64 },
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Proxy(err) => err.status_code(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Proxy(err) => err.code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::RangeNotSatisfiable { .. } => "RANGE_NOT_SATISFIABLE",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// `{"success": false, "error": ...}` with CORS headers so browsers can read it
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::info!(code, error = %self, "Request refused");
        }

        let mut headers = cors_headers();

        if let ApiError::RangeNotSatisfiable { size } = &self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                headers.insert(header::CONTENT_RANGE, value);
            }
        }

        let body = ResolveResponse::failure(self.to_string());
        (status, headers, Json(body)).into_response()
    }
}
