//! API models for the audio proxy endpoints.
//!
//! - `GET /v1/audio/resolve?url=...` returns a [`ResolveResponse`]
//! - `GET|HEAD|OPTIONS /v1/audio/stream?url=...` relays raw audio bytes
//! - `GET /v1/audio/files/{file_id}` serves a cached blob
//!
//! The `url` parameter is a percent-encoded absolute URL, e.g.
//! `url=https%3A%2F%2Fmp3d.jamendo.com%2Ftrack%2F12345%2Fmp3`.
//!
//! ```json
//! {"success": true, "fileId": "jamendo_12345"}
//! {"success": false, "error": "Unauthorized domain"}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Default)]
pub struct AudioQuery {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveResponse {
    pub fn cached(file_id: impl Into<String>) -> Self {
        Self {
            success: true,
            file_id: Some(file_id.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_shape() {
        let json = serde_json::to_value(ResolveResponse::cached("jamendo_12345")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "fileId": "jamendo_12345"}));
    }

    #[test]
    fn failure_shape() {
        let json = serde_json::to_value(ResolveResponse::failure("Missing url parameter")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Missing url parameter"})
        );
    }
}
