use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use super::{AudioProxy, ProxyError, headers};

/// Relayed response: upstream status and bytes under the assembled header set
#[derive(Debug)]
pub struct StreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StreamResponse {
    /// CORS preflight answer
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: headers::cors_headers(),
            body: Bytes::new(),
        }
    }
}

impl AudioProxy {
    /// Relay the origin response for `raw`, forwarding `range` for seeking.
    ///
    /// `OPTIONS` short-circuits to a preflight answer before the URL is looked
    /// at. Upstream error statuses are passed through, not turned into errors.
    pub async fn stream(
        &self,
        method: &Method,
        raw: Option<&str>,
        range: Option<&HeaderValue>,
    ) -> Result<StreamResponse, ProxyError> {
        if method == Method::OPTIONS {
            return Ok(StreamResponse::preflight());
        }

        let target = self.target(raw)?;
        let host = target.host();

        let upstream_method = if method == Method::HEAD {
            Method::HEAD
        } else {
            Method::GET
        };

        let response = self
            .origin
            .fetch(upstream_method, &target, range)
            .await
            .inspect_err(|e| {
                self.metrics.upstream_failed();
                warn!(host, error = %e, "Origin unreachable");
            })?;

        let status = response.status;
        if status.is_success() {
            self.metrics.stream_served();
            debug!(host, status = status.as_u16(), size = response.body.len(), "Relayed audio");
        } else {
            self.metrics.upstream_failed();
            warn!(host, status = status.as_u16(), "Origin returned error status");
        }

        Ok(StreamResponse {
            status,
            headers: headers::audio_headers(&response.headers),
            body: response.body,
        })
    }
}
