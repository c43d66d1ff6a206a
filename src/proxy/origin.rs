//! HTTP client for origin media hosts

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, RANGE};
use reqwest::{Client, Method, StatusCode, redirect};
use std::time::Duration;
use tracing::debug;

use super::{allowlist::AllowedOrigins, error::ProxyError, target::OriginUrl};
use crate::config::ProxyConfig;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&ProxyConfig::default())
    }
}

impl From<&ProxyConfig> for HttpConfig {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
            max_redirects: config.max_redirects,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// What came back from the origin
#[derive(Debug)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Origin fetcher. No retries: one request per call.
#[derive(Clone)]
pub struct OriginClient {
    client: Client,
}

impl OriginClient {
    /// Redirects are followed only while they stay on allow-listed hosts
    pub fn new(config: &HttpConfig, origins: AllowedOrigins) -> Result<Self, ProxyError> {
        let max_redirects = config.max_redirects;
        let policy = redirect::Policy::custom(move |attempt| {
            // `previous()` holds the original URL plus every hop already taken
            if attempt.previous().len() > max_redirects {
                attempt.error("too many redirects")
            } else if attempt.url().host_str().is_some_and(|host| origins.permits(host)) {
                attempt.follow()
            } else {
                attempt.stop()
            }
        });

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(policy);

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ProxyError::UpstreamUnreachable(format!("client setup failed: {e}")))?;

        Ok(Self { client })
    }

    /// Issue one request; any HTTP status is returned, only transport failures error
    pub async fn fetch(
        &self,
        method: Method,
        target: &OriginUrl,
        range: Option<&HeaderValue>,
    ) -> Result<OriginResponse, ProxyError> {
        debug!(host = target.host(), %method, ranged = range.is_some(), "Fetching from origin");

        let mut request = self.client.request(method, target.url().clone());
        if let Some(range) = range {
            request = request.header(RANGE, range.clone());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProxyError::UpstreamUnreachable("connection timeout".into())
            } else if e.is_redirect() {
                ProxyError::UpstreamUnreachable("too many redirects".into())
            } else {
                ProxyError::UpstreamUnreachable(e.to_string())
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable(format!("failed to read body: {e}")))?;

        debug!(host = target.host(), status = status.as_u16(), size = body.len(), "Origin responded");

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("AudioProxy/"));
    }

    #[test]
    fn test_http_config_from_proxy_config() {
        let proxy = ProxyConfig {
            request_timeout_secs: Some(30),
            user_agent: "Test/1.0".to_string(),
            ..ProxyConfig::default()
        };

        let config = HttpConfig::from(&proxy);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.user_agent, "Test/1.0");
    }
}
