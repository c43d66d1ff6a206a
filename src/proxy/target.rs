use url::Url;

use super::{allowlist::AllowedOrigins, error::ProxyError};

/// An origin URL that passed validation and the allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginUrl {
    raw: String,
    url: Url,
}

impl OriginUrl {
    /// Validate the `url` query value (already percent-decoded once).
    ///
    /// Runs before any network or storage access.
    pub fn parse(raw: Option<&str>, origins: &AllowedOrigins) -> Result<Self, ProxyError> {
        let raw = raw
            .filter(|value| !value.trim().is_empty())
            .ok_or(ProxyError::MissingParameter)?;

        let url = Url::parse(raw).map_err(|e| ProxyError::MalformedUrl(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProxyError::MalformedUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ProxyError::MalformedUrl("url has no host".into()))?;

        if !origins.permits(host) {
            return Err(ProxyError::ForbiddenOrigin {
                host: host.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    /// The string exactly as the caller sent it
    pub fn as_raw(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}
