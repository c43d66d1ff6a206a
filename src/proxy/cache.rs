use reqwest::Method;
use tracing::{error, info, warn};

use super::{AudioProxy, CacheKey, ProxyError, headers::DEFAULT_CONTENT_TYPE};
use crate::storage::Permission;

impl AudioProxy {
    /// Make sure the audio behind `raw` is in the blob store and return its key.
    ///
    /// Probe, fetch and write run strictly in that order. A hit returns without
    /// touching the origin. Concurrent misses on the same key may both fetch
    /// and write; the store keeps the last write and both callers get the
    /// same key.
    pub async fn resolve(&self, raw: Option<&str>) -> Result<CacheKey, ProxyError> {
        let target = self.target(raw)?;
        let key = CacheKey::derive(&target);
        let host = target.host();

        match self.store.head(&self.bucket, key.as_str()).await {
            Ok(Some(_)) => {
                self.metrics.cache_hit();
                info!(host, key = %key, "Cache hit");
                return Ok(key);
            }
            Ok(None) => {}
            Err(e) => {
                error!(host, key = %key, error = %e, "Cache lookup failed");
                return Err(ProxyError::CacheLookupFailed(e));
            }
        }

        let response = self
            .origin
            .fetch(Method::GET, &target, None)
            .await
            .inspect_err(|e| {
                self.metrics.upstream_failed();
                warn!(host, key = %key, error = %e, "Origin unreachable");
            })?;

        if !response.status.is_success() {
            self.metrics.upstream_failed();
            warn!(host, key = %key, status = response.status.as_u16(), "Origin fetch failed");
            return Err(ProxyError::UpstreamFetchFailed {
                status: response.status,
            });
        }

        let size = response.body.len();
        self.store
            .put(
                &self.bucket,
                key.as_str(),
                response.body,
                DEFAULT_CONTENT_TYPE,
                &[Permission::PublicRead],
            )
            .await
            .map_err(|e| {
                self.metrics.cache_write_failed();
                error!(host, key = %key, error = %e, "Cache write failed");
                ProxyError::CacheWriteFailed(e)
            })?;

        self.metrics.cache_filled();
        info!(host, key = %key, size, provider = key.is_provider_key(), "Cached audio from origin");

        Ok(key)
    }
}
