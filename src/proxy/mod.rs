//! Audio cache proxy
//!
//! Two operations share URL validation and the allow-list:
//!
//! - [`AudioProxy::resolve`] caches the origin bytes in the blob store and
//!   returns the cache key (`fileId`) the client reads the file by.
//! - [`AudioProxy::stream`] relays the origin response (status, range headers,
//!   bytes) with CORS headers added, without touching storage.
//!
//! Each call is independent; no state is shared between requests except the
//! blob store itself.

mod allowlist;
mod cache;
mod error;
pub mod headers;
mod key;
mod origin;
mod stream;
mod target;

pub use allowlist::AllowedOrigins;
pub use error::ProxyError;
pub use key::{CacheKey, PROVIDER_NAMESPACE};
pub use origin::{HttpConfig, OriginClient, OriginResponse};
pub use stream::StreamResponse;
pub use target::OriginUrl;

use std::sync::Arc;
use tracing::info;

use crate::config::ProxyConfig;
use crate::observability::Metrics;
use crate::storage::BlobStore;

pub struct AudioProxy {
    store: Arc<dyn BlobStore>,
    origin: OriginClient,
    origins: AllowedOrigins,
    bucket: String,
    metrics: Arc<Metrics>,
}

impl AudioProxy {
    pub fn new(
        config: &ProxyConfig,
        store: Arc<dyn BlobStore>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ProxyError> {
        let origins = AllowedOrigins::new(&config.allowed_origins);
        let origin = OriginClient::new(&HttpConfig::from(config), origins.clone())?;

        Ok(Self {
            store,
            origin,
            origins,
            bucket: config.cache_bucket.clone(),
            metrics,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn origins(&self) -> &AllowedOrigins {
        &self.origins
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Validate the `url` parameter; rejections are logged as client errors
    fn target(&self, raw: Option<&str>) -> Result<OriginUrl, ProxyError> {
        OriginUrl::parse(raw, &self.origins).inspect_err(|err| {
            self.metrics.request_rejected();
            match err {
                ProxyError::ForbiddenOrigin { host } => {
                    info!(host = %host, "Rejected request for unauthorized domain")
                }
                other => info!(reason = %other, "Rejected request"),
            }
        })
    }
}
