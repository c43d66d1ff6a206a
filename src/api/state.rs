use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::observability::Metrics;
use crate::proxy::{AudioProxy, ProxyError};
use crate::storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<AudioProxy>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &ProxyConfig, store: Arc<dyn BlobStore>) -> Result<Self, ProxyError> {
        let metrics = Arc::new(Metrics::new());
        let proxy = AudioProxy::new(config, store, metrics.clone())?;

        Ok(Self {
            proxy: Arc::new(proxy),
            metrics,
        })
    }
}
