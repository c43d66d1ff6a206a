//! Logging setup and proxy counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug)]
pub struct Metrics {
    started_at: chrono::DateTime<chrono::Utc>,
    cache_hits: AtomicU64,
    cache_fills: AtomicU64,
    upstream_failures: AtomicU64,
    cache_write_failures: AtomicU64,
    rejected_requests: AtomicU64,
    streams_served: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            started_at: chrono::Utc::now(),
            cache_hits: AtomicU64::new(0),
            cache_fills: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
            cache_write_failures: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            streams_served: AtomicU64::new(0),
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_hits", "Metric incremented");
    }

    pub fn cache_filled(&self) {
        self.cache_fills.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_fills", "Metric incremented");
    }

    pub fn upstream_failed(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "upstream_failures", "Metric incremented");
    }

    pub fn cache_write_failed(&self) {
        self.cache_write_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_write_failures", "Metric incremented");
    }

    pub fn request_rejected(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rejected_requests", "Metric incremented");
    }

    pub fn stream_served(&self) {
        self.streams_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "streams_served", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_fills: self.cache_fills.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            cache_write_failures: self.cache_write_failures.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            streams_served: self.streams_served.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub cache_hits: u64,
    pub cache_fills: u64,
    pub upstream_failures: u64,
    pub cache_write_failures: u64,
    pub rejected_requests: u64,
    pub streams_served: u64,
}
