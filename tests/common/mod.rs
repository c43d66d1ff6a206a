#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use audioproxy::api::state::AppState;
use audioproxy::config::Config;
use audioproxy::storage::{
    BlobInfo, BlobStore, CachedBlob, Permission, Result, StorageClient, StorageError,
};

pub const TEST_USER_AGENT: &str = "AudioProxy/test";

/// In-memory store that counts calls and can refuse writes
pub struct CountingStore {
    inner: StorageClient,
    heads: AtomicUsize,
    gets: AtomicUsize,
    puts: AtomicUsize,
    fail_writes: bool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    pub fn failing_writes() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_writes: bool) -> Self {
        Self {
            inner: StorageClient::in_memory(),
            heads: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            fail_writes,
        }
    }

    pub fn heads(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for CountingStore {
    async fn head(&self, bucket: &str, key: &str) -> Result<Option<BlobInfo>> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        self.inner.head(bucket, key).await
    }

    async fn get(
        &self,
        bucket: &str,
        key: &str,
        range: Option<Range<u64>>,
    ) -> Result<Option<CachedBlob>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(bucket, key, range).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        permissions: &[Permission],
    ) -> Result<BlobInfo> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StorageError::UploadFailed(format!("{key}: quota exceeded")));
        }
        self.inner
            .put(bucket, key, data, content_type, permissions)
            .await
    }
}

/// Config whose allow-list holds the given hosts
pub fn test_config(origins: &[&str]) -> Config {
    let mut config = Config::default();
    config.proxy.allowed_origins = origins.iter().map(|host| host.to_string()).collect();
    config.proxy.user_agent = TEST_USER_AGENT.to_string();
    config
}

/// Router whose allow-list admits the local mock origin
pub fn build_app(store: Arc<CountingStore>) -> Router {
    build_app_with(test_config(&["127.0.0.1", "mp3d.jamendo.com"]), store)
}

pub fn build_app_with(config: Config, store: Arc<CountingStore>) -> Router {
    let state = AppState::new(&config.proxy, store).expect("proxy should build");
    audioproxy::api::router(state)
}

/// Percent-encode a URL for the `url` query parameter
pub fn encode(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

pub fn fake_mp3(len: usize) -> Vec<u8> {
    let mut data = b"ID3".to_vec();
    data.extend((0..len.saturating_sub(3)).map(|i| (i % 251) as u8));
    data
}
