//! Blob storage for cached audio
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, GetRange, ObjectStore, PutOptions,
    PutPayload, path::Path as StoragePath,
};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Storage backend misconfigured: {0}")]
    Misconfigured(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

const PERMISSIONS_METADATA_KEY: &str = "permissions";

/// Access grant recorded alongside a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Anyone may read the blob
    PublicRead,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::PublicRead => f.write_str("read(any)"),
        }
    }
}

/// Metadata returned by a lookup or after upload
#[derive(Debug, Clone)]
pub struct BlobInfo {
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
}

/// Blob bytes plus what is needed to serve them
#[derive(Debug, Clone)]
pub struct CachedBlob {
    pub data: Bytes,
    pub content_type: Option<String>,
    /// Byte range of the whole object that `data` covers
    pub range: Range<u64>,
    /// Total object size
    pub size: u64,
}

/// Bucket-addressed blob store.
///
/// "Not found" is a regular outcome (`Ok(None)`), never an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn head(&self, bucket: &str, key: &str) -> Result<Option<BlobInfo>>;

    /// Read a blob, optionally a sub-range of it
    async fn get(
        &self,
        bucket: &str,
        key: &str,
        range: Option<Range<u64>>,
    ) -> Result<Option<CachedBlob>>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        permissions: &[Permission],
    ) -> Result<BlobInfo>;
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    /// Whether the backend persists object attributes (content type, metadata)
    attributes: bool,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, attributes: bool) -> Self {
        Self { store, attributes }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()), true)
    }

    /// Build the backend named by the storage configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.provider {
            StorageProvider::Memory => Ok(Self::in_memory()),
            StorageProvider::Local => {
                std::fs::create_dir_all(&config.root).map_err(|e| {
                    StorageError::Misconfigured(format!(
                        "cannot create {}: {}",
                        config.root.display(),
                        e
                    ))
                })?;
                let store = object_store::local::LocalFileSystem::new_with_prefix(&config.root)?;
                // Local files carry no attributes; content type is implied on read
                Ok(Self::new(Arc::new(store), false))
            }
            StorageProvider::S3 => {
                let bucket = config.bucket.as_deref().ok_or_else(|| {
                    StorageError::Misconfigured("s3 provider requires storage.bucket".into())
                })?;

                let mut builder = object_store::aws::AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(config.region.as_deref().unwrap_or("us-east-1"));

                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                if let Some(access_key) = &config.access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = &config.secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }

                Ok(Self::new(Arc::new(builder.build()?), true))
            }
        }
    }

    fn path(bucket: &str, key: &str) -> StoragePath {
        StoragePath::from(format!("{bucket}/{key}"))
    }
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn head(&self, bucket: &str, key: &str) -> Result<Option<BlobInfo>> {
        let path = Self::path(bucket, key);

        match self.store.head(&path).await {
            Ok(meta) => Ok(Some(BlobInfo {
                key: key.to_string(),
                size: meta.size as u64,
                etag: meta.e_tag,
            })),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(
        &self,
        bucket: &str,
        key: &str,
        range: Option<Range<u64>>,
    ) -> Result<Option<CachedBlob>> {
        let path = Self::path(bucket, key);
        let options = GetOptions {
            range: range.map(GetRange::Bounded),
            ..Default::default()
        };

        let result = match self.store.get_opts(&path, options).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| {
                let value: &str = value.as_ref();
                value.to_string()
            });
        let size = result.meta.size as u64;
        let covered = result.range.start as u64..result.range.end as u64;

        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("{key}: {e}")))?;

        tracing::debug!(bucket, key, size = data.len(), "Read from storage");

        Ok(Some(CachedBlob {
            data,
            content_type,
            range: covered,
            size,
        }))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        permissions: &[Permission],
    ) -> Result<BlobInfo> {
        let path = Self::path(bucket, key);
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        if self.attributes {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
            if !permissions.is_empty() {
                let grants = permissions
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                attributes.insert(
                    Attribute::Metadata(PERMISSIONS_METADATA_KEY.into()),
                    AttributeValue::from(grants),
                );
            }
        }

        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let put_result = self
            .store
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{key}: {e}")))?;

        tracing::info!(bucket, key, size, "Uploaded to storage");

        Ok(BlobInfo {
            key: key.to_string(),
            size,
            etag: put_result.e_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn head_missing_blob_is_none() {
        let storage = StorageClient::in_memory();
        let info = storage.head("audio", "jamendo_1").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn put_then_get_keeps_content_type() {
        let storage = StorageClient::in_memory();
        storage
            .put(
                "audio",
                "jamendo_1",
                Bytes::from_static(b"ID3abcdef"),
                "audio/mpeg",
                &[Permission::PublicRead],
            )
            .await
            .unwrap();

        let info = storage.head("audio", "jamendo_1").await.unwrap().unwrap();
        assert_eq!(info.size, 9);

        let blob = storage.get("audio", "jamendo_1", None).await.unwrap().unwrap();
        assert_eq!(blob.data.as_ref(), b"ID3abcdef");
        assert_eq!(blob.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(blob.size, 9);
        assert_eq!(blob.range, 0..9);
    }

    #[tokio::test]
    async fn get_range_returns_slice() {
        let storage = StorageClient::in_memory();
        storage
            .put("audio", "k", Bytes::from_static(b"0123456789"), "audio/mpeg", &[])
            .await
            .unwrap();

        let blob = storage.get("audio", "k", Some(2..5)).await.unwrap().unwrap();
        assert_eq!(blob.data.as_ref(), b"234");
        assert_eq!(blob.range, 2..5);
        assert_eq!(blob.size, 10);
    }

    #[tokio::test]
    async fn buckets_are_isolated() {
        let storage = StorageClient::in_memory();
        storage
            .put("a", "k", Bytes::from_static(b"x"), "audio/mpeg", &[])
            .await
            .unwrap();

        assert!(storage.head("b", "k").await.unwrap().is_none());
    }

    #[test]
    fn public_read_renders_as_grant() {
        assert_eq!(Permission::PublicRead.to_string(), "read(any)");
    }
}
