use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Hostnames the proxy may fetch from when configuration names none
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "mp3d.jamendo.com",
    "mp3l.jamendo.com",
    "storage.jamendo.com",
    "storage-new.jamendo.com",
];

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Audio proxy behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Logical bucket cached audio is stored under
    #[serde(default = "default_cache_bucket")]
    pub cache_bucket: String,
    /// Hostnames (and their subdomains) the proxy may fetch from
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout; unset leaves it to the platform
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_bucket: default_cache_bucket(),
            allowed_origins: default_allowed_origins(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_cache_bucket() -> String {
    "audio-cache".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|host| host.to_string())
        .collect()
}

fn default_user_agent() -> String {
    concat!("AudioProxy/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Memory,
    Local,
    S3,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Root directory for the local provider
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// S3 bucket backing the store
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    /// S3 access key (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_key: Option<String>,
    /// S3 secret key (loaded from environment, not from config file)
    #[serde(skip)]
    pub secret_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Memory,
            root: default_storage_root(),
            bucket: None,
            endpoint: None,
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.proxy.cache_bucket, "audio-cache");
        assert_eq!(config.proxy.allowed_origins.len(), DEFAULT_ALLOWED_ORIGINS.len());
        assert!(config.proxy.user_agent.starts_with("AudioProxy/"));
        assert_eq!(config.proxy.request_timeout_secs, None);
        assert_eq!(config.storage.provider, StorageProvider::Memory);
    }
}
