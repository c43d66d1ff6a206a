use super::models::{Config, StorageProvider};
use thiserror::Error;

const MAX_REDIRECTS_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No allowed origins configured (proxy.allowed_origins is empty)")]
    NoAllowedOrigins,

    #[error("Allowed origin '{origin}' must be a bare hostname")]
    InvalidAllowedOrigin { origin: String },

    #[error("proxy.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("Invalid cache bucket name '{bucket}'")]
    InvalidCacheBucket { bucket: String },

    #[error("max_redirects ({actual}) exceeds limit of {limit}")]
    TooManyRedirects { actual: usize, limit: usize },

    #[error("Storage provider is S3 but missing credentials (access_key or secret_key)")]
    MissingS3Credentials,

    #[error("Storage provider is S3 but storage.bucket is not set")]
    MissingS3Bucket,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_allowed_origins(config)?;
    validate_proxy(config)?;
    validate_storage(config)?;
    Ok(())
}

/// Allow-list entries are compared against URL hosts, so anything that is not
/// a plain hostname can never match and signals a typo
fn validate_allowed_origins(config: &Config) -> Result<(), ValidationError> {
    if config.proxy.allowed_origins.is_empty() {
        return Err(ValidationError::NoAllowedOrigins);
    }

    for origin in &config.proxy.allowed_origins {
        let bare = !origin.is_empty()
            && !origin.starts_with('.')
            && !origin.ends_with('.')
            && origin
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

        if !bare {
            return Err(ValidationError::InvalidAllowedOrigin {
                origin: origin.clone(),
            });
        }
    }

    Ok(())
}

fn validate_proxy(config: &Config) -> Result<(), ValidationError> {
    if config.proxy.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    let bucket = &config.proxy.cache_bucket;
    if bucket.is_empty() || bucket.contains('/') || bucket.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCacheBucket {
            bucket: bucket.clone(),
        });
    }

    if config.proxy.max_redirects > MAX_REDIRECTS_LIMIT {
        return Err(ValidationError::TooManyRedirects {
            actual: config.proxy.max_redirects,
            limit: MAX_REDIRECTS_LIMIT,
        });
    }

    Ok(())
}

/// Validate storage credentials when provider is S3
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::S3 {
        if config.storage.bucket.is_none() {
            return Err(ValidationError::MissingS3Bucket);
        }
        if config.storage.access_key.is_none() || config.storage.secret_key.is_none() {
            return Err(ValidationError::MissingS3Credentials);
        }
    }

    Ok(())
}
