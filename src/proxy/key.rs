//! Cache key derivation
//!
//! A key is either `jamendo_<track id>` when the URL carries a provider track
//! id, or the lowercase hex MD5 of the URL string. Both forms are stable, so
//! repeated requests for the same logical track land in the same cache slot.

use md5::{Digest, Md5};
use std::fmt;
use url::Url;

use super::target::OriginUrl;

/// Namespace prefix for provider-native track ids
pub const PROVIDER_NAMESPACE: &str = "jamendo";

const TRACK_SEGMENT: &str = "track";
const TRACK_ID_PARAM: &str = "trackid";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(target: &OriginUrl) -> Self {
        Self::from_parts(target.as_raw(), target.url())
    }

    /// `raw` is hashed verbatim when no track id is found
    pub fn from_parts(raw: &str, url: &Url) -> Self {
        match provider_track_id(url) {
            Some(id) => CacheKey(format!("{PROVIDER_NAMESPACE}_{id}")),
            None => {
                let mut hasher = Md5::new();
                hasher.update(raw.as_bytes());
                CacheKey(format!("{:x}", hasher.finalize()))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_provider_key(&self) -> bool {
        self.0
            .strip_prefix(PROVIDER_NAMESPACE)
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `/track/<digits>` in the path first, then `?trackid=<digits>`
fn provider_track_id(url: &Url) -> Option<String> {
    from_path(url).or_else(|| from_query(url))
}

fn from_path(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();

    segments
        .windows(2)
        .find(|pair| pair[0].eq_ignore_ascii_case(TRACK_SEGMENT) && is_track_id(pair[1]))
        .map(|pair| pair[1].to_string())
}

fn from_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, value)| name.eq_ignore_ascii_case(TRACK_ID_PARAM) && is_track_id(value))
        .map(|(_, value)| value.into_owned())
}

fn is_track_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
