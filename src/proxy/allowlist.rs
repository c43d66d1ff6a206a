use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::config::DEFAULT_ALLOWED_ORIGINS;

/// Fixed set of hostnames the proxy may fetch from.
///
/// An entry admits itself and any of its subdomains. The match is on whole
/// DNS labels, so `storage.jamendo.com` admits `prod-1.storage.jamendo.com`
/// but not `prod-1.storage.jamendo.com.attacker.net` or `evilstorage.jamendo.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins {
    hosts: BTreeSet<String>,
}

impl AllowedOrigins {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|host| host.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        Self { hosts }
    }

    pub fn permits(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }

        // IP literals never get subdomain semantics
        let is_ip = |name: &str| {
            name.trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok()
        };
        let host_is_ip = is_ip(&host);

        self.hosts.iter().any(|allowed| {
            if host == *allowed {
                return true;
            }
            !host_is_ip
                && !is_ip(allowed)
                && host.len() > allowed.len()
                && host.ends_with(allowed.as_str())
                && host.as_bytes()[host.len() - allowed.len() - 1] == b'.'
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl Default for AllowedOrigins {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_subdomain_match() {
        let origins = AllowedOrigins::new(["storage.jamendo.com", "mp3d.jamendo.com"]);

        assert!(origins.permits("mp3d.jamendo.com"));
        assert!(origins.permits("storage.jamendo.com"));
        assert!(origins.permits("prod-1.storage.jamendo.com"));
        assert!(origins.permits("MP3D.Jamendo.com"));
        assert!(origins.permits("mp3d.jamendo.com."));
    }

    #[test]
    fn look_alikes_are_refused() {
        let origins = AllowedOrigins::new(["prod-1.storage.jamendo.com"]);

        assert!(!origins.permits("evilprod-1.storage.jamendo.com.attacker.net"));
        assert!(!origins.permits("prod-1.storage.jamendo.com.attacker.net"));
        assert!(!origins.permits("evilprod-1.storage.jamendo.com"));
        assert!(!origins.permits("storage.jamendo.com"));
        assert!(!origins.permits("jamendo.com"));
        assert!(!origins.permits(""));
    }

    #[test]
    fn ip_literals_match_exactly() {
        let origins = AllowedOrigins::new(["127.0.0.1"]);

        assert!(origins.permits("127.0.0.1"));
        assert!(!origins.permits("10.127.0.0.1"));
        assert!(!origins.permits("127.0.0.2"));
    }

    #[test]
    fn default_set_is_jamendo() {
        let origins = AllowedOrigins::default();

        assert!(!origins.is_empty());
        assert!(origins.permits("mp3d.jamendo.com"));
        assert!(origins.permits("prod-1.storage.jamendo.com"));
        assert!(!origins.permits("evil.example.com"));
    }

    #[test]
    fn entries_are_normalised() {
        let origins = AllowedOrigins::new([" MP3D.jamendo.com ", "", "mp3d.jamendo.com."]);
        assert_eq!(origins.len(), 1);
        assert_eq!(origins.iter().next(), Some("mp3d.jamendo.com"));
    }
}
