//! Service configuration.
//!
//! Everything is read from environment variables (the binary loads `.env`
//! first). Registry credentials are required; everything else has a default.
//!
//! The cache file defaults to `<cache dir>/regcache/customers_cache.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Application name used for the default cache directory
const APP_NAME: &str = "regcache";

/// Cache file name inside the default cache directory
const CACHE_FILE: &str = "customers_cache.json";

const DEFAULT_API_URL: &str = "https://api.vhsys.com/v2/clientes/";

/// Records requested per page when mirroring the registry
pub const DEFAULT_PAGE_SIZE: u32 = 250;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Connection settings for the remote registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Collection URL; single records live at `<base_url><id>`
    pub base_url: String,
    pub access_token: String,
    pub secret_access_token: String,
    pub page_size: u32,
    /// `None` leaves requests without a client-side timeout
    pub request_timeout: Option<Duration>,
}

impl RegistryConfig {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        secret_access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            secret_access_token: secret_access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// URL of a single customer record
    pub fn record_url(&self, id: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, id)
        } else {
            format!("{}/{}", self.base_url, id)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cache_file: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub registry: RegistryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{} must be set", key));

        let mut registry = RegistryConfig::new(
            var("REGCACHE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            required("REGCACHE_ACCESS_TOKEN")?,
            required("REGCACHE_SECRET_TOKEN")?,
        );

        if let Some(raw) = var("REGCACHE_PAGE_SIZE") {
            let page_size: u32 = raw
                .parse()
                .with_context(|| format!("Invalid REGCACHE_PAGE_SIZE: {}", raw))?;
            if page_size == 0 {
                return Err(anyhow!("REGCACHE_PAGE_SIZE must be greater than zero"));
            }
            registry.page_size = page_size;
        }

        if let Some(raw) = var("REGCACHE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("Invalid REGCACHE_REQUEST_TIMEOUT_SECS: {}", raw))?;
            if secs == 0 {
                return Err(anyhow!("REGCACHE_REQUEST_TIMEOUT_SECS must be greater than zero"));
            }
            registry.request_timeout = Some(Duration::from_secs(secs));
        }

        let cache_file = match var("REGCACHE_CACHE_FILE") {
            Some(path) => PathBuf::from(path),
            None => Self::default_cache_file()?,
        };

        Ok(Self {
            bind_addr: var("REGCACHE_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cache_file,
            log_dir: var("REGCACHE_LOG_DIR").map(PathBuf::from),
            registry,
        })
    }

    fn default_cache_file() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(CACHE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_tokens() {
        let config = Config::from_lookup(lookup(&[
            ("REGCACHE_ACCESS_TOKEN", "a"),
            ("REGCACHE_SECRET_TOKEN", "s"),
            ("REGCACHE_CACHE_FILE", "/tmp/customers.json"),
        ]))
        .expect("config");

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.cache_file, PathBuf::from("/tmp/customers.json"));
        assert_eq!(config.registry.base_url, DEFAULT_API_URL);
        assert_eq!(config.registry.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.registry.request_timeout, None);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_missing_tokens_is_an_error() {
        let err = Config::from_lookup(lookup(&[("REGCACHE_ACCESS_TOKEN", "a")])).unwrap_err();
        assert!(err.to_string().contains("REGCACHE_SECRET_TOKEN"));
    }

    #[test]
    fn test_numeric_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("REGCACHE_ACCESS_TOKEN", "a"),
            ("REGCACHE_SECRET_TOKEN", "s"),
            ("REGCACHE_CACHE_FILE", "/tmp/c.json"),
            ("REGCACHE_PAGE_SIZE", "50"),
            ("REGCACHE_REQUEST_TIMEOUT_SECS", "15"),
        ]))
        .expect("config");
        assert_eq!(config.registry.page_size, 50);
        assert_eq!(config.registry.request_timeout, Some(Duration::from_secs(15)));

        assert!(Config::from_lookup(lookup(&[
            ("REGCACHE_ACCESS_TOKEN", "a"),
            ("REGCACHE_SECRET_TOKEN", "s"),
            ("REGCACHE_PAGE_SIZE", "zero"),
        ]))
        .is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("REGCACHE_ACCESS_TOKEN", "a"),
            ("REGCACHE_SECRET_TOKEN", "s"),
            ("REGCACHE_CACHE_FILE", "/tmp/c.json"),
            ("REGCACHE_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("REGCACHE_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn test_record_url() {
        let with_slash = RegistryConfig::new("http://x/clientes/", "a", "s");
        assert_eq!(with_slash.record_url("42"), "http://x/clientes/42");
        let without_slash = RegistryConfig::new("http://x/clientes", "a", "s");
        assert_eq!(without_slash.record_url("42"), "http://x/clientes/42");
    }
}
