//! Configuration loading and representation.
//!
//! Everything comes from environment variables, read once at startup.

use std::time::Duration;

use catalog_core::pagination::DEFAULT_MAX_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            use_persistent_stores: false,
            database_url: None,
            redis_url: None,
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(15),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (unset and empty values take the default).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            port: parse(&get, "PORT", defaults.port)?,
            use_persistent_stores: parse_bool(&get, "USE_PERSISTENT_STORES", defaults.use_persistent_stores)?,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            cache_enabled: parse_bool(&get, "CACHE_ENABLED", defaults.cache_enabled)?,
            cache_ttl: Duration::from_secs(parse(&get, "CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?),
            request_timeout: Duration::from_secs(parse(
                &get,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            max_page_size: parse(&get, "MAX_PAGE_SIZE", defaults.max_page_size)?,
        };

        if config.use_persistent_stores && config.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if config.max_page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "MAX_PAGE_SIZE",
                value: config.max_page_size.to_string(),
            });
        }
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_bool(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
    }
}
