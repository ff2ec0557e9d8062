//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use cinelog_core::CachePolicy;
use cinelog_core::cache::{DEFAULT_CAPACITY, DEFAULT_TTL_DAYS};
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Local REST store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Response cache policy.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Remote catalog (TMDB) configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// API base URL.
    pub base_url: String,
    /// Response language (e.g. `en-US`).
    pub language: String,
    /// Image CDN base URL.
    pub image_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(cinelog_api::tmdb::DEFAULT_BASE_URL),
            language: String::from("en-US"),
            image_base_url: String::from(cinelog_api::tmdb::DEFAULT_IMAGE_BASE_URL),
        }
    }
}

/// Local REST store configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// json-server base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum spacing between requests in milliseconds (0 = unpaced).
    pub min_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(cinelog_api::store::DEFAULT_BASE_URL),
            timeout_secs: cinelog_api::store::DEFAULT_TIMEOUT.as_secs(),
            min_interval_ms: 0,
        }
    }
}

impl StoreConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the minimum spacing between requests.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Response cache configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in days.
    pub ttl_days: u32,
    /// Maximum number of cached movies.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_TTL_DAYS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Converts to the core cache policy.
    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        CachePolicy::from_days(self.ttl_days, self.capacity)
    }
}

/// Parses a base URL, appending the trailing `/` that path joining needs.
///
/// # Errors
///
/// Returns an error if `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        String::from(raw)
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).with_context(|| format!("invalid base URL: {raw}"))
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if a value is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.cache.capacity > 0, "cache.capacity must be at least 1");
        ensure!(self.store.timeout_secs > 0, "store.timeout_secs must be at least 1");
        Ok(())
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }
}
