use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Catalog API configuration
    #[validate(nested)]
    pub api: ApiConfig,

    /// Incremental search configuration
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchSettings,

    /// Detail-list cache configuration
    #[serde(default)]
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CATALOG_CONFIG_PATH")
            .unwrap_or_else(|_| "config/catalog.toml".to_string());

        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration, layering the given file over the built-in defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix: CATALOG_)
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchSettings::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the catalog REST API
    #[serde(default = "default_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    /// API key sent in the `x-api-key` header; takes precedence over `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Page size used by the paginated types listing
    #[serde(default = "default_types_per_page")]
    #[validate(range(min = 1))]
    pub types_per_page: u32,
}

impl ApiConfig {
    /// Resolve the API key from the config value or the named environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "{} is not set in environment variables",
                    self.api_key_env
                ))
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            types_per_page: default_types_per_page(),
        }
    }
}

/// Tuning for the incremental search client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchSettings {
    /// Quiet period before a query change triggers a search (milliseconds)
    #[serde(default = "default_debounce_ms")]
    #[validate(range(min = 300, max = 400))]
    pub debounce_ms: u64,

    /// Items requested per search page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 200))]
    pub page_size: u32,

    /// Delay between input blur and dropdown dismissal (milliseconds)
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            blur_grace_ms: default_blur_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// How long a fetched list is served without refetching (seconds)
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// How long an unused entry is kept before eviction (seconds)
    #[serde(default = "default_retention_secs")]
    #[validate(range(min = 1))]
    pub retention_secs: u64,

    /// Maximum number of cached lists
    #[serde(default = "default_max_capacity")]
    #[validate(range(min = 1))]
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_secs: default_stale_secs(),
            retention_secs: default_retention_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// Read-only presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// The catalog is always rendered with the dark palette
    #[serde(default = "default_true")]
    pub dark_theme: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { dark_theme: true }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://autostore.link/api".to_string()
}

fn default_api_key_env() -> String {
    "CATALOG_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_types_per_page() -> u32 {
    4
}

fn default_debounce_ms() -> u64 {
    350
}

fn default_page_size() -> u32 {
    50
}

fn default_blur_grace_ms() -> u64 {
    200
}

fn default_stale_secs() -> u64 {
    5 * 60
}

fn default_retention_secs() -> u64 {
    30 * 60
}

fn default_max_capacity() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
