//! Configuration management for cleanledger
//!
//! This module handles loading, validation, and management of
//! cleanledger configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

/// Upper bound on transparent retries of a remote call.
pub const MAX_RETRIES: u32 = 5;

// ==================== Configuration Types ====================

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the finance tracker API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token (optional, takes precedence over `token_env`)
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
            token_env: default_token_env(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_env() -> String {
    "CLEANLEDGER_TOKEN".to_string()
}

/// Retry behaviour of the data-fetching layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of transparent retries after a failed call
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
        }
    }
}

fn default_retries() -> u32 {
    1
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page read when none is given
    #[serde(default = "default_page")]
    pub default_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: default_page(),
        }
    }
}

fn default_page() -> u32 {
    1
}

/// Known category options offered by the pickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Known categories
    #[serde(default)]
    pub categories: Vec<String>,
    /// Known subcategories
    #[serde(default)]
    pub subcategories: Vec<String>,
    /// Allow values outside the known lists
    #[serde(default = "default_true")]
    pub allow_create: bool,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            categories: vec![],
            subcategories: vec![],
            allow_create: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Category picker settings
    #[serde(default)]
    pub categories: CategoriesConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.base_url".to_string(),
            });
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.retry.retries > MAX_RETRIES {
            return Err(ConfigError::InvalidValue {
                field: "retry.retries".to_string(),
                reason: format!("Retries must be between 0 and {}", MAX_RETRIES),
            });
        }

        if self.pagination.default_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page".to_string(),
                reason: "Pages are numbered from 1".to_string(),
            });
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::ValidationError {
                message: format!("Unknown log level: {}", self.logging.level),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Resolve the bearer token from config or environment
    pub fn api_token(&self) -> Option<String> {
        self.api
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(&self.api.token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }
}
