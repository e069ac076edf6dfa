//! TOML Configuration File Support
//!
//! Centralized configuration loading for the companion client, supporting a
//! TOML configuration file at `~/.config/companion/companion.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (when applicable)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/companion/companion.toml` (typically `~/.config/companion/companion.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:8000/api"
//! request_timeout_secs = 30
//! auth_timeout_secs = 8
//!
//! [session]
//! history_window = 8
//! max_input_chars = 4000
//! fetch_resources = true
//!
//! [ui]
//! crisis_support_url = "https://findahelpline.com"
//! gauge_size = 220
//! stick_threshold = 2
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::DEFAULT_AUTH_TIMEOUT;

/// Default backend base URL (including the `/api` prefix)
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Default crisis-support link shown when the backend offers none
pub const DEFAULT_CRISIS_SUPPORT_URL: &str = "https://findahelpline.com";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Backend base URL, including the `/api` prefix
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Session check timeout in seconds
    pub auth_timeout_secs: Option<u64>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Number of recent messages sent as suggestion context
    pub history_window: Option<usize>,

    /// Maximum input length in characters
    pub max_input_chars: Option<usize>,

    /// Whether to fetch resources after each exchange
    pub fetch_resources: Option<bool>,

    /// Where the identity file lives
    pub identity_path: Option<String>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Fallback crisis-support link
    pub crisis_support_url: Option<String>,

    /// Gauge size in pixels for SVG output
    pub gauge_size: Option<u32>,

    /// Rows from the bottom that still count as "at the bottom"
    pub stick_threshold: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionToml {
    /// API configuration section
    pub api: ApiToml,

    /// Session configuration section
    pub session: SessionToml,

    /// UI configuration section
    pub ui: UiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the companion client
///
/// Consolidates configuration from multiple sources and tracks where it came
/// from. Use [`load_config`] to load configuration with proper priority
/// handling.
#[derive(Clone, Debug)]
pub struct CompanionConfigFile {
    /// Backend base URL, including the `/api` prefix
    pub api_base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Session check timeout
    pub auth_timeout: Duration,

    /// Number of recent messages sent as suggestion context
    pub history_window: usize,

    /// Maximum input length in characters
    pub max_input_chars: usize,

    /// Whether to fetch resources after each exchange
    pub fetch_resources: bool,

    /// Identity file override (`None` = XDG data dir)
    pub identity_path: Option<PathBuf>,

    /// Fallback crisis-support link
    pub crisis_support_url: String,

    /// Gauge size in pixels for SVG output
    pub gauge_size: u32,

    /// Rows from the bottom that still count as "at the bottom"
    pub stick_threshold: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CompanionConfigFile {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            history_window: 8,
            max_input_chars: 4000,
            fetch_resources: true,
            identity_path: None,
            crisis_support_url: DEFAULT_CRISIS_SUPPORT_URL.to_string(),
            gauge_size: 220,
            stick_threshold: 2,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CompanionConfigFile {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Reject values the client cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "api base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "auth_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_input_chars == 0 {
            return Err(ConfigError::ValidationError(
                "max_input_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/companion/companion.toml` or
/// `~/.config/companion/companion.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("companion").join("companion.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged values are invalid. A missing config file is not an error.
pub fn load_config() -> Result<CompanionConfigFile, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CompanionConfigFile, ConfigError> {
    let mut config = CompanionConfigFile::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CompanionToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut CompanionConfigFile, toml: &CompanionToml) {
    // API settings
    if let Some(ref url) = toml.api.base_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.api.auth_timeout_secs {
        config.auth_timeout = Duration::from_secs(secs);
    }

    // Session settings
    if let Some(window) = toml.session.history_window {
        config.history_window = window;
    }
    if let Some(max) = toml.session.max_input_chars {
        config.max_input_chars = max;
    }
    if let Some(enabled) = toml.session.fetch_resources {
        config.fetch_resources = enabled;
    }
    if let Some(ref path) = toml.session.identity_path {
        config.identity_path = Some(PathBuf::from(path));
    }

    // UI settings
    if let Some(ref url) = toml.ui.crisis_support_url {
        config.crisis_support_url = url.clone();
    }
    if let Some(size) = toml.ui.gauge_size {
        config.gauge_size = size;
    }
    if let Some(threshold) = toml.ui.stick_threshold {
        config.stick_threshold = threshold;
    }
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; production passes `std::env::var`.
fn apply_env_config(config: &mut CompanionConfigFile, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("COMPANION_API_URL") {
        config.api_base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = lookup("COMPANION_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(timeout) = lookup("COMPANION_AUTH_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.auth_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(window) = lookup("COMPANION_HISTORY_WINDOW") {
        if let Ok(n) = window.parse::<usize>() {
            config.history_window = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(max) = lookup("COMPANION_MAX_INPUT_CHARS") {
        if let Ok(n) = max.parse::<usize>() {
            config.max_input_chars = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(enabled) = lookup("COMPANION_FETCH_RESOURCES") {
        config.fetch_resources = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(path) = lookup("COMPANION_IDENTITY_PATH") {
        config.identity_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
    if let Some(url) = lookup("COMPANION_CRISIS_URL") {
        config.crisis_support_url = url;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub api_base_url: Option<String>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Resource fetching override
    pub fetch_resources: Option<bool>,

    /// Identity file override
    pub identity_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set resource fetching override
    #[must_use]
    pub fn with_fetch_resources(mut self, enabled: bool) -> Self {
        self.fetch_resources = Some(enabled);
        self
    }

    /// Set identity file override
    #[must_use]
    pub fn with_identity_path(mut self, path: PathBuf) -> Self {
        self.identity_path = Some(path);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_base_url.is_none()
            && self.request_timeout_secs.is_none()
            && self.fetch_resources.is_none()
            && self.identity_path.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut CompanionConfigFile) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.api_base_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(enabled) = self.fetch_resources {
            config.fetch_resources = enabled;
        }
        if let Some(ref path) = self.identity_path {
            config.identity_path = Some(path.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
