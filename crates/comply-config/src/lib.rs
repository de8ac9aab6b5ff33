// crates/comply-config/src/lib.rs
// ============================================================================
// Module: Comply Config
// Description: Host configuration loading and validation.
// Purpose: Provide strict, fail-closed config input handling for Comply hosts.
// Dependencies: comply-store-sqlite, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration files are untrusted input. Loading enforces path length,
//! file size, and UTF-8 guards before parsing TOML, and semantic validation
//! runs before a config is handed to the host. Every failure is a typed
//! error; nothing is guessed or defaulted silently except documented
//! optional fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use comply_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted config file size in bytes.
pub const MAX_CONFIG_BYTES: usize = 1024 * 1024;
/// Maximum length of a single config path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default config file name used when no path is provided.
const DEFAULT_CONFIG_FILE: &str = "comply.toml";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config input violated a load guard.
    #[error("config invalid: {0}")]
    Invalid(String),
    /// Config file failed to parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config contents failed semantic validation.
    #[error("config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Asset source configuration.
///
/// # Invariants
/// - `document` points at a JSON asset document; emptiness fails validation.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSourceConfig {
    /// Path to the JSON asset document.
    pub document: PathBuf,
}

/// Logging configuration for hosts.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `comply_core=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Returns the default tracing filter directive.
fn default_log_filter() -> String {
    "info".to_string()
}

/// Top-level Comply host configuration.
///
/// # Invariants
/// - `store.path` and `assets.document` are non-empty after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplyConfig {
    /// SQLite store configuration.
    pub store: SqliteStoreConfig,
    /// Asset source configuration.
    pub assets: AssetSourceConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ComplyConfig {
    /// Loads and validates a config file.
    ///
    /// Without an explicit path, `comply.toml` in the working directory is
    /// used. Load guards run before parsing: path length, path component
    /// length, file size, and UTF-8 encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any guard, the parse, or semantic
    /// validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        validate_config_path(path)?;

        let metadata =
            fs::metadata(path).map_err(|err| ConfigError::Io(format!("stat failed: {err}")))?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid(format!(
                "config file exceeds size limit: {size} bytes (max {MAX_CONFIG_BYTES})"
            )));
        }

        let bytes =
            fs::read(path).map_err(|err| ConfigError::Io(format!("read failed: {err}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Runs semantic validation over parsed config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a value is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("store path must not be empty".to_string()));
        }
        if self.assets.document.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "asset document path must not be empty".to_string(),
            ));
        }
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Guards
// ============================================================================

/// Validates the config path before any filesystem access.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    let rendered = path.to_string_lossy();
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
