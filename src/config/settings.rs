//! TOML-based configuration for joinstep.
//!
//! Supports a config file (joinstep.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [join]
//! default_strategy = "left-join"
//! default_operator = "="
//! default_temporal_bucket = "month"
//! auto_open_pickers = true
//!
//! [metadata]
//! catalog_path = "${HOME}/catalogs/shop.toml"
//! site_url = "https://bi.example.com"
//! cache_enabled = true
//!
//! [logging]
//! filter = "joinstep=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::{ConditionOperator, JoinStrategy, TemporalBucket};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Join editor defaults.
    pub join: JoinSettings,

    /// Metadata source configuration.
    pub metadata: MetadataSettings,

    /// Log output configuration.
    pub logging: LoggingSettings,
}

/// Defaults applied by the join step.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JoinSettings {
    /// Strategy of newly created joins.
    pub default_strategy: JoinStrategy,

    /// Operator of newly created conditions.
    pub default_operator: ConditionOperator,

    /// Bucket pre-applied to temporal columns offered by column pickers.
    /// `None` offers them unbinned.
    pub default_temporal_bucket: Option<TemporalBucket>,

    /// Open the next picker automatically as a join is built up.
    pub auto_open_pickers: bool,
}

impl Default for JoinSettings {
    fn default() -> Self {
        Self {
            default_strategy: JoinStrategy::LeftJoin,
            default_operator: ConditionOperator::Eq,
            default_temporal_bucket: Some(TemporalBucket::Month),
            auto_open_pickers: true,
        }
    }
}

/// Metadata configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Catalog file (supports ${ENV_VAR} expansion). The bundled sample
    /// catalog is used when unset.
    pub catalog_path: Option<String>,

    /// Base URL used for links to data sources (supports ${ENV_VAR} expansion).
    pub site_url: String,

    /// Memoize table metadata between picker openings.
    pub cache_enabled: bool,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            site_url: "http://localhost:3000".to_string(),
            cache_enabled: true,
        }
    }
}

impl MetadataSettings {
    /// Catalog path with environment variables expanded.
    pub fn resolved_catalog_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.catalog_path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Site URL with environment variables expanded and no trailing slash.
    pub fn resolved_site_url(&self) -> Result<String, SettingsError> {
        let url = expand_env_vars(&self.site_url)?;
        if url.is_empty() {
            return Err(SettingsError::InvalidConfig("metadata.site_url is empty".into()));
        }
        Ok(url.trim_end_matches('/').to_string())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `JOINSTEP_CONFIG`
    /// 2. `./joinstep.toml`
    /// 3. `~/.config/joinstep/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("JOINSTEP_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("joinstep.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("joinstep").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next(); // consume '{'
        }

        let mut var_name = String::new();
        while let Some(&ch) = chars.peek() {
            if braced && ch == '}' {
                chars.next(); // consume '}'
                break;
            }
            if !braced && !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            var_name.push(ch);
            chars.next();
        }

        if var_name.is_empty() && !braced {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
