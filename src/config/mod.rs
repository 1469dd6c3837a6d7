//! Configuration module for joinstep.
//!
//! Handles the settings file, environment variable expansion and defaults.

mod settings;

pub use settings::{
    expand_env_vars, JoinSettings, LoggingSettings, MetadataSettings, Settings, SettingsError,
};
