//! panelkit configuration.
//!
//! TOML-based configuration with full validation. All sections use
//! sensible defaults so partial configs work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{PanelkitConfig, CONFIG_SCHEMA_VERSION};

use panelkit_common::ConfigError;
use std::path::Path;

/// Load config from `path`, or from the platform default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<PanelkitConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &PanelkitConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
