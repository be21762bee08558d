//! Full configuration validation.
//!
//! Every section is checked and all errors are collected into a single
//! `ConfigError`.

mod helpers;


use crate::schema::PanelkitConfig;
use panelkit_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PanelkitConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_registry(&mut errors, config);
    validate_panels(&mut errors, config);
    validate_range(
        &mut errors,
        "events.bus_capacity",
        config.events.bus_capacity,
        16,
        65536,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_registry(errors: &mut Vec<String>, config: &PanelkitConfig) {
    validate_range(errors, "registry.shards", config.registry.shards, 1, 256);
    validate_range(
        errors,
        "registry.reap_interval_secs",
        config.registry.reap_interval_secs,
        1,
        3600,
    );
}

fn validate_panels(errors: &mut Vec<String>, config: &PanelkitConfig) {
    let panels = &config.panels;
    validate_range(errors, "panels.max_capacity", panels.max_capacity, 1, 1024);
    validate_range(
        errors,
        "panels.default_capacity",
        panels.default_capacity,
        1,
        panels.max_capacity.max(1),
    );
    if panels.default_title.trim().is_empty() {
        errors.push("panels.default_title must not be empty".into());
    }
}
