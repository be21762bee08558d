//! Defaults applied to panels opened without explicit settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    /// Capacity used when an open request does not name one.
    pub default_capacity: u32,
    /// Largest capacity an open request may ask for.
    pub max_capacity: u32,
    pub default_title: String,
    /// Whether new panels cancel the host's default handling of interactions.
    pub suppress_default_action: bool,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            default_capacity: 27,
            max_capacity: 54,
            default_title: "Menu".into(),
            suppress_default_action: true,
        }
    }
}
