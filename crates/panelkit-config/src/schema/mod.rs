//! Configuration schema types for panelkit.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod events;
mod panels;
mod registry;
mod system;

pub use events::*;
pub use panels::*;
pub use registry::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PanelkitConfig {
    pub registry: RegistryConfig,
    pub panels: PanelsConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}
