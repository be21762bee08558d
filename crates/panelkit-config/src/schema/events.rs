use serde::{Deserialize, Serialize};

/// Lifecycle event bus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity (valid range: 16-65536).
    pub bus_capacity: u32,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { bus_capacity: 256 }
    }
}
