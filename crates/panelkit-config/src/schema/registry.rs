use serde::{Deserialize, Serialize};

/// Session registry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of lock shards for the user and widget maps (valid range: 1-256).
    pub shards: u32,
    /// Close sessions older than this many seconds. 0 disables reaping.
    pub session_ttl_secs: u64,
    /// How often the reaper runs, in seconds (valid range: 1-3600).
    pub reap_interval_secs: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            shards: 16,
            session_ttl_secs: 0,
            reap_interval_secs: 60,
        }
    }
}
