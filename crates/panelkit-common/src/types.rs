use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a host-rendered container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// Comparison key used to match an observed item back to a widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ContentKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Why a user's connection-level lifecycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    #[default]
    Quit,
    Kick,
    Removed,
}

/// Why a panel session was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CloseReason {
    /// The user closed the container.
    Closed,
    /// A widget handler asked for the panel to close.
    Requested,
    /// A newer session for the same user took its place.
    Replaced,
    /// Explicit destroy through the session handle.
    Destroyed,
    /// The session outlived the configured idle TTL.
    Expired,
    Disconnected(DisconnectReason),
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Closed => write!(f, "closed"),
            CloseReason::Requested => write!(f, "requested"),
            CloseReason::Replaced => write!(f, "replaced"),
            CloseReason::Destroyed => write!(f, "destroyed"),
            CloseReason::Expired => write!(f, "expired"),
            CloseReason::Disconnected(DisconnectReason::Quit) => write!(f, "quit"),
            CloseReason::Disconnected(DisconnectReason::Kick) => write!(f, "kick"),
            CloseReason::Disconnected(DisconnectReason::Removed) => write!(f, "removed"),
            CloseReason::Shutdown => write!(f, "shutdown"),
        }
    }
}
