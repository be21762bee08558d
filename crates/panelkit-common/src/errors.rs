use std::path::PathBuf;

use crate::id::PanelId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Structural errors returned by `open` and `attach`.
///
/// None of these leave the registry or widget index partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("position {position} of panel {panel} is already occupied")]
    SlotOccupied { panel: PanelId, position: usize },

    #[error("panel {panel} is full ({capacity} positions)")]
    PanelFull { panel: PanelId, capacity: usize },

    #[error("panel {0} is already closed")]
    AlreadyClosed(PanelId),

    #[error("host error: {0}")]
    Host(String),
}

/// Failure reported by a widget action. Never fatal to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("registry.shards = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: registry.shards = 0"
        );
    }

    #[test]
    fn panel_error_display() {
        let panel = PanelId::new();

        let err = PanelError::InvalidArgument("user id must not be empty".into());
        assert_eq!(err.to_string(), "invalid argument: user id must not be empty");

        let err = PanelError::SlotOccupied { panel, position: 4 };
        assert_eq!(
            err.to_string(),
            format!("position 4 of panel {panel} is already occupied")
        );

        let err = PanelError::PanelFull { panel, capacity: 9 };
        assert_eq!(err.to_string(), format!("panel {panel} is full (9 positions)"));

        let err = PanelError::AlreadyClosed(panel);
        assert_eq!(err.to_string(), format!("panel {panel} is already closed"));

        let err = PanelError::Host("renderer unavailable".into());
        assert_eq!(err.to_string(), "host error: renderer unavailable");
    }

    #[test]
    fn action_error_conversions() {
        let err: ActionError = "no permission".into();
        assert_eq!(err.to_string(), "no permission");

        let err: ActionError = String::from("balance too low").into();
        assert_eq!(err, ActionError::new("balance too low"));
    }
}
