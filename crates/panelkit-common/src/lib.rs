pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ActionError, ConfigError, PanelError};
pub use events::{EventBus, PanelEvent};
pub use id::{PanelId, UserId};
pub use types::{CloseReason, ContainerId, ContentKey, DisconnectReason};

pub type Result<T> = std::result::Result<T, PanelError>;
