use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{PanelId, UserId};
use crate::types::CloseReason;

/// Lifecycle notifications published by the registry and dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PanelEvent {
    Opened {
        user: UserId,
        panel: PanelId,
        capacity: usize,
    },
    Closed {
        user: UserId,
        panel: PanelId,
        reason: CloseReason,
    },
    WidgetActivated {
        user: UserId,
        panel: PanelId,
        position: usize,
    },
    ActionFailed {
        user: UserId,
        panel: PanelId,
        position: usize,
        error: String,
    },
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<PanelEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: PanelEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
