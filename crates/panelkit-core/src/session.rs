//! Panel sessions and open requests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use panelkit_common::{ContainerId, PanelId, UserId};
use serde::{Deserialize, Serialize};

/// Shared handle to a live (or retired) panel session.
pub type SessionHandle = Arc<PanelSession>;

/// What a caller asks for when opening a panel.
///
/// Unset fields fall back to the `[panels]` config defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub user: UserId,
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub title: Option<String>,
    /// Holder of the rendered container, if any. Independent of `user`.
    #[serde(default)]
    pub holder: Option<UserId>,
    #[serde(default)]
    pub suppress_default_action: Option<bool>,
}

impl OpenRequest {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            capacity: None,
            title: None,
            holder: None,
            suppress_default_action: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn held_by(mut self, holder: impl Into<UserId>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn suppress_default_action(mut self, suppress: bool) -> Self {
        self.suppress_default_action = Some(suppress);
        self
    }
}

/// One open panel instance owned by a single user.
#[derive(Debug)]
pub struct PanelSession {
    id: PanelId,
    owner: UserId,
    holder: Option<UserId>,
    title: String,
    capacity: usize,
    container: ContainerId,
    suppress_default_action: bool,
    opened_at: Instant,
    /// Milliseconds after `opened_at` of the last interaction.
    last_active_ms: AtomicU64,
    destroyed: AtomicBool,
}

impl PanelSession {
    pub fn new(
        owner: UserId,
        capacity: usize,
        title: impl Into<String>,
        container: ContainerId,
        suppress_default_action: bool,
    ) -> Self {
        Self {
            id: PanelId::new(),
            owner,
            holder: None,
            title: title.into(),
            capacity,
            container,
            suppress_default_action,
            opened_at: Instant::now(),
            last_active_ms: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn with_holder(mut self, holder: Option<UserId>) -> Self {
        self.holder = holder;
        self
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn holder(&self) -> Option<&UserId> {
        self.holder.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn suppress_default_action(&self) -> bool {
        self.suppress_default_action
    }

    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// Record user activity on this panel.
    pub fn touch(&self) {
        let now = u64::try_from(self.age().as_millis()).unwrap_or(u64::MAX);
        self.last_active_ms.fetch_max(now, Ordering::Relaxed);
    }

    /// Time since the last interaction, or since opening if there was none.
    pub fn idle(&self) -> Duration {
        let last = Duration::from_millis(self.last_active_ms.load(Ordering::Relaxed));
        self.age().saturating_sub(last)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Mark the session destroyed. Returns `true` only for the first call.
    pub(crate) fn retire(&self) -> bool {
        !self.destroyed.swap(true, Ordering::AcqRel)
    }
}
