//! Collaborator seams implemented by the embedding host.

use std::sync::atomic::{AtomicU64, Ordering};

use panelkit_common::{ContainerId, ContentKey, PanelError, UserId};

/// Shows a container to a user. Called once per `open`.
pub trait ContainerRenderer: Send + Sync {
    fn open_container(
        &self,
        viewer: &UserId,
        capacity: usize,
        title: &str,
        holder: Option<&UserId>,
    ) -> Result<ContainerId, PanelError>;

    /// Take down a container whose panel failed to open. Items already
    /// placed in it belong to no session.
    fn close_container(&self, _viewer: &UserId, _container: ContainerId) {}
}

/// Puts an item representation into a container slot. Called once per
/// successful attach.
pub trait PlacementSink: Send + Sync {
    fn place(&self, container: ContainerId, position: usize, content: &ContentKey);
}

/// Hands out increasing container ids and renders nothing.
#[derive(Debug, Default)]
pub struct SequentialContainers {
    next: AtomicU64,
}

impl SequentialContainers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerRenderer for SequentialContainers {
    fn open_container(
        &self,
        _viewer: &UserId,
        _capacity: usize,
        _title: &str,
        _holder: Option<&UserId>,
    ) -> Result<ContainerId, PanelError> {
        Ok(ContainerId(self.next.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlacement;

impl PlacementSink for NoopPlacement {
    fn place(&self, _container: ContainerId, _position: usize, _content: &ContentKey) {}
}
