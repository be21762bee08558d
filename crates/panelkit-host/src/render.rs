//! Renderer that only logs what a real UI would draw.

use panelkit_common::{ContainerId, ContentKey, PanelError, UserId};
use panelkit_core::{ContainerRenderer, PlacementSink, SequentialContainers};

#[derive(Debug, Default)]
pub struct LoggingRenderer {
    containers: SequentialContainers,
}

impl ContainerRenderer for LoggingRenderer {
    fn open_container(
        &self,
        viewer: &UserId,
        capacity: usize,
        title: &str,
        holder: Option<&UserId>,
    ) -> Result<ContainerId, PanelError> {
        let container = self
            .containers
            .open_container(viewer, capacity, title, holder)?;
        tracing::info!(
            viewer = %viewer,
            %container,
            capacity,
            title,
            holder = ?holder,
            "container shown"
        );
        Ok(container)
    }

    fn close_container(&self, viewer: &UserId, container: ContainerId) {
        tracing::info!(viewer = %viewer, %container, "container taken down");
    }
}

impl PlacementSink for LoggingRenderer {
    fn place(&self, container: ContainerId, position: usize, content: &ContentKey) {
        tracing::debug!(%container, position, content = content.as_str(), "item placed");
    }
}
