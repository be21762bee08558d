//! Widget index: which widgets belong to which panel, and which one an
//! interaction targets.
//!
//! Each panel's widgets live in their own `RwLock`ed set, reached through a
//! sharded map keyed by `PanelId`. Resolving takes a read lock on one set;
//! attaching and detaching take its write lock. Panels never share a lock.

use std::sync::{Arc, RwLock};

use panelkit_common::{ContentKey, PanelError, PanelId};
use tracing::debug;

use crate::host::PlacementSink;
use crate::session::PanelSession;
use crate::shard::{read_lock, write_lock, ShardedMap, DEFAULT_SHARDS};
use crate::widget::{Placement, PlacedWidget, WidgetHandle};

struct WidgetSet {
    /// Registration order.
    widgets: Vec<PlacedWidget>,
    occupied: Vec<bool>,
    /// Set once the set has been unlinked from the index.
    closed: bool,
}

impl WidgetSet {
    fn new(capacity: usize) -> Self {
        Self {
            widgets: Vec::new(),
            occupied: vec![false; capacity],
            closed: false,
        }
    }

    fn claim(&self, panel: PanelId, placement: Placement) -> Result<usize, PanelError> {
        match placement {
            Placement::At(position) => {
                if self.occupied[position] {
                    Err(PanelError::SlotOccupied { panel, position })
                } else {
                    Ok(position)
                }
            }
            Placement::Auto => self
                .occupied
                .iter()
                .position(|taken| !taken)
                .ok_or(PanelError::PanelFull {
                    panel,
                    capacity: self.occupied.len(),
                }),
        }
    }

    fn insert(&mut self, position: usize, widget: WidgetHandle) {
        self.occupied[position] = true;
        self.widgets.push(PlacedWidget::new(position, widget));
    }

    fn clear(&mut self) -> usize {
        let removed = self.widgets.len();
        self.widgets.clear();
        self.occupied.fill(false);
        self.closed = true;
        removed
    }

    fn resolve(&self, position: usize, content: Option<&ContentKey>) -> Option<&PlacedWidget> {
        if let Some(hit) = self
            .widgets
            .iter()
            .find(|w| w.is_explicit() && w.position() == position)
        {
            return Some(hit);
        }

        // Auto-placed widget at its assigned position, unless the host saw
        // something else there.
        if let Some(hit) = self.widgets.iter().find(|w| {
            !w.is_explicit()
                && w.position() == position
                && content.map_or(true, |c| w.content() == c)
        }) {
            return Some(hit);
        }

        let content = content?;
        self.widgets
            .iter()
            .find(|w| !w.is_explicit() && w.content() == content)
    }
}

type SharedSet = Arc<RwLock<WidgetSet>>;

pub struct WidgetIndex {
    sets: ShardedMap<PanelId, SharedSet>,
    sink: Arc<dyn PlacementSink>,
}

impl WidgetIndex {
    pub fn new(sink: Arc<dyn PlacementSink>) -> Self {
        Self::with_shards(DEFAULT_SHARDS, sink)
    }

    pub fn with_shards(shards: usize, sink: Arc<dyn PlacementSink>) -> Self {
        Self {
            sets: ShardedMap::new(shards),
            sink,
        }
    }

    /// Record `widget` under `session` and return the position it occupies.
    ///
    /// Explicit positions must be free and below capacity; `Auto` takes the
    /// lowest free position. On error nothing is recorded and the placement
    /// sink is not called.
    pub fn attach(&self, session: &PanelSession, widget: WidgetHandle) -> Result<usize, PanelError> {
        let panel = session.id();
        if session.is_destroyed() {
            return Err(PanelError::AlreadyClosed(panel));
        }
        if let Placement::At(position) = widget.placement() {
            if position >= session.capacity() {
                return Err(PanelError::InvalidArgument(format!(
                    "position {position} is outside panel capacity {}",
                    session.capacity()
                )));
            }
        }

        loop {
            let entry = self
                .sets
                .write(&panel)
                .entry(panel)
                .or_insert_with(|| Arc::new(RwLock::new(WidgetSet::new(session.capacity()))))
                .clone();

            let mut set = write_lock(&entry);
            if set.closed {
                // Unlinked by a concurrent detach after we fetched it.
                continue;
            }
            if session.is_destroyed() {
                set.closed = true;
                drop(set);
                self.unlink(panel, &entry);
                return Err(PanelError::AlreadyClosed(panel));
            }

            let position = set.claim(panel, widget.placement())?;
            let content = widget.content().clone();
            set.insert(position, widget);
            drop(set);

            debug!(panel = %panel, position, content = %content, "widget attached");
            self.sink.place(session.container(), position, &content);
            return Ok(position);
        }
    }

    /// Drop every widget owned by `session`. Returns how many were removed.
    pub fn detach_session(&self, session: &PanelSession) -> usize {
        let panel = session.id();
        let Some(entry) = self.sets.write(&panel).remove(&panel) else {
            return 0;
        };
        let removed = write_lock(&entry).clear();
        debug!(panel = %panel, removed, "widgets detached");
        removed
    }

    /// Find the widget an interaction at `position` showing `content` targets.
    ///
    /// An explicitly placed widget at `position` wins. Next comes the
    /// auto-placed widget assigned to `position`, provided its content agrees
    /// with `content` when one was observed. Otherwise the earliest
    /// registered auto-placed widget with matching content is returned.
    pub fn resolve(
        &self,
        session: &PanelSession,
        position: usize,
        content: Option<&ContentKey>,
    ) -> Option<PlacedWidget> {
        if session.is_destroyed() {
            return None;
        }
        let entry = self.sets.get(&session.id())?;
        let set = read_lock(&entry);
        if set.closed {
            return None;
        }
        set.resolve(position, content).cloned()
    }

    pub fn widget_count(&self, session: &PanelSession) -> usize {
        self.sets
            .get(&session.id())
            .map(|entry| read_lock(&entry).widgets.len())
            .unwrap_or(0)
    }

    /// Occupied positions in registration order.
    pub fn positions(&self, session: &PanelSession) -> Vec<usize> {
        self.sets
            .get(&session.id())
            .map(|entry| {
                read_lock(&entry)
                    .widgets
                    .iter()
                    .map(PlacedWidget::position)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of panels that currently have a widget set.
    pub fn session_count(&self) -> usize {
        self.sets.len()
    }

    fn unlink(&self, panel: PanelId, entry: &SharedSet) {
        let mut shard = self.sets.write(&panel);
        if shard.get(&panel).is_some_and(|current| Arc::ptr_eq(current, entry)) {
            shard.remove(&panel);
        }
    }
}

#[cfg(test)]
mod tests;
