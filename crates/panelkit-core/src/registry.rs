//! Session registry: at most one live panel per user.
//!
//! Every mutation for a user runs under that user's shard write lock, and a
//! replaced or closed session is fully torn down (retired, widgets detached)
//! before the lock is released. Readers therefore never observe a session
//! whose teardown has completed, and two racing `open`s for the same user
//! serialize with the later one winning.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use panelkit_common::{CloseReason, EventBus, PanelError, PanelEvent, PanelId, UserId};
use panelkit_config::schema::PanelsConfig;
use panelkit_config::PanelkitConfig;
use tracing::{debug, info, warn};

use crate::host::ContainerRenderer;
use crate::index::WidgetIndex;
use crate::session::{OpenRequest, PanelSession, SessionHandle};
use crate::shard::{ShardedMap, DEFAULT_SHARDS};
use crate::widget::WidgetHandle;

pub struct SessionRegistry {
    sessions: ShardedMap<UserId, SessionHandle>,
    index: Arc<WidgetIndex>,
    renderer: Arc<dyn ContainerRenderer>,
    bus: Arc<EventBus>,
    defaults: PanelsConfig,
}

impl SessionRegistry {
    pub fn new(
        index: Arc<WidgetIndex>,
        renderer: Arc<dyn ContainerRenderer>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            sessions: ShardedMap::new(DEFAULT_SHARDS),
            index,
            renderer,
            bus,
            defaults: PanelsConfig::default(),
        }
    }

    /// Build a registry using the `[registry]` and `[panels]` sections.
    pub fn from_config(
        config: &PanelkitConfig,
        index: Arc<WidgetIndex>,
        renderer: Arc<dyn ContainerRenderer>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            sessions: ShardedMap::new(config.registry.shards as usize),
            index,
            renderer,
            bus,
            defaults: config.panels.clone(),
        }
    }

    pub fn index(&self) -> &Arc<WidgetIndex> {
        &self.index
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Open a new panel for `request.user`, replacing any existing one.
    ///
    /// `factory` receives the new session and returns its initial widgets.
    /// If any of them fails to attach, the new session is discarded, its
    /// container is handed back to the renderer for removal, the error is
    /// returned, and the user's previous session (if any) stays registered.
    pub fn open<F>(&self, request: OpenRequest, factory: F) -> Result<SessionHandle, PanelError>
    where
        F: FnOnce(&PanelSession) -> Vec<WidgetHandle>,
    {
        let user = request.user;
        if user.is_empty() {
            return Err(PanelError::InvalidArgument("user id must not be empty".into()));
        }
        let capacity = request
            .capacity
            .unwrap_or(self.defaults.default_capacity as usize);
        let max = self.defaults.max_capacity as usize;
        if capacity == 0 || capacity > max {
            return Err(PanelError::InvalidArgument(format!(
                "capacity {capacity} is out of range [1, {max}]"
            )));
        }
        let title = request
            .title
            .unwrap_or_else(|| self.defaults.default_title.clone());
        let suppress = request
            .suppress_default_action
            .unwrap_or(self.defaults.suppress_default_action);

        let container =
            self.renderer
                .open_container(&user, capacity, &title, request.holder.as_ref())?;
        let session = Arc::new(
            PanelSession::new(user.clone(), capacity, title, container, suppress)
                .with_holder(request.holder),
        );

        for widget in factory(&session) {
            if let Err(e) = self.index.attach(&session, widget) {
                session.retire();
                self.index.detach_session(&session);
                self.renderer.close_container(&user, container);
                warn!(user = %user, panel = %session.id(), error = %e, "panel open aborted");
                return Err(e);
            }
        }

        let replaced = {
            let mut shard = self.sessions.write(&user);
            let previous = shard.remove(&user);
            if let Some(previous) = &previous {
                self.teardown(previous);
            }
            shard.insert(user.clone(), session.clone());
            previous
        };

        if let Some(previous) = replaced {
            self.publish_closed(&previous, CloseReason::Replaced);
        }
        self.bus.publish(PanelEvent::Opened {
            user: user.clone(),
            panel: session.id(),
            capacity,
        });
        info!(
            user = %user,
            panel = %session.id(),
            container = %container,
            capacity,
            widgets = self.index.widget_count(&session),
            "panel opened"
        );
        Ok(session)
    }

    /// Attach a widget to a session after it has been opened.
    pub fn attach(&self, session: &PanelSession, widget: WidgetHandle) -> Result<usize, PanelError> {
        self.index.attach(session, widget)
    }

    pub fn lookup(&self, user: &UserId) -> Option<SessionHandle> {
        self.sessions.get(user)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.sessions.contains_key(user)
    }

    /// Close the user's panel, if any. Returns whether one was closed.
    pub fn close(&self, user: &UserId) -> bool {
        self.close_with(user, CloseReason::Closed)
    }

    pub fn close_with(&self, user: &UserId, reason: CloseReason) -> bool {
        let removed = {
            let mut shard = self.sessions.write(user);
            let removed = shard.remove(user);
            if let Some(session) = &removed {
                self.teardown(session);
            }
            removed
        };
        match removed {
            Some(session) => {
                self.publish_closed(&session, reason);
                true
            }
            None => false,
        }
    }

    /// Close the user's panel only if it is still `panel`.
    pub fn close_session(&self, user: &UserId, panel: PanelId, reason: CloseReason) -> bool {
        let removed = {
            let mut shard = self.sessions.write(user);
            if shard.get(user).is_some_and(|s| s.id() == panel) {
                let removed = shard.remove(user);
                if let Some(session) = &removed {
                    self.teardown(session);
                }
                removed
            } else {
                None
            }
        };
        match removed {
            Some(session) => {
                self.publish_closed(&session, reason);
                true
            }
            None => false,
        }
    }

    /// Destroy a session through its handle. A no-op if already destroyed.
    pub fn destroy(&self, session: &PanelSession) -> bool {
        let retired = {
            let mut shard = self.sessions.write(session.owner());
            if shard
                .get(session.owner())
                .is_some_and(|s| s.id() == session.id())
            {
                shard.remove(session.owner());
            }
            self.teardown(session)
        };
        if retired {
            self.publish_closed(session, CloseReason::Destroyed);
        }
        retired
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn users(&self) -> Vec<UserId> {
        self.sessions.keys()
    }

    /// Close every session with no interaction for longer than `max_idle`.
    /// Returns how many closed.
    pub fn reap_idle(&self, max_idle: Duration) -> usize {
        self.close_where(CloseReason::Expired, |session| session.idle() > max_idle)
    }

    /// Close every session. Used during shutdown.
    pub fn close_all(&self) -> usize {
        self.close_where(CloseReason::Shutdown, |_| true)
    }

    fn close_where(&self, reason: CloseReason, predicate: impl Fn(&PanelSession) -> bool) -> usize {
        let mut closed = Vec::new();
        self.sessions.for_each_shard_mut(|shard: &mut HashMap<UserId, SessionHandle>| {
            shard.retain(|_, session| {
                if predicate(session) {
                    self.teardown(session);
                    closed.push(session.clone());
                    false
                } else {
                    true
                }
            });
        });
        for session in &closed {
            self.publish_closed(session, reason);
        }
        closed.len()
    }

    /// Retire the session and release its widgets. Returns `false` if it was
    /// already retired.
    fn teardown(&self, session: &PanelSession) -> bool {
        if !session.retire() {
            return false;
        }
        let widgets = self.index.detach_session(session);
        debug!(user = %session.owner(), panel = %session.id(), widgets, "panel torn down");
        true
    }

    fn publish_closed(&self, session: &PanelSession, reason: CloseReason) {
        info!(user = %session.owner(), panel = %session.id(), %reason, "panel closed");
        self.bus.publish(PanelEvent::Closed {
            user: session.owner().clone(),
            panel: session.id(),
            reason,
        });
    }
}
