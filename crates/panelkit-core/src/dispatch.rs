//! Event dispatcher: one state machine for every host notification.
//!
//! Interaction events are resolved to a widget and its action runs on the
//! calling thread with no registry or index lock held. A close requested by
//! the action is applied after it returns, and only if the session that
//! handled the event is still the user's current one.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use panelkit_common::{
    CloseReason, ContainerId, ContentKey, DisconnectReason, PanelEvent, PanelId, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::registry::SessionRegistry;
use crate::widget::Interaction;

/// Raw notifications delivered by the host transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Interaction {
        user: UserId,
        container: ContainerId,
        position: usize,
        #[serde(default)]
        content: Option<ContentKey>,
    },
    Close {
        user: UserId,
        container: ContainerId,
    },
    Disconnect {
        user: UserId,
        #[serde(default)]
        reason: DisconnectReason,
    },
}

/// What the dispatcher did with one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Panel that claimed the event, if any.
    pub panel: Option<PanelId>,
    /// The host should cancel its default handling of the interaction.
    pub suppress_default_action: bool,
    /// Position of the widget whose action ran.
    pub activated: Option<usize>,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_error: Option<String>,
}

impl DispatchOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn is_ignored(&self) -> bool {
        self.panel.is_none() && !self.closed
    }
}

pub struct EventDispatcher {
    registry: Arc<SessionRegistry>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn dispatch(&self, event: &HostEvent) -> DispatchOutcome {
        match event {
            HostEvent::Interaction {
                user,
                container,
                position,
                content,
            } => self.on_interaction(user, *container, *position, content.as_ref()),
            HostEvent::Close { user, container } => self.on_close(user, *container),
            HostEvent::Disconnect { user, reason } => self.on_disconnect(user, *reason),
        }
    }

    pub fn on_interaction(
        &self,
        user: &UserId,
        container: ContainerId,
        position: usize,
        content: Option<&ContentKey>,
    ) -> DispatchOutcome {
        let Some(session) = self.registry.lookup(user) else {
            debug!(user = %user, position, "interaction without open panel");
            return DispatchOutcome::ignored();
        };
        if session.container() != container {
            debug!(user = %user, %container, "interaction on unrelated container");
            return DispatchOutcome::ignored();
        }

        session.touch();

        let mut outcome = DispatchOutcome {
            panel: Some(session.id()),
            suppress_default_action: session.suppress_default_action(),
            ..DispatchOutcome::default()
        };

        let Some(target) = self.registry.index().resolve(&session, position, content) else {
            debug!(user = %user, panel = %session.id(), position, "no widget at position");
            return outcome;
        };

        let mut interaction = Interaction::new(&session, position, content);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            target.widget().invoke(&mut interaction)
        }));
        outcome.activated = Some(target.position());

        let bus = self.registry.bus();
        let error = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(format!("action panicked: {}", panic_message(&*payload))),
        };
        match &error {
            None => {
                bus.publish(PanelEvent::WidgetActivated {
                    user: user.clone(),
                    panel: session.id(),
                    position: target.position(),
                });
            }
            Some(message) => {
                warn!(
                    user = %user,
                    panel = %session.id(),
                    position = target.position(),
                    error = %message,
                    "widget action failed"
                );
                bus.publish(PanelEvent::ActionFailed {
                    user: user.clone(),
                    panel: session.id(),
                    position: target.position(),
                    error: message.clone(),
                });
            }
        }
        outcome.action_error = error;

        if interaction.close_requested() {
            outcome.closed =
                self.registry
                    .close_session(user, session.id(), CloseReason::Requested);
        }
        outcome
    }

    pub fn on_close(&self, user: &UserId, container: ContainerId) -> DispatchOutcome {
        let Some(session) = self.registry.lookup(user) else {
            return DispatchOutcome::ignored();
        };
        if session.container() != container {
            debug!(user = %user, %container, "close of unrelated container");
            return DispatchOutcome::ignored();
        }
        DispatchOutcome {
            panel: Some(session.id()),
            closed: self
                .registry
                .close_session(user, session.id(), CloseReason::Closed),
            ..DispatchOutcome::default()
        }
    }

    /// Always leaves the user without a panel, whatever was open.
    pub fn on_disconnect(&self, user: &UserId, reason: DisconnectReason) -> DispatchOutcome {
        let panel = self.registry.lookup(user).map(|s| s.id());
        let closed = self
            .registry
            .close_with(user, CloseReason::Disconnected(reason));
        DispatchOutcome {
            panel: panel.filter(|_| closed),
            closed,
            ..DispatchOutcome::default()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
