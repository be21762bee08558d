//! Widgets and the interaction context handed to their actions.

use std::fmt;
use std::sync::Arc;

use panelkit_common::{ActionError, ContentKey, UserId};
use serde::{Deserialize, Serialize};

use crate::session::PanelSession;

pub type ActionResult = Result<(), ActionError>;

/// Callback run when a widget is selected.
pub type WidgetAction = Arc<dyn Fn(&mut Interaction<'_>) -> ActionResult + Send + Sync>;

/// Where a widget wants to live in its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    At(usize),
    /// First free position, scanning upward from 0.
    Auto,
}

/// One selectable element: placement, content key and action.
#[derive(Clone)]
pub struct WidgetHandle {
    placement: Placement,
    content: ContentKey,
    action: WidgetAction,
}

impl WidgetHandle {
    pub fn new<F>(placement: Placement, content: impl Into<ContentKey>, action: F) -> Self
    where
        F: Fn(&mut Interaction<'_>) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            placement,
            content: content.into(),
            action: Arc::new(action),
        }
    }

    pub fn at<F>(position: usize, content: impl Into<ContentKey>, action: F) -> Self
    where
        F: Fn(&mut Interaction<'_>) -> ActionResult + Send + Sync + 'static,
    {
        Self::new(Placement::At(position), content, action)
    }

    pub fn auto<F>(content: impl Into<ContentKey>, action: F) -> Self
    where
        F: Fn(&mut Interaction<'_>) -> ActionResult + Send + Sync + 'static,
    {
        Self::new(Placement::Auto, content, action)
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn content(&self) -> &ContentKey {
        &self.content
    }

    pub(crate) fn invoke(&self, interaction: &mut Interaction<'_>) -> ActionResult {
        (self.action)(interaction)
    }
}

impl fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("placement", &self.placement)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

/// A widget as recorded in the index, with its resolved position.
#[derive(Debug, Clone)]
pub struct PlacedWidget {
    position: usize,
    widget: WidgetHandle,
}

impl PlacedWidget {
    pub(crate) fn new(position: usize, widget: WidgetHandle) -> Self {
        Self { position, widget }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the caller asked for this exact position.
    pub fn is_explicit(&self) -> bool {
        matches!(self.widget.placement, Placement::At(_))
    }

    pub fn content(&self) -> &ContentKey {
        self.widget.content()
    }

    pub fn widget(&self) -> &WidgetHandle {
        &self.widget
    }
}

/// Context passed to a widget action for one interaction event.
pub struct Interaction<'a> {
    session: &'a PanelSession,
    position: usize,
    content: Option<&'a ContentKey>,
    close_after: bool,
}

impl<'a> Interaction<'a> {
    pub fn new(session: &'a PanelSession, position: usize, content: Option<&'a ContentKey>) -> Self {
        Self {
            session,
            position,
            content,
            close_after: false,
        }
    }

    pub fn session(&self) -> &PanelSession {
        self.session
    }

    pub fn user(&self) -> &UserId {
        self.session.owner()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn observed_content(&self) -> Option<&ContentKey> {
        self.content
    }

    /// Close the panel once the action returns.
    pub fn request_close(&mut self) {
        self.close_after = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_after
    }
}
