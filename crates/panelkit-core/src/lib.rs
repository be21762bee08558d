//! Panel sessions, widget index and event dispatch.
//!
//! `SessionRegistry` keeps at most one live panel per user. `WidgetIndex`
//! tracks which widget sits at which position of each panel, and
//! `EventDispatcher` turns raw host notifications into widget actions and
//! lifecycle transitions.

pub mod dispatch;
pub mod host;
pub mod index;
pub mod registry;
pub mod session;
mod shard;
pub mod widget;

pub use dispatch::{DispatchOutcome, EventDispatcher, HostEvent};
pub use host::{ContainerRenderer, NoopPlacement, PlacementSink, SequentialContainers};
pub use index::WidgetIndex;
pub use registry::SessionRegistry;
pub use session::{OpenRequest, PanelSession, SessionHandle};
pub use widget::{ActionResult, Interaction, Placement, PlacedWidget, WidgetAction, WidgetHandle};
