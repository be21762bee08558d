//! Line protocol read by the host driver.
//!
//! One JSON object per line. Commands drive the registry directly; anything
//! else must be a raw host event and goes through the dispatcher. Blank
//! lines and lines starting with `#` are skipped.

use panelkit_core::{HostEvent, Placement, WidgetHandle};
use serde::Deserialize;

/// Commands issued on behalf of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Open {
        user: String,
        #[serde(default)]
        capacity: Option<usize>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        holder: Option<String>,
        #[serde(default)]
        suppress_default_action: Option<bool>,
        #[serde(default)]
        widgets: Vec<ScriptWidget>,
    },
    Attach {
        user: String,
        widget: ScriptWidget,
    },
    ClosePanel {
        user: String,
    },
    Reap {
        max_idle_secs: u64,
    },
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptLine {
    Command(Command),
    Event(HostEvent),
}

/// Declarative widget used by scripts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptWidget {
    #[serde(default = "auto_placement")]
    pub placement: Placement,
    pub content: String,
    /// Close the panel after the action runs.
    #[serde(default)]
    pub close_on_click: bool,
    /// Make the action fail with this message.
    #[serde(default)]
    pub fail: Option<String>,
}

fn auto_placement() -> Placement {
    Placement::Auto
}

impl ScriptWidget {
    pub fn into_handle(self) -> WidgetHandle {
        let ScriptWidget {
            placement,
            content,
            close_on_click,
            fail,
        } = self;
        let label = content.clone();
        WidgetHandle::new(placement, content, move |ix| {
            tracing::info!(
                user = %ix.user(),
                panel = %ix.session().id(),
                position = ix.position(),
                widget = %label,
                "widget selected"
            );
            if let Some(message) = &fail {
                return Err(message.as_str().into());
            }
            if close_on_click {
                ix.request_close();
            }
            Ok(())
        })
    }
}

/// Parse one script line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<ScriptLine>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}
