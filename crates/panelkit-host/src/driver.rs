//! Applies script lines to a registry and reports what happened.

use std::sync::Arc;
use std::time::Duration;

use panelkit_common::{EventBus, UserId};
use panelkit_config::PanelkitConfig;
use panelkit_core::{EventDispatcher, OpenRequest, SessionRegistry, WidgetIndex};
use serde_json::{json, Value};

use crate::render::LoggingRenderer;
use crate::script::{Command, ScriptLine, ScriptWidget};

pub struct Driver {
    dispatcher: EventDispatcher,
}

impl Driver {
    pub fn from_config(config: &PanelkitConfig) -> Self {
        let renderer = Arc::new(LoggingRenderer::default());
        let index = Arc::new(WidgetIndex::with_shards(
            config.registry.shards as usize,
            renderer.clone(),
        ));
        let bus = Arc::new(EventBus::new(config.events.bus_capacity as usize));
        let registry = SessionRegistry::from_config(config, index, renderer, bus);
        Self {
            dispatcher: EventDispatcher::new(Arc::new(registry)),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.dispatcher.registry()
    }

    /// Apply one line. The returned value is written to stdout.
    pub fn handle(&self, line: ScriptLine) -> Value {
        match line {
            ScriptLine::Event(event) => {
                let outcome = self.dispatcher.dispatch(&event);
                json!({ "event": event, "outcome": outcome })
            }
            ScriptLine::Command(command) => self.run(command),
        }
    }

    fn run(&self, command: Command) -> Value {
        let registry = self.registry();
        match command {
            Command::Open {
                user,
                capacity,
                title,
                holder,
                suppress_default_action,
                widgets,
            } => {
                let mut request = OpenRequest::new(user);
                request.capacity = capacity;
                request.title = title;
                request.holder = holder.map(UserId::from);
                request.suppress_default_action = suppress_default_action;
                let opened = registry.open(request, |_| {
                    widgets.into_iter().map(ScriptWidget::into_handle).collect()
                });
                match opened {
                    Ok(session) => json!({
                        "opened": session.id(),
                        "container": session.container(),
                        "positions": registry.index().positions(&session),
                    }),
                    Err(e) => json!({ "error": e.to_string() }),
                }
            }
            Command::Attach { user, widget } => {
                let user = UserId::from(user);
                let Some(session) = registry.lookup(&user) else {
                    return json!({ "error": format!("no panel open for {user}") });
                };
                match registry.attach(&session, widget.into_handle()) {
                    Ok(position) => json!({ "attached": position }),
                    Err(e) => json!({ "error": e.to_string() }),
                }
            }
            Command::ClosePanel { user } => {
                json!({ "closed": registry.close(&UserId::from(user)) })
            }
            Command::Reap { max_idle_secs } => {
                json!({ "reaped": registry.reap_idle(Duration::from_secs(max_idle_secs)) })
            }
            Command::Status => json!({
                "sessions": registry.count(),
                "users": registry.users(),
                "indexed": registry.index().session_count(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_line;

    fn run(driver: &Driver, line: &str) -> Value {
        driver.handle(parse_line(line).unwrap().unwrap())
    }

    #[test]
    fn open_click_close_round() {
        let driver = Driver::from_config(&PanelkitConfig::default());

        let opened = run(
            &driver,
            r#"{"type":"open","user":"alice","capacity":9,"widgets":[{"content":"apple"},{"content":"bread"}]}"#,
        );
        assert_eq!(opened["positions"], json!([0, 1]));
        let container = opened["container"].as_u64().unwrap();

        let click = format!(
            r#"{{"type":"interaction","user":"alice","container":{container},"position":1,"content":"bread"}}"#
        );
        let report = run(&driver, &click);
        assert_eq!(report["outcome"]["activated"], json!(1));
        assert_eq!(report["outcome"]["suppress_default_action"], json!(true));

        let close = format!(r#"{{"type":"close","user":"alice","container":{container}}}"#);
        assert_eq!(run(&driver, &close)["outcome"]["closed"], json!(true));
        assert_eq!(run(&driver, r#"{"type":"status"}"#)["sessions"], json!(0));
    }

    #[test]
    fn close_on_click_widget_ends_the_panel() {
        let driver = Driver::from_config(&PanelkitConfig::default());
        let opened = run(
            &driver,
            r#"{"type":"open","user":"bob","widgets":[{"placement":{"at":4},"content":"exit","close_on_click":true}]}"#,
        );
        let container = opened["container"].as_u64().unwrap();
        let click = format!(
            r#"{{"type":"interaction","user":"bob","container":{container},"position":4}}"#
        );
        assert_eq!(run(&driver, &click)["outcome"]["closed"], json!(true));
        assert!(!driver.registry().contains(&"bob".into()));
    }

    #[test]
    fn failing_widget_reports_error() {
        let driver = Driver::from_config(&PanelkitConfig::default());
        let opened = run(
            &driver,
            r#"{"type":"open","user":"carol","widgets":[{"content":"tnt","fail":"nope"}]}"#,
        );
        let container = opened["container"].as_u64().unwrap();
        let click = format!(
            r#"{{"type":"interaction","user":"carol","container":{container},"position":0}}"#
        );
        assert_eq!(
            run(&driver, &click)["outcome"]["action_error"],
            json!("nope")
        );
    }

    #[test]
    fn open_errors_are_reported() {
        let driver = Driver::from_config(&PanelkitConfig::default());
        let report = run(&driver, r#"{"type":"open","user":"dave","capacity":0}"#);
        assert!(report["error"].as_str().unwrap().contains("capacity"));

        let report = run(
            &driver,
            r#"{"type":"attach","user":"dave","widget":{"content":"x"}}"#,
        );
        assert!(report["error"].is_string());
    }

    #[test]
    fn attach_and_close_panel_commands() {
        let driver = Driver::from_config(&PanelkitConfig::default());
        run(&driver, r#"{"type":"open","user":"erin","widgets":[{"content":"a"}]}"#);
        let report = run(
            &driver,
            r#"{"type":"attach","user":"erin","widget":{"content":"b"}}"#,
        );
        assert_eq!(report["attached"], json!(1));

        let report = run(&driver, r#"{"type":"close_panel","user":"erin"}"#);
        assert_eq!(report["closed"], json!(true));
        let report = run(&driver, r#"{"type":"close_panel","user":"erin"}"#);
        assert_eq!(report["closed"], json!(false));
    }

    #[test]
    fn reap_closes_old_sessions() {
        let driver = Driver::from_config(&PanelkitConfig::default());
        run(&driver, r#"{"type":"open","user":"frank"}"#);
        assert_eq!(
            run(&driver, r#"{"type":"reap","max_idle_secs":3600}"#)["reaped"],
            json!(0)
        );
        std::thread::sleep(Duration::from_millis(5));
        driver.registry().reap_idle(Duration::from_millis(1));
        assert_eq!(driver.registry().count(), 0);
    }
}
