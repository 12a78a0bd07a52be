//! Demo host for the navigation core.
//!
//! Loads settings (first argument, `Settings.toml` by default), builds one
//! console-backed panel per `[[panels]]` entry and replays a short navigation
//! session, printing what is visible after every step.

mod console;

use anyhow::{bail, Context, Error};
use console::ConsolePanel;
use panelnav_core::logging::{init_logging, session_span, shutdown_logging};
use panelnav_core::settings::PanelConfig;
use panelnav_core::{NavigationStack, PanelController, PanelKind, Settings};
use std::env;
use std::rc::Rc;

const DEFAULT_SETTINGS_PATH: &str = "Settings.toml";

fn default_panels() -> Vec<PanelConfig> {
    vec![
        PanelConfig {
            name: "tabs".to_string(),
            kind: PanelKind::StaticMenu,
            hide_static_menu: false,
        },
        PanelConfig {
            name: "home".to_string(),
            kind: PanelKind::Main,
            hide_static_menu: false,
        },
        PanelConfig {
            name: "reader".to_string(),
            kind: PanelKind::Normal,
            hide_static_menu: true,
        },
        PanelConfig {
            name: "confirm".to_string(),
            kind: PanelKind::Popup,
            hide_static_menu: false,
        },
    ]
}

struct Session {
    stack: NavigationStack,
    panels: Vec<(PanelController, Rc<ConsolePanel>)>,
}

impl Session {
    fn new(settings: &Settings) -> Result<Session, Error> {
        let configs = if settings.panels.is_empty() {
            default_panels()
        } else {
            settings.panels.clone()
        };

        let mains = configs.iter().filter(|c| c.kind == PanelKind::Main).count();
        if mains != 1 {
            bail!("expected exactly one main panel, found {}", mains);
        }

        let stack = NavigationStack::new(settings.navigation);
        let panels = configs
            .iter()
            .map(|config| {
                let handle = Rc::new(ConsolePanel::new(&config.name));
                let controller = PanelController::from_config(&stack, handle.clone(), config);
                (controller, handle)
            })
            .collect();

        Ok(Session { stack, panels })
    }

    fn print_state(&self, step: &str) {
        let visible: Vec<_> = self
            .panels
            .iter()
            .filter(|(_, handle)| handle.visible())
            .map(|(_, handle)| handle.label())
            .collect();
        println!(
            "{:<28} depth={} visible=[{}]",
            step,
            self.stack.depth(),
            visible.join(", ")
        );
    }

    fn run(&self) {
        let _span = session_span(self.panels.len()).entered();
        let by_kind = |kind: PanelKind| {
            self.panels
                .iter()
                .filter(move |(controller, _)| controller.entry().kind() == kind)
        };

        for (controller, _) in by_kind(PanelKind::StaticMenu) {
            controller.open();
        }
        for (controller, _) in by_kind(PanelKind::Main) {
            controller.open();
            self.print_state(&format!("open {}", controller.entry().name()));
        }
        for (controller, _) in by_kind(PanelKind::Normal).chain(by_kind(PanelKind::Popup)) {
            let outcome = controller.open();
            tracing::info!(panel = controller.entry().name(), ?outcome, "opened");
            self.print_state(&format!("open {}", controller.entry().name()));
        }

        for (controller, handle) in by_kind(PanelKind::Popup) {
            handle.dismiss();
            self.print_state(&format!("dismiss {}", controller.entry().name()));
        }

        while self.stack.depth() > 1 {
            let outcome = PanelController::go_back(&self.stack);
            self.print_state(&format!("back ({:?})", outcome));
        }

        for (controller, _) in by_kind(PanelKind::Main) {
            controller.teardown();
            self.print_state(&format!("teardown {}", controller.entry().name()));
        }
    }
}

fn main() -> Result<(), Error> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings =
        Settings::load(&path).with_context(|| format!("can't load settings from {}", path))?;

    init_logging(&settings.logging)?;

    let session = Session::new(&settings)?;
    session.run();

    shutdown_logging();

    Ok(())
}
