use panelnav_core::{HiddenListener, PanelHandle};
use std::cell::{Cell, RefCell};

/// A panel that only exists as log lines and a visibility flag.
pub struct ConsolePanel {
    name: String,
    visible: Cell<bool>,
    listener: RefCell<Option<HiddenListener>>,
}

impl ConsolePanel {
    pub fn new(name: &str) -> ConsolePanel {
        ConsolePanel {
            name: name.to_string(),
            visible: Cell::new(false),
            listener: RefCell::new(None),
        }
    }

    pub fn visible(&self) -> bool {
        self.visible.get()
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    /// Simulates the user closing the panel without the back action.
    pub fn dismiss(&self) {
        if self.visible.replace(false) {
            tracing::info!(panel = %self.name, "dismissed");
            self.notify_hidden();
        }
    }

    fn notify_hidden(&self) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener();
        }
    }
}

impl PanelHandle for ConsolePanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn show(&self) {
        if !self.visible.replace(true) {
            tracing::info!(panel = %self.name, "shown");
        }
    }

    fn hide(&self) {
        if self.visible.replace(false) {
            tracing::info!(panel = %self.name, "hidden");
        }
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_hidden_listener(&self, listener: HiddenListener) {
        *self.listener.borrow_mut() = Some(listener);
    }
}
