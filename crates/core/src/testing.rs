use crate::panel::{HiddenListener, PanelHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Panel handle that records what the stack asked of it.
///
/// Like a real widget toolkit it fires its hidden listener on every hide,
/// not only on external ones.
pub struct RecordingPanel {
    name: String,
    visible: Cell<bool>,
    shows: Cell<usize>,
    hides: Cell<usize>,
    listener: RefCell<Option<Rc<dyn Fn()>>>,
}

impl RecordingPanel {
    pub fn new(name: &str) -> Rc<RecordingPanel> {
        Rc::new(RecordingPanel {
            name: name.to_string(),
            visible: Cell::new(false),
            shows: Cell::new(0),
            hides: Cell::new(0),
            listener: RefCell::new(None),
        })
    }

    pub fn shows(&self) -> usize {
        self.shows.get()
    }

    pub fn hides(&self) -> usize {
        self.hides.get()
    }

    pub fn has_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Hides the panel without going through the stack, e.g. a swipe.
    pub fn dismiss(&self) {
        self.visible.set(false);
        self.fire_hidden();
    }

    fn fire_hidden(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }
}

impl PanelHandle for RecordingPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn show(&self) {
        self.shows.set(self.shows.get() + 1);
        self.visible.set(true);
    }

    fn hide(&self) {
        self.hides.set(self.hides.get() + 1);
        self.visible.set(false);
        self.fire_hidden();
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_hidden_listener(&self, listener: HiddenListener) {
        *self.listener.borrow_mut() = Some(Rc::from(listener));
    }
}

/// Counts how many times a callback ran.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn callback(&self) -> impl Fn() + 'static {
        let count = self.0.clone();
        move || count.set(count.get() + 1)
    }
}
