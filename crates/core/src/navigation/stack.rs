//! The panel navigation state machine.
//!
//! [`NavigationStack`] keeps a LIFO of the panels and popups currently taking
//! part in navigation, plus the [`StaticMenuRegistry`]. Four operations drive
//! it:
//!
//! - [`activate`](NavigationStack::activate): a panel became visible
//! - [`back`](NavigationStack::back): the application-wide back action
//! - [`notify_externally_hidden`](NavigationStack::notify_externally_hidden):
//!   a panel was hidden behind the stack's back
//! - [`teardown`](NavigationStack::teardown): a panel is gone for good
//!
//! # Visibility rules
//!
//! ```txt
//!   activate(Normal B) on [A]      activate(Popup P) on [A]
//!   +-----------+                  +-----------+
//!   | B  shown  |  <- top          | P         |  <- top
//!   +-----------+                  +-----------+
//!   | A  hidden |                  | A  shown  |  untouched
//!   +-----------+                  +-----------+
//!   static menus = !B.hide_static_menu   static menus untouched
//! ```
//!
//! Popping a normal panel shows the new top and re-applies its static menu
//! flag. Popping a popup touches nothing beneath it.
//!
//! # Re-entrancy
//!
//! Every operation first mutates the state, then runs the resulting side
//! effects (show, hide, static menus, back callbacks) with the state released.
//! Calls made while an operation is in progress, typically from a back
//! callback or a hidden listener, are queued and run once the current one is
//! done. They return [`Outcome::Queued`].

use super::static_menu::StaticMenuRegistry;
use crate::error::NavigationError;
use crate::panel::{PanelEntry, PanelId, PanelKind};
use crate::settings::{NavigationSettings, TeardownPolicy};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, error, trace, warn};

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The entry was pushed on the stack.
    Pushed,
    /// The entry is a registered static menu.
    Registered,
    /// Nothing changed: re-activation of the top entry, stale notification,
    /// or teardown of an entry the stack does not know about.
    Unchanged,
    /// The top entry was popped.
    Popped,
    /// Back reached the root; its back callback ran instead of a pop.
    RootBack,
    /// A static menu was unregistered, or an active entry was forcibly
    /// removed on teardown.
    Removed,
    /// The main panel went away and all navigation state was cleared.
    Reset,
    /// The call violated a navigation policy and was ignored.
    Rejected(NavigationError),
    /// The call arrived while another one was running and will run after it.
    Queued,
}

enum Command {
    Activate(Rc<PanelEntry>),
    Back,
    ExternallyHidden(PanelId),
    Teardown(Rc<PanelEntry>),
}

enum Effect {
    Show(Rc<PanelEntry>),
    Hide(Rc<PanelEntry>),
    StaticMenus(StaticMenuRegistry, bool),
    OnBack(Rc<dyn Fn()>),
}

impl Effect {
    fn run(self) {
        match self {
            Effect::Show(entry) => entry.handle().show(),
            Effect::Hide(entry) => entry.handle().hide(),
            Effect::StaticMenus(menus, visible) => menus.set_visible(visible),
            Effect::OnBack(callback) => callback(),
        }
    }
}

#[derive(Default)]
struct NavigationState {
    active: Vec<Rc<PanelEntry>>,
    static_menus: StaticMenuRegistry,
    settings: NavigationSettings,
}

impl NavigationState {
    fn top(&self) -> Option<&Rc<PanelEntry>> {
        self.active.last()
    }

    fn is_top(&self, id: PanelId) -> bool {
        self.top().is_some_and(|top| top.id() == id)
    }

    fn apply(&mut self, command: Command, effects: &mut Vec<Effect>) -> Outcome {
        match command {
            Command::Activate(entry) => self.activate(entry, effects),
            Command::Back => self.back(effects),
            Command::ExternallyHidden(id) => self.externally_hidden(id, effects),
            Command::Teardown(entry) => self.teardown(entry, effects),
        }
    }

    fn activate(&mut self, entry: Rc<PanelEntry>, effects: &mut Vec<Effect>) -> Outcome {
        match entry.kind() {
            PanelKind::Main => {
                if self.active.iter().any(|active| active.id() == entry.id()) {
                    return Outcome::Unchanged;
                }

                if let Some(existing) = self.active.first() {
                    let err = NavigationError::DuplicateMain {
                        existing: existing.id(),
                        rejected: entry.id(),
                    };
                    error!(panel = entry.name(), existing = existing.name(), "{}", err);
                    return Outcome::Rejected(err);
                }

                debug!(panel = entry.name(), id = %entry.id(), "main panel registered");
                self.active.push(entry);
                Outcome::Pushed
            }
            PanelKind::Normal => {
                if self.is_top(entry.id()) {
                    return Outcome::Unchanged;
                }

                let previous = self.top().cloned();
                effects.push(Effect::StaticMenus(
                    self.static_menus.clone(),
                    !entry.hides_static_menu(),
                ));
                if let Some(previous) = previous {
                    debug!(
                        panel = entry.name(),
                        previous = previous.name(),
                        "panel replaces previous one"
                    );
                    effects.push(Effect::Hide(previous));
                }

                self.active.push(entry);
                Outcome::Pushed
            }
            PanelKind::Popup => {
                if self.is_top(entry.id()) {
                    return Outcome::Unchanged;
                }

                debug!(panel = entry.name(), depth = self.active.len(), "popup opened");
                self.active.push(entry);
                Outcome::Pushed
            }
            PanelKind::StaticMenu => {
                if self.static_menus.add(&entry) {
                    debug!(panel = entry.name(), "static menu registered");
                }
                Outcome::Registered
            }
        }
    }

    fn back(&mut self, effects: &mut Vec<Effect>) -> Outcome {
        if self.active.len() <= 1 {
            if let Some(root) = self.top() {
                debug!(panel = root.name(), "back reached the root");
                if let Some(on_back) = root.on_back() {
                    effects.push(Effect::OnBack(on_back));
                }
            }
            return Outcome::RootBack;
        }

        let Some(popped) = self.active.pop() else {
            return Outcome::RootBack;
        };

        debug!(panel = popped.name(), kind = ?popped.kind(), "back");

        if let Some(on_back) = popped.on_back() {
            effects.push(Effect::OnBack(on_back));
        }
        effects.push(Effect::Hide(Rc::clone(&popped)));

        if popped.kind() != PanelKind::Popup {
            self.restore_top(effects);
        }

        Outcome::Popped
    }

    fn restore_top(&self, effects: &mut Vec<Effect>) {
        if let Some(top) = self.top() {
            effects.push(Effect::StaticMenus(
                self.static_menus.clone(),
                !top.hides_static_menu(),
            ));
            effects.push(Effect::Show(Rc::clone(top)));
        }
    }

    /// Topmost entry of the base layer, skipping popups above it.
    fn base(&self) -> Option<&Rc<PanelEntry>> {
        self.active
            .iter()
            .rev()
            .find(|active| active.kind() != PanelKind::Popup)
    }

    /// Shows the base layer again after the entry covering it went away.
    /// Popups still above it stay untouched.
    fn restore_base(&self, effects: &mut Vec<Effect>) {
        if let Some(base) = self.base() {
            effects.push(Effect::StaticMenus(
                self.static_menus.clone(),
                !base.hides_static_menu(),
            ));
            effects.push(Effect::Show(Rc::clone(base)));
        }
    }

    fn externally_hidden(&mut self, id: PanelId, effects: &mut Vec<Effect>) -> Outcome {
        if !self.is_top(id) {
            trace!(id = %id, "ignoring hidden notification for panel not on top");
            return Outcome::Unchanged;
        }

        self.back(effects)
    }

    fn teardown(&mut self, entry: Rc<PanelEntry>, effects: &mut Vec<Effect>) -> Outcome {
        match entry.kind() {
            PanelKind::Main => {
                debug!(
                    panel = entry.name(),
                    depth = self.active.len(),
                    static_menus = self.static_menus.len(),
                    "main panel torn down, resetting navigation"
                );
                self.active.clear();
                self.static_menus.clear();
                Outcome::Reset
            }
            PanelKind::StaticMenu => {
                if self.static_menus.remove(entry.id()) {
                    debug!(panel = entry.name(), "static menu unregistered");
                    Outcome::Removed
                } else {
                    Outcome::Unchanged
                }
            }
            PanelKind::Normal | PanelKind::Popup => {
                let Some(depth) = self
                    .active
                    .iter()
                    .position(|active| active.id() == entry.id())
                else {
                    return Outcome::Unchanged;
                };

                match self.settings.teardown_policy {
                    TeardownPolicy::Reject => {
                        let err = NavigationError::TeardownWhileActive {
                            panel: entry.id(),
                            depth,
                        };
                        error!(panel = entry.name(), "{}", err);
                        Outcome::Rejected(err)
                    }
                    TeardownPolicy::ForceRemove => {
                        warn!(
                            panel = entry.name(),
                            depth, "panel torn down while active, removing it from the stack"
                        );
                        let was_base = self
                            .base()
                            .is_some_and(|base| base.id() == entry.id());
                        self.active.retain(|active| active.id() != entry.id());
                        if was_base {
                            self.restore_base(effects);
                        }
                        Outcome::Removed
                    }
                }
            }
        }
    }
}

#[derive(Default)]
struct Inner {
    state: RefCell<NavigationState>,
    pending: RefCell<VecDeque<Command>>,
    busy: Cell<bool>,
}

/// Clears the busy flag even if a side effect panics.
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The application's navigation stack.
///
/// Cloning is cheap and yields another handle to the same stack; an
/// application creates one at its root and hands clones to every
/// [`PanelController`](crate::PanelController). The stack is single-threaded
/// by construction (`!Send`), matching a UI event loop.
#[derive(Clone, Default)]
pub struct NavigationStack {
    inner: Rc<Inner>,
}

impl NavigationStack {
    pub fn new(settings: NavigationSettings) -> Self {
        let stack = NavigationStack::default();
        stack.inner.state.borrow_mut().settings = settings;
        stack
    }

    /// Registers `entry` as just became visible.
    ///
    /// - `Main`: pushed if the stack is empty, otherwise rejected with
    ///   [`NavigationError::DuplicateMain`].
    /// - `Normal`: pushed unless already on top; hides the previous top and
    ///   sets static menus according to the entry's flag.
    /// - `Popup`: pushed unless already on top; nothing else changes.
    /// - `StaticMenu`: added to the static menu registry.
    #[tracing::instrument(level = "trace", skip_all, fields(panel = entry.name(), kind = ?entry.kind()))]
    pub fn activate(&self, entry: &Rc<PanelEntry>) -> Outcome {
        self.run(Command::Activate(Rc::clone(entry)))
    }

    /// Pops the top entry, or runs the root's back callback when only the
    /// root is left.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn back(&self) -> Outcome {
        self.run(Command::Back)
    }

    /// Keeps the stack in line with a panel hidden by other means.
    ///
    /// Behaves like [`back`](Self::back) if `entry` is on top and is ignored
    /// otherwise.
    pub fn notify_externally_hidden(&self, entry: &PanelEntry) -> Outcome {
        self.run(Command::ExternallyHidden(entry.id()))
    }

    /// Forgets `entry` for good.
    ///
    /// Tearing down the main panel resets the whole stack. Normal panels and
    /// popups still on the stack are handled per
    /// [`TeardownPolicy`](crate::settings::TeardownPolicy).
    #[tracing::instrument(level = "trace", skip_all, fields(panel = entry.name(), kind = ?entry.kind()))]
    pub fn teardown(&self, entry: &Rc<PanelEntry>) -> Outcome {
        self.run(Command::Teardown(Rc::clone(entry)))
    }

    /// The entry currently in front, if any.
    pub fn peek(&self) -> Option<Rc<PanelEntry>> {
        self.inner.state.borrow().top().cloned()
    }

    pub fn depth(&self) -> usize {
        self.inner.state.borrow().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.inner
            .state
            .borrow()
            .active
            .iter()
            .any(|active| active.id() == id)
    }

    /// Ids of the active entries, bottom first.
    pub fn ids(&self) -> Vec<PanelId> {
        self.inner
            .state
            .borrow()
            .active
            .iter()
            .map(|active| active.id())
            .collect()
    }

    pub fn is_static_menu(&self, id: PanelId) -> bool {
        self.inner.state.borrow().static_menus.contains(id)
    }

    pub fn static_menu_count(&self) -> usize {
        self.inner.state.borrow().static_menus.len()
    }

    /// A handle that does not keep the stack alive, for listeners stored
    /// inside panels the stack itself references.
    pub fn downgrade(&self) -> WeakNavigationStack {
        WeakNavigationStack(Rc::downgrade(&self.inner))
    }

    fn run(&self, command: Command) -> Outcome {
        if self.inner.busy.get() {
            trace!("navigation call queued behind the running one");
            self.inner.pending.borrow_mut().push_back(command);
            return Outcome::Queued;
        }

        self.inner.busy.set(true);
        let _guard = BusyGuard(&self.inner.busy);

        let outcome = self.execute(command);
        while let Some(next) = self.next_pending() {
            let queued = self.execute(next);
            trace!(outcome = ?queued, "queued navigation call done");
        }

        outcome
    }

    fn next_pending(&self) -> Option<Command> {
        self.inner.pending.borrow_mut().pop_front()
    }

    fn execute(&self, command: Command) -> Outcome {
        let mut effects = Vec::new();
        let outcome = self
            .inner
            .state
            .borrow_mut()
            .apply(command, &mut effects);

        for effect in effects {
            effect.run();
        }

        outcome
    }
}

/// Non-owning counterpart of [`NavigationStack`].
#[derive(Clone)]
pub struct WeakNavigationStack(Weak<Inner>);

impl WeakNavigationStack {
    pub fn upgrade(&self) -> Option<NavigationStack> {
        self.0.upgrade().map(|inner| NavigationStack { inner })
    }
}

impl fmt::Debug for NavigationStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.state.try_borrow() {
            Ok(state) => f
                .debug_struct("NavigationStack")
                .field("active", &state.active)
                .field("static_menus", &state.static_menus)
                .field("settings", &state.settings)
                .finish(),
            Err(_) => f.write_str("NavigationStack { <busy> }"),
        }
    }
}
