//! Binding between one panel and the navigation stack.

use crate::navigation::{NavigationStack, Outcome};
use crate::panel::{PanelEntry, PanelHandle, PanelId};
use crate::settings::PanelConfig;
use crate::transition::Transition;
use std::rc::Rc;
use tracing::debug;

/// Facade that ties a [`PanelEntry`] to a [`NavigationStack`].
///
/// The host calls the lifecycle hooks ([`activate`](Self::activate) when the
/// panel gets enabled, [`teardown`](Self::teardown) when it is destroyed). On
/// construction the controller installs a hidden listener on the panel's
/// handle, so a panel hidden by a gesture or an OS back button is popped from
/// the stack as well.
///
/// Dropping a controller does not tear the panel down; call
/// [`teardown`](Self::teardown) explicitly.
#[derive(Debug, Clone)]
pub struct PanelController {
    stack: NavigationStack,
    entry: Rc<PanelEntry>,
}

impl PanelController {
    pub fn new(stack: &NavigationStack, entry: Rc<PanelEntry>) -> PanelController {
        let weak_stack = stack.downgrade();
        let weak_entry = Rc::downgrade(&entry);
        entry.handle().set_hidden_listener(Box::new(move || {
            if let (Some(stack), Some(entry)) = (weak_stack.upgrade(), weak_entry.upgrade()) {
                stack.notify_externally_hidden(&entry);
            }
        }));

        PanelController {
            stack: stack.clone(),
            entry,
        }
    }

    /// Builds the entry from a declarative [`PanelConfig`].
    pub fn from_config(
        stack: &NavigationStack,
        handle: Rc<dyn PanelHandle>,
        config: &PanelConfig,
    ) -> PanelController {
        let entry = PanelEntry::builder(config.kind, handle)
            .hide_static_menu(config.hide_static_menu)
            .build();
        PanelController::new(stack, entry)
    }

    pub fn entry(&self) -> &Rc<PanelEntry> {
        &self.entry
    }

    pub fn id(&self) -> PanelId {
        self.entry.id()
    }

    /// Enable hook: the panel just became visible.
    pub fn activate(&self) -> Outcome {
        self.stack.activate(&self.entry)
    }

    /// Shows the panel and registers it.
    pub fn open(&self) -> Outcome {
        self.entry.handle().show();
        self.activate()
    }

    /// Plays the enter effect, then shows and registers the panel.
    pub fn open_with<T: Transition + ?Sized>(&self, transition: &T) {
        let controller = self.clone();
        transition.play_enter(Box::new(move || {
            controller.open();
        }));
    }

    /// Forwards an external hide of this panel to the stack.
    ///
    /// Handles that fire their hidden listener do not need this.
    pub fn on_hidden(&self) -> Outcome {
        self.stack.notify_externally_hidden(&self.entry)
    }

    /// Destroy hook: the panel is gone for good.
    pub fn teardown(&self) -> Outcome {
        self.stack.teardown(&self.entry)
    }

    /// The application-wide back action.
    pub fn go_back(stack: &NavigationStack) -> Outcome {
        debug!(depth = stack.depth(), "go back");
        stack.back()
    }

    /// Plays the exit effect, then goes back.
    pub fn go_back_with<T: Transition + ?Sized>(stack: &NavigationStack, transition: &T) {
        let stack = stack.clone();
        transition.play_exit(Box::new(move || {
            PanelController::go_back(&stack);
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavigationError;
    use crate::panel::PanelKind;
    use crate::settings::{NavigationSettings, TeardownPolicy};
    use crate::testing::{Counter, RecordingPanel};
    use crate::transition::{Completion, Instant};
    use std::cell::RefCell;

    fn controller(
        stack: &NavigationStack,
        name: &str,
        kind: PanelKind,
        hide_static_menu: bool,
    ) -> (PanelController, Rc<RecordingPanel>) {
        let handle = RecordingPanel::new(name);
        let config = PanelConfig {
            name: name.to_string(),
            kind,
            hide_static_menu,
        };
        let controller = PanelController::from_config(stack, handle.clone(), &config);
        (controller, handle)
    }

    /// Holds completions until the test finishes them.
    #[derive(Default)]
    struct Deferred {
        pending: RefCell<Vec<Completion>>,
    }

    impl Deferred {
        fn finish(&self) {
            let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
            for on_complete in pending {
                on_complete();
            }
        }
    }

    impl Transition for Deferred {
        fn play_enter(&self, on_complete: Completion) {
            self.pending.borrow_mut().push(on_complete);
        }

        fn play_exit(&self, on_complete: Completion) {
            self.pending.borrow_mut().push(on_complete);
        }
    }

    #[test]
    fn construction_installs_hidden_listener() {
        let stack = NavigationStack::default();
        let (_controller, handle) = controller(&stack, "a", PanelKind::Normal, false);

        assert!(handle.has_listener());
    }

    #[test]
    fn from_config_carries_kind_and_flag() {
        let stack = NavigationStack::default();
        let (controller, _) = controller(&stack, "player", PanelKind::Popup, true);

        assert_eq!(controller.entry().kind(), PanelKind::Popup);
        assert!(controller.entry().hides_static_menu());
        assert_eq!(controller.entry().name(), "player");
    }

    #[test]
    fn external_dismiss_pops_the_panel() {
        let stack = NavigationStack::default();
        let (main, main_handle) = controller(&stack, "main", PanelKind::Main, false);
        let (a, a_handle) = controller(&stack, "a", PanelKind::Normal, false);
        main.open();
        a.open();
        assert!(!main_handle.is_visible());

        a_handle.dismiss();

        assert_eq!(stack.ids(), vec![main.id()]);
        assert!(main_handle.is_visible());
    }

    #[test]
    fn external_dismiss_of_covered_panel_is_ignored() {
        let stack = NavigationStack::default();
        let (a, a_handle) = controller(&stack, "a", PanelKind::Normal, false);
        let (p, _) = controller(&stack, "p", PanelKind::Popup, false);
        a.open();
        p.open();

        a_handle.dismiss();

        assert_eq!(stack.ids(), vec![a.id(), p.id()]);
    }

    #[test]
    fn on_hidden_forwards_to_the_stack() {
        let stack = NavigationStack::default();
        let (a, _) = controller(&stack, "a", PanelKind::Normal, false);
        let (b, _) = controller(&stack, "b", PanelKind::Normal, false);
        a.open();
        b.open();

        assert_eq!(a.on_hidden(), Outcome::Unchanged);
        assert_eq!(b.on_hidden(), Outcome::Popped);
        assert_eq!(stack.ids(), vec![a.id()]);
    }

    #[test]
    fn go_back_walks_the_whole_scenario() {
        let stack = NavigationStack::default();
        let (menu, menu_handle) = controller(&stack, "tabs", PanelKind::StaticMenu, false);
        let (m, m_handle) = controller(&stack, "m", PanelKind::Main, false);
        let (a, a_handle) = controller(&stack, "a", PanelKind::Normal, true);
        let (p, p_handle) = controller(&stack, "p", PanelKind::Popup, false);

        assert_eq!(menu.open(), Outcome::Registered);
        assert_eq!(m.open(), Outcome::Pushed);
        assert_eq!(a.open(), Outcome::Pushed);
        assert!(!menu_handle.is_visible());
        assert!(!m_handle.is_visible());

        assert_eq!(p.open(), Outcome::Pushed);
        assert!(a_handle.is_visible());
        assert!(p_handle.is_visible());

        assert_eq!(PanelController::go_back(&stack), Outcome::Popped);
        assert!(!p_handle.is_visible());
        assert!(!menu_handle.is_visible());
        assert!(a_handle.is_visible());

        assert_eq!(PanelController::go_back(&stack), Outcome::Popped);
        assert!(!a_handle.is_visible());
        assert!(menu_handle.is_visible());
        assert!(m_handle.is_visible());

        assert_eq!(PanelController::go_back(&stack), Outcome::RootBack);
        assert_eq!(stack.ids(), vec![m.id()]);
    }

    #[test]
    fn root_on_back_runs_through_go_back() {
        let stack = NavigationStack::default();
        let quit = Counter::default();
        let root = PanelEntry::builder(PanelKind::Main, RecordingPanel::new("root"))
            .on_back(quit.callback())
            .build();
        let root = PanelController::new(&stack, root);
        root.open();

        PanelController::go_back(&stack);
        PanelController::go_back(&stack);

        assert_eq!(quit.get(), 2);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn teardown_follows_policy() {
        let forced = NavigationStack::default();
        let (a, _) = controller(&forced, "a", PanelKind::Normal, false);
        let (b, _) = controller(&forced, "b", PanelKind::Normal, false);
        a.open();
        b.open();
        assert_eq!(b.teardown(), Outcome::Removed);
        assert_eq!(forced.ids(), vec![a.id()]);

        let strict = NavigationStack::new(NavigationSettings {
            teardown_policy: TeardownPolicy::Reject,
        });
        let (c, _) = controller(&strict, "c", PanelKind::Normal, false);
        c.open();
        assert!(matches!(
            c.teardown(),
            Outcome::Rejected(NavigationError::TeardownWhileActive { depth: 0, .. })
        ));
        assert_eq!(strict.ids(), vec![c.id()]);
    }

    #[test]
    fn instant_transitions_navigate_immediately() {
        let stack = NavigationStack::default();
        let (m, _) = controller(&stack, "m", PanelKind::Main, false);
        let (a, a_handle) = controller(&stack, "a", PanelKind::Normal, false);
        m.open();

        a.open_with(&Instant);
        assert_eq!(stack.ids(), vec![m.id(), a.id()]);
        assert!(a_handle.is_visible());

        PanelController::go_back_with(&stack, &Instant);
        assert_eq!(stack.ids(), vec![m.id()]);
    }

    #[test]
    fn navigation_waits_for_transition_completion() {
        let stack = NavigationStack::default();
        let transition = Deferred::default();
        let (m, _) = controller(&stack, "m", PanelKind::Main, false);
        let (a, a_handle) = controller(&stack, "a", PanelKind::Normal, false);
        m.open();

        a.open_with(&transition);
        assert_eq!(stack.depth(), 1);
        assert!(!a_handle.is_visible());

        transition.finish();
        assert_eq!(stack.depth(), 2);
        assert!(a_handle.is_visible());

        PanelController::go_back_with(&stack, &transition);
        assert_eq!(stack.depth(), 2);

        transition.finish();
        assert_eq!(stack.ids(), vec![m.id()]);
        assert!(!a_handle.is_visible());
    }

    #[test]
    fn dropped_stack_silences_listener() {
        let handle = RecordingPanel::new("orphan");
        {
            let stack = NavigationStack::default();
            let entry = PanelEntry::builder(PanelKind::Normal, handle.clone()).build();
            let controller = PanelController::new(&stack, entry);
            controller.open();
        }

        handle.dismiss();
        assert!(!handle.is_visible());
    }
}
