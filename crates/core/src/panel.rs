//! Panels as seen by the navigation stack.
//!
//! A panel is an opaque visual unit behind the [`PanelHandle`] trait. The
//! stack only ever asks it to show or hide itself; everything else (layout,
//! rendering, input) belongs to the host. Each registered panel is described
//! by a [`PanelEntry`] carrying its [`PanelKind`], the static menu flag and
//! an optional back callback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a [`PanelEntry`].
///
/// Identity is the only thing the stack compares entries by.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PanelId(u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing [`PanelId`]s.
pub struct IdFeeder(AtomicU64);

impl IdFeeder {
    pub const fn new(start: u64) -> Self {
        IdFeeder(AtomicU64::new(start))
    }

    pub fn next(&self) -> PanelId {
        PanelId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

pub static ID_FEEDER: IdFeeder = IdFeeder::new(1);

/// How a panel takes part in navigation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    /// Replaces the visual layer beneath it, except for static menus.
    #[default]
    Normal,
    /// Overlays the current panel without hiding it or touching static menus.
    Popup,
    /// The single root panel. Its teardown resets all navigation state.
    Main,
    /// Persistent chrome whose visibility follows the base layer.
    StaticMenu,
}

/// Callback fired by a handle when it becomes hidden.
pub type HiddenListener = Box<dyn Fn()>;

/// The visual side of a panel.
///
/// Handles are shared between the host and the stack, so every method takes
/// `&self`; implementations keep their state behind interior mutability.
pub trait PanelHandle {
    /// Human readable name, used in log records.
    fn name(&self) -> &str;

    fn show(&self);

    fn hide(&self);

    fn is_visible(&self) -> bool;

    /// Installs the callback to fire whenever the panel gets hidden by
    /// something other than the stack (a dismiss gesture, a platform back
    /// button, an animation finishing).
    ///
    /// Handles may fire it for stack-initiated hides as well; the stack
    /// ignores notifications for panels that are not on top.
    fn set_hidden_listener(&self, _listener: HiddenListener) {}
}

/// A panel registered for navigation.
pub struct PanelEntry {
    id: PanelId,
    kind: PanelKind,
    hide_static_menu: bool,
    on_back: Option<Rc<dyn Fn()>>,
    handle: Rc<dyn PanelHandle>,
}

impl PanelEntry {
    /// Starts building an entry of `kind` around `handle`.
    pub fn builder(kind: PanelKind, handle: Rc<dyn PanelHandle>) -> PanelEntryBuilder {
        PanelEntryBuilder {
            kind,
            handle,
            hide_static_menu: false,
            on_back: None,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Whether static menus are hidden while this entry is the base layer.
    pub fn hides_static_menu(&self) -> bool {
        self.hide_static_menu
    }

    pub fn handle(&self) -> &Rc<dyn PanelHandle> {
        &self.handle
    }

    pub(crate) fn on_back(&self) -> Option<Rc<dyn Fn()>> {
        self.on_back.clone()
    }
}

impl fmt::Debug for PanelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelEntry")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("hide_static_menu", &self.hide_static_menu)
            .field("on_back", &self.on_back.is_some())
            .finish()
    }
}

/// Builder for [`PanelEntry`], see [`PanelEntry::builder`].
pub struct PanelEntryBuilder {
    kind: PanelKind,
    handle: Rc<dyn PanelHandle>,
    hide_static_menu: bool,
    on_back: Option<Rc<dyn Fn()>>,
}

impl PanelEntryBuilder {
    /// Hide static menus while this panel is the base layer.
    pub fn hide_static_menu(mut self, hide: bool) -> Self {
        self.hide_static_menu = hide;
        self
    }

    /// Callback invoked when a back action pops this panel, or reaches it
    /// as the root.
    pub fn on_back<F>(mut self, on_back: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_back = Some(Rc::new(on_back));
        self
    }

    pub fn build(self) -> Rc<PanelEntry> {
        Rc::new(PanelEntry {
            id: ID_FEEDER.next(),
            kind: self.kind,
            hide_static_menu: self.hide_static_menu,
            on_back: self.on_back,
            handle: self.handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPanel;

    #[test]
    fn entries_get_distinct_ids() {
        let a = PanelEntry::builder(PanelKind::Normal, RecordingPanel::new("a")).build();
        let b = PanelEntry::builder(PanelKind::Normal, RecordingPanel::new("b")).build();

        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }

    #[test]
    fn builder_defaults() {
        let entry = PanelEntry::builder(PanelKind::Popup, RecordingPanel::new("popup")).build();

        assert_eq!(entry.kind(), PanelKind::Popup);
        assert_eq!(entry.name(), "popup");
        assert!(!entry.hides_static_menu());
        assert!(entry.on_back().is_none());
    }

    #[test]
    fn kind_uses_kebab_case_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: PanelKind,
        }

        let wrapper: Wrapper = toml::from_str(r#"kind = "static-menu""#).unwrap();
        assert_eq!(wrapper.kind, PanelKind::StaticMenu);
    }
}
