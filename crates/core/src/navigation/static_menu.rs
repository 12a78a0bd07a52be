use crate::panel::{PanelEntry, PanelId};
use indexmap::IndexMap;
use std::rc::Rc;

/// Panels marked as persistent chrome (menus, tab bars).
///
/// Membership is keyed by [`PanelId`]; insertion order is kept so bulk
/// visibility changes reach menus in the order they registered.
#[derive(Debug, Clone, Default)]
pub struct StaticMenuRegistry {
    entries: IndexMap<PanelId, Rc<PanelEntry>>,
}

impl StaticMenuRegistry {
    /// Registers `entry`. Returns `false` if it was already a member.
    pub fn add(&mut self, entry: &Rc<PanelEntry>) -> bool {
        if self.entries.contains_key(&entry.id()) {
            return false;
        }

        self.entries.insert(entry.id(), Rc::clone(entry));
        true
    }

    /// Unregisters the entry with `id`. Returns `false` if it was not a member.
    pub fn remove(&mut self, id: PanelId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<PanelEntry>> {
        self.entries.values()
    }

    /// Shows or hides every registered menu.
    pub fn set_visible(&self, visible: bool) {
        for entry in self.entries.values() {
            if visible {
                entry.handle().show();
            } else {
                entry.handle().hide();
            }
        }
    }
}
