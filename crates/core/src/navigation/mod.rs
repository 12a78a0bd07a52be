//! Navigation between panels.
//!
//! The module is split into:
//! - [`stack`]: the LIFO state machine deciding what is visible
//! - [`static_menu`]: the set of persistent menus toggled alongside it

pub mod stack;
pub mod static_menu;

pub use stack::{NavigationStack, Outcome, WeakNavigationStack};
pub use static_menu::StaticMenuRegistry;
