//! Panel navigation core.
//!
//! A single LIFO [`NavigationStack`] decides which panel is in front, which
//! one is hidden behind it, and whether the persistent static menus (tab bars,
//! side menus) are visible. Panels are bound to the stack through a
//! [`PanelController`], which forwards lifecycle events (enable, external hide,
//! destroy) and exposes the application-wide back action.
//!
//! Showing and hiding a panel is opaque to this crate: hosts implement
//! [`PanelHandle`] for whatever their visual unit is.
//!
//! ```
//! use std::rc::Rc;
//! use panelnav_core::{NavigationStack, PanelController, PanelEntry, PanelKind};
//! # use panelnav_core::PanelHandle;
//! # use std::cell::Cell;
//! # struct Screen(&'static str, Cell<bool>);
//! # impl PanelHandle for Screen {
//! #     fn name(&self) -> &str { self.0 }
//! #     fn show(&self) { self.1.set(true) }
//! #     fn hide(&self) { self.1.set(false) }
//! #     fn is_visible(&self) -> bool { self.1.get() }
//! # }
//!
//! let stack = NavigationStack::default();
//! let home = Rc::new(Screen("home", Cell::new(false)));
//! let details = Rc::new(Screen("details", Cell::new(false)));
//!
//! let home = PanelController::new(&stack, PanelEntry::builder(PanelKind::Main, home).build());
//! let details = PanelController::new(&stack, PanelEntry::builder(PanelKind::Normal, details).build());
//!
//! home.open();
//! details.open();
//! assert_eq!(stack.depth(), 2);
//!
//! PanelController::go_back(&stack);
//! assert_eq!(stack.depth(), 1);
//! ```

pub mod controller;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod panel;
pub mod settings;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::PanelController;
pub use error::NavigationError;
pub use navigation::{NavigationStack, Outcome, StaticMenuRegistry};
pub use panel::{HiddenListener, PanelEntry, PanelEntryBuilder, PanelHandle, PanelId, PanelKind};
pub use settings::{NavigationSettings, Settings, TeardownPolicy};
pub use transition::{Instant, Transition};
