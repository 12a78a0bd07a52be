//! Policy violations reported by the navigation stack.
//!
//! None of these are fatal. They travel inside
//! [`Outcome::Rejected`](crate::navigation::Outcome::Rejected) and are logged
//! at `error` level when they happen.

use crate::panel::PanelId;

/// Error types that can occur while applying navigation operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A second main panel tried to register while the stack was not empty.
    #[error("multiple main panels: {rejected} ignored, {existing} stays the root")]
    DuplicateMain {
        /// Entry at the bottom of the stack when the conflict happened
        existing: PanelId,
        /// The main panel that was not registered
        rejected: PanelId,
    },

    /// A panel was torn down while still on the stack.
    #[error("panel {panel} torn down while still on the navigation stack at depth {depth}")]
    TeardownWhileActive {
        panel: PanelId,
        /// Zero-based position counted from the bottom of the stack
        depth: usize,
    },
}
