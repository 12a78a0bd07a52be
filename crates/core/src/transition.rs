//! Enter and exit effects around navigation.
//!
//! The navigation stack never waits for an animation. Controllers that want
//! one play it through a [`Transition`] and make the navigation call from the
//! completion callback, so the stack only changes once the effect reports it
//! is done.

/// Callback run when a transition finishes.
pub type Completion = Box<dyn FnOnce()>;

/// A visual effect played when panels come and go.
pub trait Transition {
    /// Plays the effect for a panel coming in, then calls `on_complete`.
    fn play_enter(&self, on_complete: Completion);

    /// Plays the effect for a panel going away, then calls `on_complete`.
    fn play_exit(&self, on_complete: Completion);
}

/// No effect at all: completions run right away.
#[derive(Debug, Default, Clone, Copy)]
pub struct Instant;

impl Transition for Instant {
    fn play_enter(&self, on_complete: Completion) {
        on_complete();
    }

    fn play_exit(&self, on_complete: Completion) {
        on_complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn instant_completes_synchronously() {
        let done = Rc::new(Cell::new(0));

        let d = done.clone();
        Instant.play_enter(Box::new(move || d.set(d.get() + 1)));
        let d = done.clone();
        Instant.play_exit(Box::new(move || d.set(d.get() + 1)));

        assert_eq!(done.get(), 2);
    }
}
