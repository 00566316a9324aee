//! Blocking pauses between UI interactions.

use std::time::Duration;

/// Sleep primitive used by the decision loop.
pub trait Pause: Send {
    /// Block the current thread for `duration`.
    fn pause(&self, duration: Duration);
}

/// [`Pause`] implementation backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
