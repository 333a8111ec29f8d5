use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Leading-edge throttle gate: the first call in a window passes, the rest of
/// the window is dropped, and nothing fires on the trailing edge.
pub struct Throttle {
    delay: Duration,
    window_start: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            window_start: Mutex::new(None),
        }
    }

    /// Returns `true` when the caller may proceed, opening a new window.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut window = self.window_start.lock().unwrap_or_else(PoisonError::into_inner);
        match *window {
            Some(start) if now.duration_since(start) < self.delay => false,
            _ => {
                *window = Some(now);
                true
            }
        }
    }

    /// Closes the current window early, e.g. when the guarded form is torn down.
    pub fn reset(&self) {
        *self.window_start.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// A callback wrapped in a `Throttle`.
pub struct Throttled<F> {
    callback: F,
    gate: Throttle,
}

impl<F> Throttled<F> {
    pub fn new(callback: F, delay: Duration) -> Self {
        Self {
            callback,
            gate: Throttle::new(delay),
        }
    }

    /// Invokes the callback with `args` if the window allows it.
    /// Returns whether the callback ran.
    pub fn call<A>(&self, args: A) -> bool
    where
        F: Fn(A),
    {
        if self.gate.try_acquire() {
            (self.callback)(args);
            true
        } else {
            false
        }
    }
}
