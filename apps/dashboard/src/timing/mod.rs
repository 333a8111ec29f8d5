//! Rate limiting for UI-driven input on the tokio clock.

pub mod debounce;
pub mod throttle;

pub use debounce::Debouncer;
pub use throttle::{Throttle, Throttled};
