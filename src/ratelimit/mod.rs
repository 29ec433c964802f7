//! Rate limiting logic and state management.

mod clock;
mod guard;
mod registry;
mod shared;
mod window;

pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use guard::GuardedCaller;
pub use registry::LimiterRegistry;
pub use shared::SharedLimiter;
pub use window::SlidingWindowLimiter;
