//! # Admission
//!
//! Gating primitives consulted before every submitter execution.
//!
//! Responsibilities:
//! - `QuotaTracker`: rolling-window call quota per channel
//! - `FailureThrottle`: windowed-failure circuit breaker per job class
//!
//! Both are synchronous state machines taking an explicit `now` so callers
//! control the clock; the scheduler wraps them in mutexes and reserves a
//! slot atomically right before each execution.

mod quota;
mod throttle;

pub use quota::{Admission, QuotaTracker};
pub use throttle::{FailureThrottle, Gate};
