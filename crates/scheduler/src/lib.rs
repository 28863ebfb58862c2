//! # Scheduler
//!
//! Admission-controlled dispatch of update records across the two API
//! channels.
//!
//! Responsibilities:
//! - Partition an update set into bulk chunks and single-record units
//! - Drive every unit through its retry state machine
//! - Gate each execution on quota and failure-throttle admission
//! - Report a final tally; nothing is silently dropped

pub mod error;
pub mod metrics;
pub mod partition;
pub mod scheduler;
pub mod submitters;
pub mod unit;

mod worker;

pub use contracts::{ExpiredUnit, ScheduleReport, Submitter};
pub use error::SchedulerError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use partition::{partition, Partition};
pub use scheduler::Scheduler;
pub use submitters::LogSubmitter;
pub use unit::{DispatchUnit, UnitDisposition, UnitPayload, UnitState};
