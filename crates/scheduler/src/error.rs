//! Scheduler error types

use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The execution substrate needs at least one worker slot
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// A unit task ended without reporting a result
    #[error("lost track of {missing} dispatch units")]
    LostUnits { missing: usize },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}
