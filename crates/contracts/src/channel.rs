//! Channel - the two quota-constrained API paths.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bulk calls admitted per rolling hour
pub const BULK_CALLS_PER_HOUR: usize = 50;

/// Single-record calls admitted per rolling hour
pub const SINGLE_CALLS_PER_HOUR: usize = 3_600;

/// Records carried by one bulk call
pub const BULK_CHUNK_SIZE: usize = 1_000;

/// Bulk records admitted per scheduling run
pub const BULK_RECORDS_PER_RUN: usize = BULK_CALLS_PER_HOUR * BULK_CHUNK_SIZE;

/// Cross-channel record budget for one scheduling run
pub const RUN_RECORD_BUDGET: usize = BULK_RECORDS_PER_RUN + SINGLE_CALLS_PER_HOUR;

/// Length of the rolling quota window
pub const QUOTA_WINDOW: Duration = Duration::from_secs(3_600);

/// API channel carrying a dispatch unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Up to `BULK_CHUNK_SIZE` records per call
    Bulk,
    /// Exactly one record per call
    Single,
}

impl Channel {
    /// Rate-limiter / breaker key for this channel's job class
    pub fn job_class(self) -> &'static str {
        match self {
            Channel::Bulk => "batch-api",
            Channel::Single => "single-api",
        }
    }

    /// Calls admitted per rolling hour
    pub fn calls_per_hour(self) -> usize {
        match self {
            Channel::Bulk => BULK_CALLS_PER_HOUR,
            Channel::Single => SINGLE_CALLS_PER_HOUR,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Bulk => "bulk",
            Channel::Single => "single",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_budget() {
        assert_eq!(BULK_RECORDS_PER_RUN, 50_000);
        assert_eq!(RUN_RECORD_BUDGET, 53_600);
        assert_eq!(QUOTA_WINDOW, Duration::from_secs(3_600));
    }

    #[test]
    fn test_job_class_keys() {
        assert_eq!(Channel::Bulk.job_class(), "batch-api");
        assert_eq!(Channel::Single.job_class(), "single-api");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Channel::Bulk).unwrap(), r#""bulk""#);
        assert_eq!(
            serde_json::from_str::<Channel>(r#""single""#).unwrap(),
            Channel::Single
        );
    }
}
