//! ScheduleReport - the final tally of one scheduling run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Channel, UpdateRecord};

/// Permanent failure surfaced for operator visibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiredUnit {
    /// Channel the unit was assigned to
    pub channel: Channel,

    /// Sequence index within the channel
    pub index: u64,

    /// Submitter executions before expiry
    pub attempts: u32,

    /// Records carried by the unit
    pub record_count: usize,
}

/// Final tally of one scheduling run
///
/// A run always produces a report; nothing is silently dropped. Records
/// the run could not dispatch come back in `deferred` for a later run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Units confirmed by the submitter
    pub succeeded_units: u64,

    /// Records confirmed by the submitter
    pub succeeded_records: u64,

    /// Units that exhausted their retry ceiling or deadline
    pub expired: Vec<ExpiredUnit>,

    /// Units still pending when the stop signal arrived
    pub stopped_units: u64,

    /// Records not dispatched in this run (budget overflow or stop signal)
    pub deferred: Vec<UpdateRecord>,

    /// Records skipped because they already succeeded under this scheduler
    pub duplicates_skipped: u64,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl ScheduleReport {
    /// Records that permanently failed
    pub fn expired_records(&self) -> usize {
        self.expired.iter().map(|unit| unit.record_count).sum()
    }

    /// Whether every dispatched unit succeeded
    pub fn is_clean(&self) -> bool {
        self.expired.is_empty() && self.stopped_units == 0
    }
}
