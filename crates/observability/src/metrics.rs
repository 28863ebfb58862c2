//! Run-level metric recording and aggregation.
//!
//! Per-unit counters (admissions, denials, retries, outcomes) are emitted
//! inline by the scheduler; this module records run-level gauges and keeps
//! an in-process aggregate for the CLI summary.

use contracts::ScheduleReport;
use metrics::{counter, gauge, histogram};

/// Record run-level gauges from a finished scheduling run
///
/// Call once per `ScheduleReport`.
pub fn record_run_summary(report: &ScheduleReport) {
    counter!("subsync_runs_total").increment(1);

    gauge!("subsync_run_succeeded_records").set(report.succeeded_records as f64);
    gauge!("subsync_run_deferred_records").set(report.deferred.len() as f64);
    gauge!("subsync_run_expired_units").set(report.expired.len() as f64);

    histogram!("subsync_run_duration_seconds").record(report.duration.as_secs_f64());

    if report.duplicates_skipped > 0 {
        counter!("subsync_duplicates_skipped_total").increment(report.duplicates_skipped);
    }
    for unit in &report.expired {
        counter!(
            "subsync_expired_records_total",
            "channel" => unit.channel.to_string()
        )
        .increment(unit.record_count as u64);
    }
}

/// Aggregates report tallies across scheduling runs
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    runs: u64,
    succeeded_units: u64,
    succeeded_records: u64,
    expired_units: u64,
    expired_records: u64,
    stopped_units: u64,
    deferred_records: u64,
    duplicates_skipped: u64,
}

impl RunMetricsAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one report into the aggregate
    pub fn update(&mut self, report: &ScheduleReport) {
        self.runs += 1;
        self.succeeded_units += report.succeeded_units;
        self.succeeded_records += report.succeeded_records;
        self.expired_units += report.expired.len() as u64;
        self.expired_records += report.expired_records() as u64;
        self.stopped_units += report.stopped_units;
        self.deferred_records += report.deferred.len() as u64;
        self.duplicates_skipped += report.duplicates_skipped;
    }

    /// Summary of everything folded in so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            runs: self.runs,
            succeeded_units: self.succeeded_units,
            succeeded_records: self.succeeded_records,
            expired_units: self.expired_units,
            expired_records: self.expired_records,
            stopped_units: self.stopped_units,
            deferred_records: self.deferred_records,
            duplicates_skipped: self.duplicates_skipped,
        }
    }
}

/// Aggregated tallies for reporting
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub runs: u64,
    pub succeeded_units: u64,
    pub succeeded_records: u64,
    pub expired_units: u64,
    pub expired_records: u64,
    pub stopped_units: u64,
    pub deferred_records: u64,
    pub duplicates_skipped: u64,
}
