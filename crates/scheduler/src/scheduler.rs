//! Scheduler - partitions update sets and drives dispatch units.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use contracts::{ExpiredUnit, ScheduleReport, Submitter, SyncPlan, UpdateRecord};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{info, instrument};

use crate::error::SchedulerError;
use crate::metrics::MetricsSnapshot;
use crate::partition::{partition, Partition};
use crate::unit::DispatchUnit;
use crate::worker::{drive_unit, DispatchContext, UnitResult};

/// Admission-controlled dispatch scheduler
///
/// Owns the quota trackers and failure throttles for both channels; their
/// windows persist across `schedule` calls, so consecutive runs within
/// the same hour share one budget.
pub struct Scheduler<S> {
    submitter: Arc<S>,
    ctx: Arc<DispatchContext>,
    /// Identity keys confirmed by the submitter under this scheduler
    completed: Mutex<HashSet<String>>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl<S: Submitter + Send + Sync + 'static> Scheduler<S> {
    /// Create a scheduler around a submitter
    pub fn new(plan: SyncPlan, submitter: S) -> Result<Self, SchedulerError> {
        if plan.workers == 0 {
            return Err(SchedulerError::NoWorkers);
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        Ok(Self {
            submitter: Arc::new(submitter),
            ctx: Arc::new(DispatchContext::new(plan)),
            completed: Mutex::new(HashSet::new()),
            stop_tx,
            stop_rx,
        })
    }

    /// Snapshot of the dispatch counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// Shared handle to the submitter
    pub fn submitter(&self) -> Arc<S> {
        Arc::clone(&self.submitter)
    }

    /// Stop admissions: in-flight submissions finish, parked units defer.
    ///
    /// The signal is sticky for the lifetime of this scheduler.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Whether the stop signal has fired
    pub fn is_stopped(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Run one scheduling pass over `records`.
    ///
    /// Always resolves to a full tally; a unit failure never aborts the
    /// run. Records beyond the cross-channel budget, and units still
    /// pending at stop, come back in the report as deferred.
    #[instrument(name = "scheduler_run", skip(self, records), fields(records = records.len()))]
    pub async fn schedule(
        &self,
        records: Vec<UpdateRecord>,
    ) -> Result<ScheduleReport, SchedulerError> {
        let started = Instant::now();

        let (records, duplicates_skipped) = self.drop_completed(records).await;
        let Partition { units, deferred } = partition(records, started, &self.ctx.plan);
        let total_units = units.len();

        info!(
            units = total_units,
            deferred = deferred.len(),
            duplicates = duplicates_skipped,
            "update set partitioned"
        );

        let mut report = ScheduleReport {
            deferred,
            duplicates_skipped,
            ..Default::default()
        };

        let (result_tx, mut result_rx) = mpsc::channel(total_units.max(1));
        for unit in units {
            let ctx = Arc::clone(&self.ctx);
            let submitter = Arc::clone(&self.submitter);
            let stop = self.stop_rx.clone();
            let tx = result_tx.clone();
            tokio::spawn(async move {
                let result = drive_unit(unit, ctx, submitter, stop).await;
                let _ = tx.send(result).await;
            });
        }
        drop(result_tx);

        let mut seen = 0usize;
        while let Some(result) = result_rx.recv().await {
            seen += 1;
            match result {
                UnitResult::Succeeded(unit) => {
                    self.mark_completed(&unit).await;
                    report.succeeded_units += 1;
                    report.succeeded_records += unit.record_count() as u64;
                }
                UnitResult::Expired(unit) => {
                    report.expired.push(ExpiredUnit {
                        channel: unit.channel,
                        index: unit.index,
                        attempts: unit.attempts,
                        record_count: unit.record_count(),
                    });
                }
                UnitResult::Stopped(unit) => {
                    report.stopped_units += 1;
                    report.deferred.extend(unit.into_records());
                }
            }
        }

        if seen != total_units {
            return Err(SchedulerError::LostUnits {
                missing: total_units - seen,
            });
        }

        report.duration = started.elapsed();
        info!(
            succeeded_units = report.succeeded_units,
            succeeded_records = report.succeeded_records,
            expired = report.expired.len(),
            deferred = report.deferred.len(),
            duration_ms = report.duration.as_millis() as u64,
            "scheduling run complete"
        );
        Ok(report)
    }

    /// Filter out identity keys that already succeeded under this scheduler
    async fn drop_completed(&self, records: Vec<UpdateRecord>) -> (Vec<UpdateRecord>, u64) {
        let completed = self.completed.lock().await;
        if completed.is_empty() {
            return (records, 0);
        }

        let mut kept = Vec::with_capacity(records.len());
        let mut skipped = 0u64;
        for record in records {
            if completed.contains(&record.email) {
                skipped += 1;
            } else {
                kept.push(record);
            }
        }
        (kept, skipped)
    }

    async fn mark_completed(&self, unit: &DispatchUnit) {
        let mut completed = self.completed.lock().await;
        for email in unit.identity_keys() {
            completed.insert(email);
        }
    }
}
