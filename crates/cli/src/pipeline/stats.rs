//! Scheduling run statistics.

use std::time::Duration;

use contracts::{ExpiredUnit, ScheduleReport};
use observability::RunMetricsAggregator;

/// How many permanent failures to show in the summary
const EXPIRED_PREVIEW_LIMIT: usize = 5;

/// Statistics from a scheduling run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Records handed to the scheduler
    pub scheduled_records: u64,

    /// Total wall-clock duration of the run
    pub duration: Duration,

    /// Aggregated dispatch tallies
    pub dispatch: RunMetricsAggregator,

    /// First few permanent failures, for operator display
    expired_preview: Vec<ExpiredUnit>,
}

impl RunStats {
    /// Create statistics for a run over `scheduled_records` records
    pub fn new(scheduled_records: u64) -> Self {
        Self {
            scheduled_records,
            ..Default::default()
        }
    }

    /// Fold one report into the statistics
    pub fn update(&mut self, report: &ScheduleReport) {
        self.dispatch.update(report);
        for unit in report.expired.iter().take(
            EXPIRED_PREVIEW_LIMIT.saturating_sub(self.expired_preview.len()),
        ) {
            self.expired_preview.push(unit.clone());
        }
    }

    /// Confirmed records per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.summary().succeeded_records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let summary = self.dispatch.summary();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Scheduling Run Statistics                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records scheduled: {}", self.scheduled_records);
        println!(
            "   ├─ Records confirmed: {} ({} units)",
            summary.succeeded_records, summary.succeeded_units
        );
        println!("   ├─ Throughput: {:.2} records/s", self.throughput());
        println!("   ├─ Duplicates skipped: {}", summary.duplicates_skipped);
        println!("   └─ Deferred to next run: {}", summary.deferred_records);

        println!("\n📈 Dispatch Outcomes");
        println!(
            "   ├─ Expired units: {} ({} records)",
            summary.expired_units, summary.expired_records
        );
        println!("   └─ Units stopped mid-run: {}", summary.stopped_units);

        if !self.expired_preview.is_empty() {
            println!("\n⚠️  Permanent Failures");
            for unit in &self.expired_preview {
                println!(
                    "   ├─ {} unit #{}: {} records after {} attempts",
                    unit.channel, unit.index, unit.record_count, unit.attempts
                );
            }
            if summary.expired_units as usize > self.expired_preview.len() {
                println!(
                    "   └─ ... and {} more (see logs)",
                    summary.expired_units as usize - self.expired_preview.len()
                );
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Channel;

    #[test]
    fn test_stats_fold_and_throughput() {
        let mut stats = RunStats::new(100);
        stats.update(&ScheduleReport {
            succeeded_units: 10,
            succeeded_records: 90,
            expired: vec![ExpiredUnit {
                channel: Channel::Bulk,
                index: 2,
                attempts: 5,
                record_count: 10,
            }],
            ..Default::default()
        });
        stats.duration = Duration::from_secs(3);

        assert_eq!(stats.dispatch.summary().succeeded_records, 90);
        assert!((stats.throughput() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expired_preview_is_bounded() {
        let mut stats = RunStats::new(10);
        let expired: Vec<ExpiredUnit> = (0..10)
            .map(|index| ExpiredUnit {
                channel: Channel::Single,
                index,
                attempts: 5,
                record_count: 1,
            })
            .collect();
        stats.update(&ScheduleReport {
            expired,
            ..Default::default()
        });

        assert_eq!(stats.expired_preview.len(), EXPIRED_PREVIEW_LIMIT);
    }
}
