//! # Integration Tests
//!
//! End-to-end scheduling scenarios against scripted submitters.
//!
//! Covers:
//! - Full-budget partitioning and dispatch tallies
//! - Quota windows shared across consecutive runs
//! - Rate-limit cooldown spacing and deadline expiry
//! - Breaker suspension and cross-channel isolation

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use contracts::{
        BreakerPolicy, Channel, ChannelPolicy, RetryPolicy, SubmitOutcome, Submitter, SyncPlan,
        UpdateRecord,
    };
    use scheduler::Scheduler;

    /// Per-channel scripted behavior
    #[derive(Debug, Clone, Copy)]
    enum Script {
        Ok,
        AlwaysRateLimited,
        AlwaysError,
    }

    /// Submitter that follows one script per channel and records call times
    struct ScriptedSubmitter {
        bulk: Script,
        single: Script,
        bulk_calls: AtomicU64,
        single_calls: AtomicU64,
        call_log: Mutex<Vec<(Channel, Instant)>>,
    }

    impl ScriptedSubmitter {
        fn new(bulk: Script, single: Script) -> Self {
            Self {
                bulk,
                single,
                bulk_calls: AtomicU64::new(0),
                single_calls: AtomicU64::new(0),
                call_log: Mutex::new(Vec::new()),
            }
        }

        fn outcome(script: Script) -> SubmitOutcome {
            match script {
                Script::Ok => SubmitOutcome::Success,
                Script::AlwaysRateLimited => SubmitOutcome::RateLimited,
                Script::AlwaysError => SubmitOutcome::error("scripted failure"),
            }
        }

        fn calls(&self, channel: Channel) -> Vec<Instant> {
            self.call_log
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, _)| *c == channel)
                .map(|(_, t)| *t)
                .collect()
        }
    }

    impl Submitter for ScriptedSubmitter {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn submit_bulk(&self, _batch_index: u64, _records: &[UpdateRecord]) -> SubmitOutcome {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            self.call_log
                .lock()
                .unwrap()
                .push((Channel::Bulk, Instant::now()));
            Self::outcome(self.bulk)
        }

        async fn submit_single(&self, _index: u64, _record: &UpdateRecord) -> SubmitOutcome {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            self.call_log
                .lock()
                .unwrap()
                .push((Channel::Single, Instant::now()));
            Self::outcome(self.single)
        }
    }

    fn records(range: std::ops::Range<usize>) -> Vec<UpdateRecord> {
        range
            .map(|i| {
                UpdateRecord::new(format!("email_{i}@example.com"))
                    .with_attribute("time_zone", "America/New_York")
            })
            .collect()
    }

    fn fast_plan() -> SyncPlan {
        SyncPlan {
            bulk: ChannelPolicy {
                max_per_window: 3,
                window_secs: 3_600,
                records_per_call: 4,
                retry_backoff_ms: 0,
            },
            single: ChannelPolicy {
                max_per_window: 6,
                window_secs: 3_600,
                records_per_call: 1,
                retry_backoff_ms: 0,
            },
            retry: RetryPolicy {
                max_attempts: 3,
                deadline_secs: 30,
                rate_limit_cooldown_ms: 100,
            },
            breaker: BreakerPolicy {
                max_failures: 100,
                window_secs: 60,
                cooldown_ms: 100,
            },
            workers: 4,
        }
    }

    /// Full pipeline: partition -> admission -> dispatch -> tally
    #[tokio::test]
    async fn test_e2e_full_budget_run() {
        // Budget: 3 bulk chunks of 4 + 6 singles = 18; feed 20 so 2 defer.
        let scheduler =
            Scheduler::new(fast_plan(), ScriptedSubmitter::new(Script::Ok, Script::Ok)).unwrap();

        let report = scheduler.schedule(records(0..20)).await.unwrap();

        assert_eq!(report.succeeded_units, 9);
        assert_eq!(report.succeeded_records, 18);
        assert_eq!(report.deferred.len(), 2);
        assert!(report.expired.is_empty());
        assert!(report.is_clean());

        let snapshot = scheduler.metrics();
        assert_eq!(snapshot.admitted, 9);
        assert_eq!(snapshot.succeeded_units, 9);
    }

    /// The production-sized scenario: 59,999 records split 50,000 / 3,600
    /// across the channels with the remainder deferred.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_e2e_59999_records_production_quotas() {
        let scheduler = Scheduler::new(
            SyncPlan::default(),
            ScriptedSubmitter::new(Script::Ok, Script::Ok),
        )
        .unwrap();

        let report = scheduler.schedule(records(0..59_999)).await.unwrap();

        assert_eq!(report.succeeded_records, 53_600);
        assert_eq!(report.deferred.len(), 6_399);
        assert!(report.expired.is_empty());

        let submitter = &scheduler_submitter(&scheduler);
        assert_eq!(submitter.bulk_calls.load(Ordering::SeqCst), 50);
        assert_eq!(submitter.single_calls.load(Ordering::SeqCst), 3_600);
    }

    /// Quota state persists across runs: a second run in the same window
    /// parks its chunks until the oldest grants roll out.
    #[tokio::test]
    async fn test_e2e_consecutive_runs_never_exceed_window() {
        let mut plan = fast_plan();
        plan.bulk.max_per_window = 2;
        plan.bulk.window_secs = 1;
        plan.bulk.records_per_call = 5;
        plan.single.max_per_window = 1;

        let scheduler =
            Scheduler::new(plan, ScriptedSubmitter::new(Script::Ok, Script::Ok)).unwrap();

        // Each run carries exactly two bulk chunks.
        scheduler.schedule(records(0..10)).await.unwrap();
        scheduler.schedule(records(10..20)).await.unwrap();

        let calls = scheduler_submitter(&scheduler).calls(Channel::Bulk);
        assert_eq!(calls.len(), 4);

        // No sliding one-second window may contain more than two calls.
        let window = Duration::from_secs(1);
        for (i, &start) in calls.iter().enumerate() {
            let in_window = calls[i..]
                .iter()
                .filter(|&&t| t.duration_since(start) < window)
                .count();
            assert!(in_window <= 2, "bulk quota window exceeded");
        }
    }

    /// An endlessly rate-limited unit is retried at cooldown spacing until
    /// its deadline expires it; the bounces never consume the failure
    /// ceiling.
    #[tokio::test]
    async fn test_e2e_rate_limited_until_deadline() {
        let mut plan = fast_plan();
        plan.retry = RetryPolicy {
            max_attempts: 3,
            deadline_secs: 1,
            rate_limit_cooldown_ms: 200,
        };

        let scheduler = Scheduler::new(
            plan,
            ScriptedSubmitter::new(Script::AlwaysRateLimited, Script::Ok),
        )
        .unwrap();

        let started = Instant::now();
        let report = scheduler.schedule(records(0..1)).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.expired.len(), 1);
        let expired = &report.expired[0];
        assert_eq!(expired.channel, Channel::Bulk);
        // More executions than the failure ceiling would allow: the
        // deadline, not the ceiling, terminated the unit.
        assert!(
            expired.attempts > 3,
            "expected deadline-bounded retries, got {} attempts",
            expired.attempts
        );
        assert!(elapsed >= Duration::from_secs(1));

        // Consecutive attempts are spaced by at least the cooldown.
        let calls = scheduler_submitter(&scheduler).calls(Channel::Bulk);
        for pair in calls.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(200));
        }
    }

    /// Failure threshold reached: the whole job class is suspended for the
    /// cooldown before any further execution.
    #[tokio::test]
    async fn test_e2e_breaker_suspends_job_class() {
        let mut plan = fast_plan();
        plan.workers = 1;
        plan.retry.max_attempts = 4;
        plan.breaker = BreakerPolicy {
            max_failures: 2,
            window_secs: 60,
            cooldown_ms: 250,
        };

        let scheduler = Scheduler::new(
            plan,
            ScriptedSubmitter::new(Script::Ok, Script::AlwaysError),
        )
        .unwrap();

        // The first 12 records fill the bulk budget (3 chunks of 4) and
        // succeed; the 13th lands on the single channel and keeps failing.
        let started = Instant::now();
        let report = scheduler.schedule(records(0..13)).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.succeeded_records, 12);

        // Two failures trip the breaker; the remaining retries wait out
        // the cooldown before executing.
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].attempts, 4);
        assert!(elapsed >= Duration::from_millis(250));
        assert!(scheduler.metrics().throttled > 0);
    }

    /// A rate-limit storm on bulk must never stall single dispatch.
    #[tokio::test]
    async fn test_e2e_channels_are_isolated() {
        let mut plan = fast_plan();
        plan.retry = RetryPolicy {
            max_attempts: 3,
            deadline_secs: 1,
            rate_limit_cooldown_ms: 300,
        };

        let scheduler = Scheduler::new(
            plan,
            ScriptedSubmitter::new(Script::AlwaysRateLimited, Script::Ok),
        )
        .unwrap();

        let started = Instant::now();
        // 12 records fill the bulk budget, 3 go to single.
        let report = scheduler.schedule(records(0..15)).await.unwrap();

        assert_eq!(report.succeeded_records, 3);
        assert_eq!(report.expired.len(), 3);

        // Singles completed while every bulk unit sat in cooldown.
        let single_calls = scheduler_submitter(&scheduler).calls(Channel::Single);
        assert_eq!(single_calls.len(), 3);
        for call in single_calls {
            assert!(call.duration_since(started) < Duration::from_millis(300));
        }
    }

    /// Re-running a fully succeeded set makes no further submitter calls.
    #[tokio::test]
    async fn test_e2e_rerun_is_idempotent() {
        let scheduler =
            Scheduler::new(fast_plan(), ScriptedSubmitter::new(Script::Ok, Script::Ok)).unwrap();
        let set = records(0..10);

        let first = scheduler.schedule(set.clone()).await.unwrap();
        assert_eq!(first.succeeded_records, 10);
        let calls_after_first = total_calls(&scheduler);

        let second = scheduler.schedule(set).await.unwrap();
        assert_eq!(second.duplicates_skipped, 10);
        assert_eq!(second.succeeded_units, 0);
        assert_eq!(total_calls(&scheduler), calls_after_first);
    }

    fn scheduler_submitter(scheduler: &Scheduler<ScriptedSubmitter>) -> Arc<ScriptedSubmitter> {
        scheduler.submitter()
    }

    fn total_calls(scheduler: &Scheduler<ScriptedSubmitter>) -> u64 {
        let submitter = scheduler_submitter(scheduler);
        submitter.bulk_calls.load(Ordering::SeqCst) + submitter.single_calls.load(Ordering::SeqCst)
    }
}
