//! Unit driver - walks one DispatchUnit through its state machine.
//!
//! Each unit runs as an independent task; the only shared state is the
//! gating context below, locked briefly and never across a submitter
//! call. A parked bulk unit never stalls single dispatch and vice versa.

use std::sync::Arc;
use std::time::{Duration, Instant};

use admission::{Admission, FailureThrottle, Gate, QuotaTracker};
use contracts::{Channel, SubmitOutcome, Submitter, SyncPlan};
use tokio::sync::{watch, Mutex, Semaphore};
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::DispatchMetrics;
use crate::unit::{DispatchUnit, UnitDisposition, UnitPayload};

/// Shared gating state for every unit of one scheduler
pub(crate) struct DispatchContext {
    pub plan: SyncPlan,
    bulk_quota: Mutex<QuotaTracker>,
    single_quota: Mutex<QuotaTracker>,
    bulk_throttle: Mutex<FailureThrottle>,
    single_throttle: Mutex<FailureThrottle>,
    /// Caps concurrent submitter calls, not parked units
    execution_slots: Semaphore,
    pub metrics: DispatchMetrics,
}

impl DispatchContext {
    pub fn new(plan: SyncPlan) -> Self {
        Self {
            bulk_quota: Mutex::new(QuotaTracker::from_policy(&plan.bulk)),
            single_quota: Mutex::new(QuotaTracker::from_policy(&plan.single)),
            bulk_throttle: Mutex::new(FailureThrottle::new(
                Channel::Bulk.job_class(),
                &plan.breaker,
            )),
            single_throttle: Mutex::new(FailureThrottle::new(
                Channel::Single.job_class(),
                &plan.breaker,
            )),
            execution_slots: Semaphore::new(plan.workers),
            metrics: DispatchMetrics::new(),
            plan,
        }
    }

    fn quota(&self, channel: Channel) -> &Mutex<QuotaTracker> {
        match channel {
            Channel::Bulk => &self.bulk_quota,
            Channel::Single => &self.single_quota,
        }
    }

    fn throttle(&self, channel: Channel) -> &Mutex<FailureThrottle> {
        match channel {
            Channel::Bulk => &self.bulk_throttle,
            Channel::Single => &self.single_throttle,
        }
    }
}

/// Terminal result of driving one unit
pub(crate) enum UnitResult {
    Succeeded(DispatchUnit),
    Expired(DispatchUnit),
    /// Still pending when the stop signal arrived
    Stopped(DispatchUnit),
}

/// Drive a unit until it reaches a terminal state or the stop signal.
#[instrument(
    name = "drive_unit",
    skip(unit, ctx, submitter, stop),
    fields(channel = %unit.channel, index = unit.index)
)]
pub(crate) async fn drive_unit<S: Submitter + Send + Sync>(
    mut unit: DispatchUnit,
    ctx: Arc<DispatchContext>,
    submitter: Arc<S>,
    mut stop: watch::Receiver<bool>,
) -> UnitResult {
    loop {
        if *stop.borrow() {
            debug!(
                channel = %unit.channel,
                index = unit.index,
                "stop signal set, parking unit for the next run"
            );
            return UnitResult::Stopped(unit);
        }

        let now = Instant::now();
        if unit.check_deadline(now) {
            return finish_expired(&ctx, unit);
        }

        // Breaker gate first so a suspended class never burns quota.
        let gate = ctx.throttle(unit.channel).lock().await.check(now);
        if let Gate::Open { resume_in } = gate {
            ctx.metrics.inc_throttled();
            metrics::counter!("subsync_breaker_parked_total", "channel" => unit.channel.to_string())
                .increment(1);
            debug!(
                channel = %unit.channel,
                index = unit.index,
                resume_in_ms = resume_in.as_millis() as u64,
                "job class suspended, parking unit"
            );
            if wait_or_stop(&mut stop, resume_in).await {
                return UnitResult::Stopped(unit);
            }
            continue;
        }

        // Reserve a quota slot atomically, immediately before execution.
        let admission = ctx.quota(unit.channel).lock().await.try_admit(now);
        if let Admission::Denied { retry_after } = admission {
            ctx.metrics.inc_quota_denied();
            metrics::counter!("subsync_quota_denied_total", "channel" => unit.channel.to_string())
                .increment(1);
            debug!(
                channel = %unit.channel,
                index = unit.index,
                retry_in_ms = retry_after.as_millis() as u64,
                "quota window full, parking unit"
            );
            if wait_or_stop(&mut stop, retry_after).await {
                return UnitResult::Stopped(unit);
            }
            continue;
        }

        unit.mark_admitted();
        ctx.metrics.inc_admitted();
        metrics::counter!("subsync_admissions_total", "channel" => unit.channel.to_string())
            .increment(1);
        debug!(
            channel = %unit.channel,
            index = unit.index,
            attempt = unit.attempts + 1,
            "quota slot reserved"
        );

        // The semaphore caps concurrent submitter calls only; a closed
        // semaphore means the scheduler is being torn down.
        let permit = match ctx.execution_slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => return UnitResult::Stopped(unit),
        };
        // A stop may have arrived while queued for an execution slot; the
        // reserved quota slot stays consumed, which errs on the safe side
        // of the window invariant.
        if *stop.borrow() {
            debug!(
                channel = %unit.channel,
                index = unit.index,
                "stop signal set after admission, parking unit"
            );
            return UnitResult::Stopped(unit);
        }
        unit.mark_executing();
        let outcome = match &unit.payload {
            UnitPayload::Batch(records) => submitter.submit_bulk(unit.index, records).await,
            UnitPayload::Record(record) => submitter.submit_single(unit.index, record).await,
        };
        drop(permit);

        let now = Instant::now();
        match outcome {
            SubmitOutcome::Success => {
                ctx.throttle(unit.channel).lock().await.record_outcome(now, true);
                unit.mark_succeeded();
                ctx.metrics.inc_succeeded_units();
                metrics::counter!("subsync_units_succeeded_total", "channel" => unit.channel.to_string())
                    .increment(1);
                info!(
                    channel = %unit.channel,
                    index = unit.index,
                    attempts = unit.attempts,
                    records = unit.record_count(),
                    "dispatch unit succeeded"
                );
                return UnitResult::Succeeded(unit);
            }
            SubmitOutcome::RateLimited => {
                // Quota pressure, not an exception storm: the breaker and
                // the failure ceiling are left untouched.
                ctx.metrics.inc_rate_limited();
                metrics::counter!("subsync_rate_limited_total", "channel" => unit.channel.to_string())
                    .increment(1);
                match unit.on_rate_limited(now, &ctx.plan.retry) {
                    UnitDisposition::Retry { delay } => {
                        warn!(
                            channel = %unit.channel,
                            index = unit.index,
                            attempt = unit.attempts,
                            cooldown_ms = delay.as_millis() as u64,
                            "rate limited by remote, cooling down"
                        );
                        if wait_or_stop(&mut stop, delay).await {
                            return UnitResult::Stopped(unit);
                        }
                    }
                    UnitDisposition::Expired => return finish_expired(&ctx, unit),
                }
            }
            SubmitOutcome::Error(detail) => {
                ctx.metrics.inc_failures();
                metrics::counter!("subsync_submit_failures_total", "channel" => unit.channel.to_string())
                    .increment(1);
                ctx.throttle(unit.channel).lock().await.record_outcome(now, false);
                let backoff = ctx.plan.channel(unit.channel).retry_backoff();
                match unit.on_failure(now, &ctx.plan.retry, backoff) {
                    UnitDisposition::Retry { delay } => {
                        warn!(
                            channel = %unit.channel,
                            index = unit.index,
                            attempt = unit.attempts,
                            error = %detail,
                            retry_in_ms = delay.as_millis() as u64,
                            "submit failed, retrying"
                        );
                        if wait_or_stop(&mut stop, delay).await {
                            return UnitResult::Stopped(unit);
                        }
                    }
                    UnitDisposition::Expired => {
                        warn!(
                            channel = %unit.channel,
                            index = unit.index,
                            error = %detail,
                            "submit failed, retry budget exhausted"
                        );
                        return finish_expired(&ctx, unit);
                    }
                }
            }
        }
    }
}

fn finish_expired(ctx: &DispatchContext, unit: DispatchUnit) -> UnitResult {
    ctx.metrics.inc_expired_units();
    metrics::counter!("subsync_units_expired_total", "channel" => unit.channel.to_string())
        .increment(1);
    metrics::histogram!("subsync_expired_unit_attempts").record(f64::from(unit.attempts));
    error!(
        channel = %unit.channel,
        index = unit.index,
        attempts = unit.attempts,
        records = unit.record_count(),
        "dispatch unit expired, reporting permanent failure"
    );
    UnitResult::Expired(unit)
}

/// Sleep for `delay`, returning early (true) when the stop signal fires.
async fn wait_or_stop(stop: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    if *stop.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        result = stop.wait_for(|stopped| *stopped) => result.is_ok(),
    }
}
