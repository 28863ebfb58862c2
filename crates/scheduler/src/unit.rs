//! DispatchUnit - one retryable unit of work and its state machine.
//!
//! States: `Pending -> Admitted -> Executing -> {Succeeded | Expired}`,
//! with rate-limit and failure outcomes looping back to `Pending` until
//! the retry ceiling or the deadline cuts the unit off.

use std::time::{Duration, Instant};

use contracts::{Channel, RetryPolicy, UpdateRecord};

/// Lifecycle state of a dispatch unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Awaiting quota admission
    Pending,
    /// Quota slot reserved; queued for execution
    Admitted,
    /// Submitter call in flight
    Executing,
    /// Terminal: payload confirmed
    Succeeded,
    /// Terminal: retry ceiling or deadline exceeded
    Expired,
}

/// Payload carried by a unit
#[derive(Debug, Clone)]
pub enum UnitPayload {
    /// Ordered chunk of at most the bulk chunk size
    Batch(Vec<UpdateRecord>),
    /// Exactly one record
    Record(Box<UpdateRecord>),
}

/// What to do with a unit after a non-success outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitDisposition {
    /// Return to `Pending` and re-attempt admission after `delay`
    Retry { delay: Duration },
    /// Terminal: report permanent failure
    Expired,
}

/// One retryable unit of work
///
/// Owned exclusively by its driving task until terminal; at most one
/// execution of a unit is in flight at any time.
#[derive(Debug)]
pub struct DispatchUnit {
    /// Channel the unit is assigned to
    pub channel: Channel,
    /// Payload submitted on every attempt
    pub payload: UnitPayload,
    /// Sequence index within the channel, in partition order
    pub index: u64,
    /// Submitter executions so far (reported on expiry)
    pub attempts: u32,
    /// Transient failures so far (bounded by the retry ceiling)
    pub failures: u32,
    /// When the unit was created by partitioning
    pub first_enqueued: Instant,
    /// Hard retry deadline; no execution starts past this point
    pub deadline: Instant,
    /// Current lifecycle state
    pub state: UnitState,
}

impl DispatchUnit {
    /// Create a bulk unit carrying one ordered chunk
    pub fn batch(
        index: u64,
        records: Vec<UpdateRecord>,
        now: Instant,
        retry: &RetryPolicy,
    ) -> Self {
        Self::new(Channel::Bulk, UnitPayload::Batch(records), index, now, retry)
    }

    /// Create a single-record unit
    pub fn single(index: u64, record: UpdateRecord, now: Instant, retry: &RetryPolicy) -> Self {
        Self::new(
            Channel::Single,
            UnitPayload::Record(Box::new(record)),
            index,
            now,
            retry,
        )
    }

    fn new(
        channel: Channel,
        payload: UnitPayload,
        index: u64,
        now: Instant,
        retry: &RetryPolicy,
    ) -> Self {
        Self {
            channel,
            payload,
            index,
            attempts: 0,
            failures: 0,
            first_enqueued: now,
            deadline: now + retry.deadline(),
            state: UnitState::Pending,
        }
    }

    /// Records carried by the unit
    pub fn record_count(&self) -> usize {
        match &self.payload {
            UnitPayload::Batch(records) => records.len(),
            UnitPayload::Record(_) => 1,
        }
    }

    /// Identity keys of the carried records
    pub fn identity_keys(&self) -> Vec<String> {
        match &self.payload {
            UnitPayload::Batch(records) => records.iter().map(|r| r.email.clone()).collect(),
            UnitPayload::Record(record) => vec![record.email.clone()],
        }
    }

    /// Consume the unit, returning its records (for deferred reporting)
    pub fn into_records(self) -> Vec<UpdateRecord> {
        match self.payload {
            UnitPayload::Batch(records) => records,
            UnitPayload::Record(record) => vec![*record],
        }
    }

    /// Quota slot reserved; queued for execution
    pub fn mark_admitted(&mut self) {
        self.state = UnitState::Admitted;
    }

    /// Submitter call started; counts one attempt
    pub fn mark_executing(&mut self) {
        self.state = UnitState::Executing;
        self.attempts += 1;
    }

    /// Payload confirmed
    pub fn mark_succeeded(&mut self) {
        self.state = UnitState::Succeeded;
    }

    /// Expire the unit if its deadline has passed while pending
    ///
    /// Returns true when the unit transitioned to `Expired`.
    pub fn check_deadline(&mut self, now: Instant) -> bool {
        if now >= self.deadline {
            self.state = UnitState::Expired;
            return true;
        }
        false
    }

    /// Explicit rate-limit response: fixed cooldown before re-admission.
    ///
    /// Does not count toward the retry ceiling; only the deadline bounds
    /// an endlessly rate-limited unit.
    pub fn on_rate_limited(&mut self, now: Instant, retry: &RetryPolicy) -> UnitDisposition {
        if now >= self.deadline {
            self.state = UnitState::Expired;
            return UnitDisposition::Expired;
        }
        self.state = UnitState::Pending;
        UnitDisposition::Retry {
            delay: retry.rate_limit_cooldown(),
        }
    }

    /// Transient failure: counts toward the retry ceiling.
    ///
    /// The retry delay grows linearly with the failure count so repeated
    /// transient failures spread out before the breaker ever trips.
    pub fn on_failure(
        &mut self,
        now: Instant,
        retry: &RetryPolicy,
        backoff_base: Duration,
    ) -> UnitDisposition {
        self.failures += 1;
        if self.failures >= retry.max_attempts || now >= self.deadline {
            self.state = UnitState::Expired;
            return UnitDisposition::Expired;
        }
        self.state = UnitState::Pending;
        UnitDisposition::Retry {
            delay: backoff_base * self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> UpdateRecord {
        UpdateRecord::new(email).with_attribute("time_zone", "America/New_York")
    }

    fn retry_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            deadline_secs: 1_800,
            rate_limit_cooldown_ms: 300_000,
        }
    }

    #[test]
    fn test_execution_counts_attempts() {
        let now = Instant::now();
        let mut unit = DispatchUnit::single(0, record("a@acme.com"), now, &retry_policy());

        assert_eq!(unit.state, UnitState::Pending);
        unit.mark_admitted();
        unit.mark_executing();
        assert_eq!(unit.state, UnitState::Executing);
        assert_eq!(unit.attempts, 1);

        unit.mark_succeeded();
        assert_eq!(unit.state, UnitState::Succeeded);
    }

    #[test]
    fn test_rate_limited_is_not_a_failure() {
        let now = Instant::now();
        let retry = retry_policy();
        let mut unit = DispatchUnit::single(0, record("a@acme.com"), now, &retry);

        // Far more rate-limit bounces than the failure ceiling allows.
        for _ in 0..20 {
            unit.mark_admitted();
            unit.mark_executing();
            let disposition = unit.on_rate_limited(now + Duration::from_secs(60), &retry);
            assert_eq!(
                disposition,
                UnitDisposition::Retry {
                    delay: Duration::from_secs(300)
                }
            );
        }

        assert_eq!(unit.failures, 0);
        assert_eq!(unit.attempts, 20);
        assert_eq!(unit.state, UnitState::Pending);
    }

    #[test]
    fn test_rate_limited_past_deadline_expires() {
        let now = Instant::now();
        let retry = retry_policy();
        let mut unit = DispatchUnit::single(0, record("a@acme.com"), now, &retry);

        unit.mark_executing();
        let disposition = unit.on_rate_limited(now + Duration::from_secs(1_800), &retry);
        assert_eq!(disposition, UnitDisposition::Expired);
        assert_eq!(unit.state, UnitState::Expired);
    }

    #[test]
    fn test_failure_ceiling_expires_unit() {
        let now = Instant::now();
        let retry = retry_policy();
        let backoff = Duration::from_secs(2);
        let mut unit = DispatchUnit::batch(3, vec![record("a@acme.com")], now, &retry);

        for expected_failures in 1..5u32 {
            unit.mark_executing();
            match unit.on_failure(now, &retry, backoff) {
                UnitDisposition::Retry { delay } => {
                    // Linear backoff: base times failure count.
                    assert_eq!(delay, backoff * expected_failures);
                }
                UnitDisposition::Expired => panic!("expired before the ceiling"),
            }
        }

        unit.mark_executing();
        assert_eq!(unit.on_failure(now, &retry, backoff), UnitDisposition::Expired);
        assert_eq!(unit.failures, 5);
        assert_eq!(unit.attempts, 5);
    }

    #[test]
    fn test_deadline_check_expires_pending_unit() {
        let now = Instant::now();
        let retry = retry_policy();
        let mut unit = DispatchUnit::single(0, record("a@acme.com"), now, &retry);

        assert!(!unit.check_deadline(now + Duration::from_secs(1_799)));
        assert!(unit.check_deadline(now + Duration::from_secs(1_800)));
        assert_eq!(unit.state, UnitState::Expired);
    }

    #[test]
    fn test_into_records_returns_payload() {
        let now = Instant::now();
        let retry = retry_policy();
        let unit = DispatchUnit::batch(
            0,
            vec![record("a@acme.com"), record("b@acme.com")],
            now,
            &retry,
        );

        assert_eq!(unit.record_count(), 2);
        assert_eq!(unit.identity_keys(), vec!["a@acme.com", "b@acme.com"]);
        let records = unit.into_records();
        assert_eq!(records.len(), 2);
    }
}
