//! Scheduling policy contracts shared across crates.
//!
//! Defaults mirror the production quotas: bulk 50 calls/hour of 1,000
//! records, single 3,600 calls/hour, 5 attempts within 30 minutes,
//! breaker at 10 failures per 5 minutes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Channel, BULK_CALLS_PER_HOUR, BULK_CHUNK_SIZE, SINGLE_CALLS_PER_HOUR};

/// Top-level scheduling plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncPlan {
    /// Bulk channel quota policy
    #[serde(default = "ChannelPolicy::bulk")]
    #[validate(nested)]
    pub bulk: ChannelPolicy,

    /// Single channel quota policy
    #[serde(default = "ChannelPolicy::single")]
    #[validate(nested)]
    pub single: ChannelPolicy,

    /// Retry policy shared by both channels
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryPolicy,

    /// Failure breaker policy, per job class
    #[serde(default)]
    #[validate(nested)]
    pub breaker: BreakerPolicy,

    /// Maximum concurrent submitter calls
    #[serde(default = "default_workers")]
    #[validate(range(min = 1))]
    pub workers: usize,
}

impl Default for SyncPlan {
    fn default() -> Self {
        Self {
            bulk: ChannelPolicy::bulk(),
            single: ChannelPolicy::single(),
            retry: RetryPolicy::default(),
            breaker: BreakerPolicy::default(),
            workers: default_workers(),
        }
    }
}

impl SyncPlan {
    /// Policy for the given channel
    pub fn channel(&self, channel: Channel) -> &ChannelPolicy {
        match channel {
            Channel::Bulk => &self.bulk,
            Channel::Single => &self.single,
        }
    }

    /// Cross-channel record budget for one scheduling run
    pub fn run_record_budget(&self) -> usize {
        self.bulk.records_per_run() + self.single.max_per_window
    }
}

fn default_workers() -> usize {
    8
}

/// Quota and backoff policy for one channel
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChannelPolicy {
    /// Calls admitted per rolling window
    #[validate(range(min = 1))]
    pub max_per_window: usize,

    /// Rolling window length in seconds
    #[validate(range(min = 1))]
    pub window_secs: u64,

    /// Records carried by one call
    #[validate(range(min = 1))]
    pub records_per_call: usize,

    /// Base of the linear per-retry backoff, in milliseconds
    pub retry_backoff_ms: u64,
}

impl ChannelPolicy {
    /// Production bulk policy: 50 calls/hour, 1,000 records each, 2 s backoff
    pub fn bulk() -> Self {
        Self {
            max_per_window: BULK_CALLS_PER_HOUR,
            window_secs: 3_600,
            records_per_call: BULK_CHUNK_SIZE,
            retry_backoff_ms: 2_000,
        }
    }

    /// Production single policy: 3,600 calls/hour, one record each, 5 s backoff
    pub fn single() -> Self {
        Self {
            max_per_window: SINGLE_CALLS_PER_HOUR,
            window_secs: 3_600,
            records_per_call: 1,
            retry_backoff_ms: 5_000,
        }
    }

    /// Records admissible through this channel in one scheduling run
    pub fn records_per_run(&self) -> usize {
        self.max_per_window * self.records_per_call
    }

    /// Rolling window length
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Linear backoff base
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Retry ceiling and cooldown policy, applied to both channels
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetryPolicy {
    /// Transient failures tolerated before a unit expires
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// Retry deadline measured from first enqueue, in seconds
    #[validate(range(min = 1))]
    pub deadline_secs: u64,

    /// Fixed cooldown after an explicit rate-limit response, in milliseconds
    pub rate_limit_cooldown_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            deadline_secs: 30 * 60,
            rate_limit_cooldown_ms: 5 * 60 * 1_000,
        }
    }
}

impl RetryPolicy {
    /// Retry deadline measured from first enqueue
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Fixed rate-limit cooldown
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown_ms)
    }
}

/// Windowed-failure breaker policy, per job class
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BreakerPolicy {
    /// Failures within the window that open the breaker
    #[validate(range(min = 1))]
    pub max_failures: usize,

    /// Trailing failure window in seconds
    #[validate(range(min = 1))]
    pub window_secs: u64,

    /// Suspension length once open, in milliseconds
    #[validate(range(min = 1))]
    pub cooldown_ms: u64,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            max_failures: 10,
            window_secs: 5 * 60,
            cooldown_ms: 5 * 60 * 1_000,
        }
    }
}

impl BreakerPolicy {
    /// Trailing failure window
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Suspension length once open
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_matches_production_quotas() {
        let plan = SyncPlan::default();
        assert_eq!(plan.bulk.max_per_window, 50);
        assert_eq!(plan.bulk.records_per_call, 1_000);
        assert_eq!(plan.single.max_per_window, 3_600);
        assert_eq!(plan.single.records_per_call, 1);
        assert_eq!(plan.run_record_budget(), 53_600);
        assert_eq!(plan.retry.max_attempts, 5);
        assert_eq!(plan.retry.deadline(), Duration::from_secs(1_800));
        assert_eq!(plan.breaker.max_failures, 10);
    }

    #[test]
    fn test_plan_deserializes_with_defaults() {
        let plan: SyncPlan = serde_json::from_str("{}").unwrap();
        assert_eq!(plan.workers, 8);
        assert_eq!(plan.bulk.retry_backoff(), Duration::from_millis(2_000));
        assert_eq!(plan.single.retry_backoff(), Duration::from_millis(5_000));
    }

    #[test]
    fn test_validate_rejects_zero_quota() {
        let mut plan = SyncPlan::default();
        plan.bulk.max_per_window = 0;
        assert!(plan.validate().is_err());
    }
}
