//! Windowed-failure circuit breaker for one job class.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use contracts::BreakerPolicy;
use tracing::{info, warn};

/// Breaker state reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Executions may proceed
    Closed,
    /// Class suspended; re-check after `resume_in`
    Open { resume_in: Duration },
}

impl Gate {
    /// Whether executions may proceed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Per-job-class failure throttle
///
/// Reaching `max_failures` failures within the trailing window suspends
/// the whole class for `cooldown`. The failure window resets when the
/// breaker closes again; successes do not drain it, only time does.
#[derive(Debug)]
pub struct FailureThrottle {
    job_class: &'static str,
    max_failures: usize,
    window: Duration,
    cooldown: Duration,
    failures: VecDeque<Instant>,
    open_until: Option<Instant>,
}

impl FailureThrottle {
    /// Create a throttle for `job_class` from a breaker policy
    pub fn new(job_class: &'static str, policy: &BreakerPolicy) -> Self {
        Self {
            job_class,
            max_failures: policy.max_failures,
            window: policy.window(),
            cooldown: policy.cooldown(),
            failures: VecDeque::new(),
            open_until: None,
        }
    }

    /// Record one execution outcome at `now`
    ///
    /// Only failures feed the window; an explicit rate-limit response is
    /// not reported here at all.
    pub fn record_outcome(&mut self, now: Instant, success: bool) {
        if success || self.open_until.is_some() {
            return;
        }

        self.evict_expired(now);
        self.failures.push_back(now);

        if self.failures.len() >= self.max_failures {
            self.open_until = Some(now + self.cooldown);
            self.failures.clear();
            warn!(
                job_class = self.job_class,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "failure threshold reached, suspending job class"
            );
        }
    }

    /// Check whether the class may execute at `now`
    pub fn check(&mut self, now: Instant) -> Gate {
        if let Some(until) = self.open_until {
            if now < until {
                return Gate::Open {
                    resume_in: until - now,
                };
            }
            // Cooldown elapsed with no execution in between; close and
            // start a fresh window.
            self.open_until = None;
            self.failures.clear();
            info!(job_class = self.job_class, "cooldown elapsed, resuming job class");
        }
        Gate::Closed
    }

    /// Failures currently inside the window at `now`
    pub fn failure_count(&mut self, now: Instant) -> usize {
        self.evict_expired(now);
        self.failures.len()
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(&front) = self.failures.front() {
            if now.saturating_duration_since(front) >= self.window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }
}
