//! Sliding-window call quota for one channel.
//!
//! Keeps the timestamps of recent grants so a denial can name the exact
//! instant the next slot frees up, instead of a fixed guess that would
//! herd every parked unit onto the same retry instant.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use contracts::ChannelPolicy;

/// Outcome of one admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Slot reserved; the caller may execute now
    Granted,
    /// Window full; the oldest grant leaves the window after `retry_after`
    Denied { retry_after: Duration },
}

impl Admission {
    /// Whether a slot was reserved
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Rolling-window quota tracker
///
/// Invariant: at most `max_per_window` grants carry a timestamp within
/// `[now - window, now]`, checked before and preserved after every grant.
#[derive(Debug)]
pub struct QuotaTracker {
    window: Duration,
    max_per_window: usize,
    grants: VecDeque<Instant>,
}

impl QuotaTracker {
    /// Create a tracker admitting `max_per_window` calls per `window`
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            window,
            max_per_window,
            grants: VecDeque::with_capacity(max_per_window),
        }
    }

    /// Create a tracker from a channel policy
    pub fn from_policy(policy: &ChannelPolicy) -> Self {
        Self::new(policy.max_per_window, policy.window())
    }

    /// Try to reserve one slot at `now`
    ///
    /// On success the grant is recorded immediately; there is no separate
    /// commit step, so a granted slot is consumed even if the subsequent
    /// call fails.
    pub fn try_admit(&mut self, now: Instant) -> Admission {
        self.evict_expired(now);

        if self.grants.len() < self.max_per_window {
            self.grants.push_back(now);
            return Admission::Granted;
        }

        // The front grant is the oldest still inside the window.
        let oldest = self.grants.front().copied().unwrap_or(now);
        let retry_after = (oldest + self.window).saturating_duration_since(now);
        Admission::Denied { retry_after }
    }

    /// Slots still available at `now`
    pub fn available(&mut self, now: Instant) -> usize {
        self.evict_expired(now);
        self.max_per_window - self.grants.len()
    }

    /// Grants currently inside the window at `now`
    pub fn in_window(&mut self, now: Instant) -> usize {
        self.evict_expired(now);
        self.grants.len()
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(&front) = self.grants.front() {
            if now.saturating_duration_since(front) >= self.window {
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }
}
