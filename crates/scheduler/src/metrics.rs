//! Dispatch metrics for observability.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every unit task of a scheduler
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Quota slots granted
    admitted: AtomicU64,
    /// Admission attempts denied by a full quota window
    quota_denied: AtomicU64,
    /// Admission attempts parked by an open breaker
    throttled: AtomicU64,
    /// Explicit rate-limit responses from the submitter
    rate_limited: AtomicU64,
    /// Transient submit failures
    failures: AtomicU64,
    /// Units that reached `Succeeded`
    succeeded_units: AtomicU64,
    /// Units that reached `Expired`
    expired_units: AtomicU64,
}

impl DispatchMetrics {
    /// Create a zeroed metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_quota_denied(&self) {
        self.quota_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_succeeded_units(&self) {
        self.succeeded_units.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_expired_units(&self) {
        self.expired_units.fetch_add(1, Ordering::Relaxed);
    }

    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn quota_denied(&self) -> u64 {
        self.quota_denied.load(Ordering::Relaxed)
    }

    pub fn throttled(&self) -> u64 {
        self.throttled.load(Ordering::Relaxed)
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            quota_denied: self.quota_denied.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            succeeded_units: self.succeeded_units.load(Ordering::Relaxed),
            expired_units: self.expired_units.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch counters (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub admitted: u64,
    pub quota_denied: u64,
    pub throttled: u64,
    pub rate_limited: u64,
    pub failures: u64,
    pub succeeded_units: u64,
    pub expired_units: u64,
}
