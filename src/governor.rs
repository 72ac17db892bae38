//! Consecutive-failure tracking and the tolerate/escalate decision.

use crate::metrics::CycleMetrics;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep running with the previous metrics.
    Tolerate { failures: i64 },
    /// Too many failures in a row; the process must stop.
    Escalate { failures: i64 },
}

/// Counts failed polls since the last success. Shared by concurrently
/// running cycles, so the counter is atomic.
#[derive(Debug)]
pub struct FailureGovernor {
    threshold: i64,
    consecutive: AtomicI64,
}

impl FailureGovernor {
    /// `threshold <= 0` tolerates any number of failures.
    pub fn new(threshold: i64) -> Self {
        Self {
            threshold,
            consecutive: AtomicI64::new(0),
        }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn consecutive_failures(&self) -> i64 {
        self.consecutive.load(Ordering::SeqCst)
    }

    pub fn record_success(&self) {
        self.consecutive.store(0, Ordering::SeqCst);
        CycleMetrics::set_consecutive_failures(0);
    }

    pub fn record_failure(&self) -> Verdict {
        let failures = self.consecutive.fetch_add(1, Ordering::SeqCst) + 1;
        CycleMetrics::set_consecutive_failures(failures);

        if self.threshold <= 0 || failures <= self.threshold {
            Verdict::Tolerate { failures }
        } else {
            Verdict::Escalate { failures }
        }
    }
}
