//! Pool liveness status and counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Supervisor lifecycle.
///
/// ```text
/// Stopped → Starting → Running → Stopping → Stopped
///              │
///              └── fatal startup error ──→ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Atomic counters shared by dispatcher and scheduler.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    requests_processed: AtomicU64,
    submissions_issued: AtomicU64,
    submissions_failed: AtomicU64,
    submissions_abandoned: AtomicU64,
}

impl PoolMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests_processed(&self) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_submissions_issued(&self) {
        self.submissions_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_submissions_failed(&self) {
        self.submissions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_submissions_abandoned(&self, count: u64) {
        self.submissions_abandoned.fetch_add(count, Ordering::Relaxed);
    }

    /// Consistent-enough snapshot for status reporting.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_processed: self.requests_processed.load(Ordering::Relaxed),
            submissions_issued: self.submissions_issued.load(Ordering::Relaxed),
            submissions_failed: self.submissions_failed.load(Ordering::Relaxed),
            submissions_abandoned: self.submissions_abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub requests_processed: u64,
    pub submissions_issued: u64,
    pub submissions_failed: u64,
    pub submissions_abandoned: u64,
}

/// The supervisor's liveness/status answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Supervisor lifecycle state.
    pub state: SupervisorState,
    /// Oracles successfully registered.
    pub registered: usize,
    /// Oracles whose registration failed.
    pub failed: usize,
    /// Distinct request events processed.
    pub requests_processed: u64,
    /// Submissions confirmed by the ledger.
    pub submissions_issued: u64,
    /// Submissions rejected or timed out.
    pub submissions_failed: u64,
    /// Submissions abandoned at shutdown.
    pub submissions_abandoned: u64,
}
