//! # Response Submission Scheduler
//!
//! Executes response submissions as independent tasks under a bounded
//! concurrency cap. Each submission acquires a semaphore permit before
//! touching the ledger; tokio's permit queue is FIFO, so queued
//! submissions run in arrival order.
//!
//! Submissions are best effort: a rejection or timeout is logged as a
//! warning and counted, never retried and never propagated. Any one
//! oracle's miss does not prevent consensus among the others.

use crate::domain::registry::hex20;
use crate::domain::PoolMetrics;
use crate::ports::outbound::{FlightStatusSource, LedgerGateway};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use surety_types::{Address, FlightKey};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One unit of work: a specific oracle answering a specific request.
#[derive(Debug, Clone)]
pub struct ResponseSubmission {
    /// The responding oracle's address.
    pub oracle: Address,
    /// The request index that selected this oracle.
    pub index: u8,
    /// The flight being reported on.
    pub flight: FlightKey,
}

/// Decrements the pending count when a submission task finishes for any
/// reason, including abort.
struct PendingGuard {
    pending: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl PendingGuard {
    fn new(pending: Arc<AtomicUsize>, drained: Arc<Notify>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self { pending, drained }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Concurrency-bounded executor for response submissions.
pub struct SubmissionScheduler {
    gateway: Arc<dyn LedgerGateway>,
    status_source: Arc<dyn FlightStatusSource>,
    concurrency_limit: usize,
    /// Swapped for a fresh semaphore on `reopen`; `drain` closes the
    /// current one so queued tasks cannot start late.
    permits: Mutex<Arc<Semaphore>>,
    metrics: Arc<PoolMetrics>,
    /// Tasks spawned but not yet finished (queued + actively submitting).
    pending: Arc<AtomicUsize>,
    /// Signalled whenever `pending` drops to zero.
    drained: Arc<Notify>,
    /// Cleared on drain; late submissions are dropped.
    accepting: AtomicBool,
    tasks: Mutex<JoinSet<()>>,
}

impl SubmissionScheduler {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        status_source: Arc<dyn FlightStatusSource>,
        concurrency_limit: usize,
        metrics: Arc<PoolMetrics>,
    ) -> Self {
        Self {
            gateway,
            status_source,
            concurrency_limit,
            permits: Mutex::new(Arc::new(Semaphore::new(concurrency_limit))),
            metrics,
            pending: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
            accepting: AtomicBool::new(true),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Hand a submission to the pool. Fire-and-forget: the caller never
    /// waits for ledger confirmation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, task: ResponseSubmission) {
        if !self.accepting.load(Ordering::Acquire) {
            debug!(oracle = %hex20(&task.oracle), "Scheduler draining; submission dropped");
            return;
        }

        let guard = PendingGuard::new(Arc::clone(&self.pending), Arc::clone(&self.drained));
        let gateway = Arc::clone(&self.gateway);
        let status_source = Arc::clone(&self.status_source);
        let permits = Arc::clone(&self.permits.lock());
        let metrics = Arc::clone(&self.metrics);

        let mut tasks = self.tasks.lock();
        // Reap finished entries so the set does not grow with history.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire().await else {
                debug!(oracle = %hex20(&task.oracle), "Scheduler closed before submission started");
                return;
            };

            let status = status_source.observe(&task.oracle, &task.flight);
            match gateway
                .submit_oracle_response(task.oracle, task.index, &task.flight, status)
                .await
            {
                Ok(_receipt) => {
                    metrics.inc_submissions_issued();
                    debug!(
                        oracle = %hex20(&task.oracle),
                        index = task.index,
                        flight = %task.flight,
                        %status,
                        "Oracle response accepted"
                    );
                }
                Err(err) => {
                    metrics.inc_submissions_failed();
                    warn!(
                        oracle = %hex20(&task.oracle),
                        index = task.index,
                        flight = %task.flight,
                        error = %err,
                        "Oracle response not accepted"
                    );
                }
            }
        });
    }

    /// Submissions spawned but not yet finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Accept work again after a drain, with a fresh permit pool.
    pub fn reopen(&self) {
        *self.permits.lock() = Arc::new(Semaphore::new(self.concurrency_limit));
        self.accepting.store(true, Ordering::Release);
    }

    /// Stop accepting work and wait up to `grace` for in-flight
    /// submissions to finish. Returns how many were abandoned.
    ///
    /// Abandoned submissions are aborted and counted; they are logged,
    /// never retried.
    pub async fn drain(&self, grace: Duration) -> u64 {
        self.accepting.store(false, Ordering::Release);

        let wait = async {
            loop {
                let notified = self.drained.notified();
                if self.pending.load(Ordering::SeqCst) == 0 {
                    return;
                }
                notified.await;
            }
        };

        if tokio::time::timeout(grace, wait).await.is_ok() {
            let mut tasks = self.tasks.lock();
            while tasks.try_join_next().is_some() {}
            return 0;
        }

        // Grace expired: keep queued tasks from starting, abort the rest.
        self.permits.lock().close();
        let abandoned = self.pending.load(Ordering::SeqCst) as u64;
        self.tasks.lock().abort_all();
        self.metrics.add_submissions_abandoned(abandoned);
        warn!(abandoned, "Abandoned in-flight submissions after grace period");
        abandoned
    }
}
