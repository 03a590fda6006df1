//! # Pool Supervisor
//!
//! Orchestrates the pool lifecycle: bulk registration at startup, the
//! event loop feeding the dispatcher, and graceful shutdown with a
//! bounded drain of in-flight submissions.
//!
//! ## Lifecycle
//!
//! ```text
//! Stopped ──start()──→ Starting ──→ Running ──stop()──→ Stopping ──→ Stopped
//!                         │
//!                         └── fatal (ledger unreachable, no fee) ──→ Stopped
//! ```
//!
//! Fatal errors are confined to `start()`; once running, failures of
//! individual registrations or submissions only show up in the status
//! counters.

use crate::domain::registry::hex20;
use crate::domain::{
    OracleRegistry, PoolConfig, PoolError, PoolMetrics, PoolStatus, SupervisorState,
};
use crate::ports::inbound::OraclePoolApi;
use crate::ports::outbound::{FlightStatusSource, LedgerGateway};
use crate::service::dispatcher::RequestDispatcher;
use crate::service::scheduler::SubmissionScheduler;
use ledger_bus::{EventFilter, LedgerEvent, StartOffset};
use parking_lot::Mutex;
use std::sync::Arc;
use surety_types::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Supervises one oracle pool.
pub struct PoolSupervisor {
    config: PoolConfig,
    gateway: Arc<dyn LedgerGateway>,
    registry: Arc<OracleRegistry>,
    dispatcher: Arc<RequestDispatcher>,
    scheduler: Arc<SubmissionScheduler>,
    metrics: Arc<PoolMetrics>,
    state: Mutex<SupervisorState>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl PoolSupervisor {
    /// Build a supervisor in the `Stopped` state.
    pub fn new(
        config: PoolConfig,
        gateway: Arc<dyn LedgerGateway>,
        status_source: Arc<dyn FlightStatusSource>,
    ) -> Result<Self, PoolError> {
        config.validate()?;

        let registry = Arc::new(OracleRegistry::new());
        let metrics = Arc::new(PoolMetrics::new());
        let scheduler = Arc::new(SubmissionScheduler::new(
            Arc::clone(&gateway),
            status_source,
            config.concurrency_limit,
            Arc::clone(&metrics),
        ));
        let dispatcher = Arc::new(RequestDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&scheduler),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            config,
            gateway,
            registry,
            dispatcher,
            scheduler,
            metrics,
            state: Mutex::new(SupervisorState::Stopped),
            shutdown: Mutex::new(None),
            event_loop: Mutex::new(None),
        })
    }

    /// Register the pool and begin dispatching requests.
    ///
    /// At most `pool_size` of `accounts` are registered. Individual
    /// registration failures are tolerated; the pool starts with
    /// whoever succeeded. Fatal errors (ledger unreachable, fee
    /// unavailable) abort startup and leave the supervisor `Stopped`.
    pub async fn start(&self, accounts: &[Address]) -> Result<(), PoolError> {
        {
            let mut state = self.state.lock();
            if *state != SupervisorState::Stopped {
                return Err(PoolError::NotStopped(*state));
            }
            *state = SupervisorState::Starting;
        }
        info!(pool_size = self.config.pool_size, "Starting oracle pool");

        match self.try_start(accounts).await {
            Ok(()) => {
                *self.state.lock() = SupervisorState::Running;
                info!("Oracle pool running");
                Ok(())
            }
            Err(err) => {
                *self.state.lock() = SupervisorState::Stopped;
                error!(error = %err, "Oracle pool startup failed");
                Err(err)
            }
        }
    }

    async fn try_start(&self, accounts: &[Address]) -> Result<(), PoolError> {
        self.scheduler.reopen();
        match self.gateway.operational().await {
            Ok(true) => {}
            Ok(false) => return Err(PoolError::NotOperational),
            Err(err) => return Err(PoolError::LedgerUnreachable(err)),
        }

        let fee = self
            .gateway
            .registration_fee()
            .await
            .map_err(PoolError::FeeUnavailable)?;
        info!(fee, "Fetched oracle registration fee");

        let pool: Vec<Address> = accounts
            .iter()
            .take(self.config.pool_size)
            .copied()
            .collect();
        self.registry
            .register_all(Arc::clone(&self.gateway), &pool, fee)
            .await;
        let (registered, failed) = self.registry.counts();
        info!(registered, failed, "Oracle pool registration finished");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(event_loop(
            Arc::clone(&self.gateway),
            Arc::clone(&self.dispatcher),
            self.config.start_offset,
            shutdown_rx,
        ));
        *self.shutdown.lock() = Some(shutdown_tx);
        *self.event_loop.lock() = Some(handle);
        Ok(())
    }

    /// Stop dispatching, drain in-flight submissions within the grace
    /// period, and return to `Stopped`.
    ///
    /// Idempotent: calling `stop()` on a stopped supervisor does
    /// nothing.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock();
            if *state == SupervisorState::Stopped {
                debug!("stop() on a stopped supervisor; no-op");
                return;
            }
            *state = SupervisorState::Stopping;
        }
        info!("Stopping oracle pool");

        if let Some(shutdown) = self.shutdown.lock().take() {
            let _ = shutdown.send(true);
        }
        let handle = self.event_loop.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let abandoned = self.scheduler.drain(self.config.stop_grace).await;
        *self.state.lock() = SupervisorState::Stopped;
        info!(abandoned, "Oracle pool stopped");
    }

    /// Shared registry handle, mainly for inspection by hosts/tests.
    #[must_use]
    pub fn registry(&self) -> Arc<OracleRegistry> {
        Arc::clone(&self.registry)
    }
}

impl OraclePoolApi for PoolSupervisor {
    fn status(&self) -> PoolStatus {
        let (registered, failed) = self.registry.counts();
        let snap = self.metrics.snapshot();
        PoolStatus {
            state: *self.state.lock(),
            registered,
            failed,
            requests_processed: snap.requests_processed,
            submissions_issued: snap.submissions_issued,
            submissions_failed: snap.submissions_failed,
            submissions_abandoned: snap.submissions_abandoned,
        }
    }
}

/// Processes feed events in emission order until shut down.
///
/// A lagging subscription refills from the ledger journal inside
/// `Subscription::recv`, so ordering is preserved and nothing is
/// skipped. If the feed closes, one resubscription from the last
/// processed offset is attempted before giving up.
async fn event_loop(
    gateway: Arc<dyn LedgerGateway>,
    dispatcher: Arc<RequestDispatcher>,
    start: StartOffset,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut sub = gateway.subscribe(EventFilter::all(), start);
    let mut interrupted = false;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            next = sub.recv() => match next {
                Some((offset, event)) => {
                    interrupted = false;
                    handle_event(&dispatcher, offset, event);
                }
                None if !interrupted => {
                    interrupted = true;
                    warn!(
                        offset = sub.next_offset(),
                        "Event feed interrupted; resubscribing from last processed offset"
                    );
                    sub = gateway.subscribe(EventFilter::all(), StartOffset::At(sub.next_offset()));
                }
                None => {
                    error!("Event feed closed; no further requests will be dispatched");
                    break;
                }
            }
        }
    }
    debug!("Event loop exited");
}

fn handle_event(dispatcher: &RequestDispatcher, offset: u64, event: LedgerEvent) {
    match event {
        LedgerEvent::OracleRequest { index, flight } => {
            debug!(offset, index, flight = %flight, "Flight status request received");
            dispatcher.on_request(index, &flight);
        }
        LedgerEvent::OracleReport { flight, status } => {
            info!(offset, flight = %flight, %status, "Oracle report accepted by ledger");
        }
        LedgerEvent::FlightStatusFinal { flight, status } => {
            info!(offset, flight = %flight, %status, "Flight status settled");
        }
        LedgerEvent::Paid { passenger, balance } => {
            info!(offset, passenger = %hex20(&passenger), balance, "Insurance payout withdrawn");
        }
    }
}
