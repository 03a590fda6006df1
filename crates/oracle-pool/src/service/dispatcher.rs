//! # Request Dispatcher
//!
//! Matches each incoming flight-status request against the registry and
//! hands one submission per eligible oracle to the scheduler.
//!
//! Dispatch is fire-and-forget per oracle: the dispatcher never awaits
//! ledger confirmation, so one slow or failing oracle cannot delay the
//! others' submissions for the same request. Redelivered events (the
//! feed is at-least-once) are absorbed by the dispatch log.

use crate::domain::registry::hex20;
use crate::domain::{DispatchLog, OracleRegistry, PoolMetrics, RequestKey};
use crate::service::scheduler::{ResponseSubmission, SubmissionScheduler};
use std::sync::Arc;
use surety_types::FlightKey;
use tracing::{debug, info};

/// Routes `OracleRequest` events to eligible oracles.
pub struct RequestDispatcher {
    registry: Arc<OracleRegistry>,
    scheduler: Arc<SubmissionScheduler>,
    log: DispatchLog,
    metrics: Arc<PoolMetrics>,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<OracleRegistry>,
        scheduler: Arc<SubmissionScheduler>,
        metrics: Arc<PoolMetrics>,
    ) -> Self {
        Self {
            registry,
            scheduler,
            log: DispatchLog::new(),
            metrics,
        }
    }

    /// Handle one incoming flight-status request event. Returns how
    /// many submissions were dispatched (zero for a full redelivery).
    pub fn on_request(&self, index: u8, flight: &FlightKey) -> usize {
        let key = RequestKey {
            index,
            flight: flight.clone(),
        };

        if self.log.first_request(&key) {
            self.metrics.inc_requests_processed();
        } else {
            debug!(index, flight = %flight, "Request redelivered");
        }

        let mut dispatched = 0;
        for identity in self.registry.matching(index) {
            if self.log.first_dispatch(identity.address, &key) {
                self.scheduler.submit(ResponseSubmission {
                    oracle: identity.address,
                    index,
                    flight: flight.clone(),
                });
                dispatched += 1;
            } else {
                debug!(
                    oracle = %hex20(&identity.address),
                    index,
                    flight = %flight,
                    "Duplicate dispatch suppressed"
                );
            }
        }

        info!(
            index,
            flight = %flight,
            dispatched,
            "Flight status request dispatched"
        );
        dispatched
    }
}
