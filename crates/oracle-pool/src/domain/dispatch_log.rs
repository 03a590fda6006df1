//! De-duplication of dispatched submissions.
//!
//! The ledger subscription is at-least-once: the same `OracleRequest`
//! event may be delivered more than once. This log remembers, for the
//! lifetime of the process, which (oracle, request) pairs have already
//! been handed to the scheduler, so a redelivery never produces a
//! second submission.

use parking_lot::Mutex;
use std::collections::HashSet;
use surety_types::{Address, FlightKey};

/// Identity of one flight-status request: the request index plus the
/// flight triple it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub index: u8,
    pub flight: FlightKey,
}

#[derive(Default)]
struct LogInner {
    /// Distinct requests seen (for the processed counter).
    requests: HashSet<RequestKey>,
    /// (oracle, request) pairs already dispatched.
    dispatched: HashSet<(Address, RequestKey)>,
}

/// Concurrency-safe dispatch memory.
///
/// Both checks are atomic check-and-insert under one mutex, so
/// concurrent event callbacks cannot both win for the same pair.
/// Unbounded by design: entries live as long as the process, and a
/// demo run's request volume is small.
#[derive(Default)]
pub struct DispatchLog {
    inner: Mutex<LogInner>,
}

impl DispatchLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request; true iff this is its first delivery.
    pub fn first_request(&self, key: &RequestKey) -> bool {
        self.inner.lock().requests.insert(key.clone())
    }

    /// Record a dispatch; true iff this (oracle, request) pair has not
    /// been dispatched before.
    pub fn first_dispatch(&self, oracle: Address, key: &RequestKey) -> bool {
        self.inner.lock().dispatched.insert((oracle, key.clone()))
    }

    /// Number of distinct requests seen.
    #[must_use]
    pub fn requests_seen(&self) -> usize {
        self.inner.lock().requests.len()
    }
}
