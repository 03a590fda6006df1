//! # Outbound (Driven) Ports
//!
//! Dependencies the oracle pool needs from its environment: the ledger
//! it registers and submits against, and a source of observed flight
//! status.

use async_trait::async_trait;
use ledger_bus::{EventFilter, StartOffset, Subscription};
use rand::Rng;
use surety_types::{Address, FlightKey, FlightStatus, IndexSet, SendError, TransactionReceipt, Wei};

/// The external ledger, as consumed by the pool.
///
/// Read calls (`operational`, `registration_fee`) and state-changing
/// sends map onto the contract methods of the same names; `subscribe`
/// is the node's event feed, restartable from an offset, with
/// at-least-once delivery.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Read-only: whether the contract accepts transactions.
    async fn operational(&self) -> Result<bool, SendError>;

    /// Read-only: the fee a registration must carry.
    async fn registration_fee(&self) -> Result<Wei, SendError>;

    /// Send `registerOracle()` from `from`, paying `value`.
    async fn register_oracle(
        &self,
        from: Address,
        value: Wei,
    ) -> Result<TransactionReceipt, SendError>;

    /// Read the index set assigned to `from` (`getMyIndexes()`).
    async fn oracle_indexes(&self, from: Address) -> Result<IndexSet, SendError>;

    /// Send `submitOracleResponse(...)` from `from`.
    async fn submit_oracle_response(
        &self,
        from: Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<TransactionReceipt, SendError>;

    /// Subscribe to the ledger's event feed.
    fn subscribe(&self, filter: EventFilter, offset: StartOffset) -> Subscription;
}

/// Where an oracle's reported status comes from.
///
/// The simulation draws at random; a production oracle would plug in a
/// source backed by real flight data. Swapping the source changes
/// nothing in the coordination logic.
pub trait FlightStatusSource: Send + Sync {
    /// The status `oracle` observes for `flight`.
    fn observe(&self, oracle: &Address, flight: &FlightKey) -> FlightStatus;
}

/// Simulation policy: uniform draw over all defined status codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFlightStatus;

impl FlightStatusSource for RandomFlightStatus {
    fn observe(&self, _oracle: &Address, _flight: &FlightKey) -> FlightStatus {
        let pick = rand::thread_rng().gen_range(0..FlightStatus::ALL.len());
        FlightStatus::ALL[pick]
    }
}

/// Mock ledger for in-crate service tests.
#[cfg(test)]
pub struct MockLedger {
    bus: ledger_bus::LedgerBus,
    fee: Wei,
    reachable: std::sync::atomic::AtomicBool,
    operational: std::sync::atomic::AtomicBool,
    indexes: parking_lot::Mutex<std::collections::HashMap<Address, IndexSet>>,
    fail_register: parking_lot::Mutex<std::collections::HashSet<Address>>,
    fail_submit: parking_lot::Mutex<std::collections::HashMap<Address, SendError>>,
    submit_delay: parking_lot::Mutex<Option<std::time::Duration>>,
    submissions: parking_lot::Mutex<Vec<(Address, u8, FlightKey, FlightStatus)>>,
    in_flight: std::sync::atomic::AtomicUsize,
    max_in_flight: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockLedger {
    pub fn new() -> Self {
        Self {
            bus: ledger_bus::LedgerBus::new(),
            fee: 1_000_000_000_000_000_000,
            reachable: std::sync::atomic::AtomicBool::new(true),
            operational: std::sync::atomic::AtomicBool::new(true),
            indexes: parking_lot::Mutex::new(std::collections::HashMap::new()),
            fail_register: parking_lot::Mutex::new(std::collections::HashSet::new()),
            fail_submit: parking_lot::Mutex::new(std::collections::HashMap::new()),
            submit_delay: parking_lot::Mutex::new(None),
            submissions: parking_lot::Mutex::new(Vec::new()),
            in_flight: std::sync::atomic::AtomicUsize::new(0),
            max_in_flight: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn with_indexes(self, oracle: Address, set: IndexSet) -> Self {
        self.indexes.lock().insert(oracle, set);
        self
    }

    pub fn failing_registration(self, oracle: Address) -> Self {
        self.fail_register.lock().insert(oracle);
        self
    }

    pub fn failing_submission(self, oracle: Address, error: SendError) -> Self {
        self.fail_submit.lock().insert(oracle, error);
        self
    }

    pub fn with_submit_delay(self, delay: std::time::Duration) -> Self {
        *self.submit_delay.lock() = Some(delay);
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable
            .store(reachable, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_operational(&self, operational: bool) {
        self.operational
            .store(operational, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn publish_request(&self, index: u8, flight: FlightKey) -> u64 {
        self.bus
            .publish(ledger_bus::LedgerEvent::OracleRequest { index, flight })
    }

    pub fn submissions(&self) -> Vec<(Address, u8, FlightKey, FlightStatus)> {
        self.submissions.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), SendError> {
        if self.reachable.load(std::sync::atomic::Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SendError::NetworkError("connection refused".into()))
        }
    }
}

#[cfg(test)]
#[async_trait]
impl LedgerGateway for MockLedger {
    async fn operational(&self) -> Result<bool, SendError> {
        self.check_reachable()?;
        Ok(self.operational.load(std::sync::atomic::Ordering::SeqCst))
    }

    async fn registration_fee(&self) -> Result<Wei, SendError> {
        self.check_reachable()?;
        Ok(self.fee)
    }

    async fn register_oracle(
        &self,
        from: Address,
        value: Wei,
    ) -> Result<TransactionReceipt, SendError> {
        self.check_reachable()?;
        if self.fail_register.lock().contains(&from) {
            return Err(SendError::Reverted("registration rejected".into()));
        }
        if value < self.fee {
            return Err(SendError::InsufficientFunds {
                required: self.fee,
                available: value,
            });
        }
        Ok(TransactionReceipt::default())
    }

    async fn oracle_indexes(&self, from: Address) -> Result<IndexSet, SendError> {
        self.check_reachable()?;
        self.indexes
            .lock()
            .get(&from)
            .copied()
            .ok_or_else(|| SendError::Reverted("not registered".into()))
    }

    async fn submit_oracle_response(
        &self,
        from: Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<TransactionReceipt, SendError> {
        use std::sync::atomic::Ordering;

        self.check_reachable()?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.fail_submit.lock().get(&from) {
            Some(error) => Err(error.clone()),
            None => {
                self.submissions
                    .lock()
                    .push((from, index, flight.clone(), status));
                Ok(TransactionReceipt::default())
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn subscribe(&self, filter: EventFilter, offset: StartOffset) -> Subscription {
        self.bus.subscribe(filter, offset)
    }
}
