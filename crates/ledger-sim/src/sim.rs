//! The simulated ledger.

use async_trait::async_trait;
use ledger_bus::{EventFilter, LedgerBus, LedgerEvent, StartOffset, Subscription};
use oracle_pool::LedgerGateway;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use surety_types::{
    Address, FlightKey, FlightStatus, IndexSet, SendError, TransactionReceipt, Wei,
};
use tracing::{debug, info};

/// 1 ether, as the contract's `REGISTRATION_FEE`.
pub const REGISTRATION_FEE: Wei = 1_000_000_000_000_000_000;

/// Agreeing responses needed to finalize a flight status.
pub const MIN_RESPONSES: usize = 3;

/// One open (or closed) oracle request.
#[derive(Debug, Default)]
struct RequestRecord {
    responses: Vec<(Address, FlightStatus)>,
    closed: bool,
}

#[derive(Default)]
struct SimState {
    oracles: HashMap<Address, IndexSet>,
    requests: HashMap<(u8, FlightKey), RequestRecord>,
    preset_indexes: HashMap<Address, IndexSet>,
    fail_register: HashSet<Address>,
    fail_submit: HashMap<Address, SendError>,
    submit_latency: Option<(Duration, Duration)>,
}

/// In-memory ledger simulating the flight-insurance oracle contract.
pub struct SimLedger {
    bus: LedgerBus,
    rng: Mutex<StdRng>,
    state: Mutex<SimState>,
    operational: AtomicBool,
    reachable: AtomicBool,
    next_tx: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SimLedger {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic index assignment and request indexes.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            bus: LedgerBus::new(),
            rng: Mutex::new(rng),
            state: Mutex::new(SimState::default()),
            operational: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            next_tx: AtomicU64::new(1),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Pin the index set `oracle` will receive on registration,
    /// bypassing the random draw.
    #[must_use]
    pub fn with_indexes(self, oracle: Address, set: IndexSet) -> Self {
        self.state.lock().preset_indexes.insert(oracle, set);
        self
    }

    /// Make `registerOracle` from `oracle` revert.
    #[must_use]
    pub fn failing_registration(self, oracle: Address) -> Self {
        self.state.lock().fail_register.insert(oracle);
        self
    }

    /// Make every submission from `oracle` fail with `error`.
    #[must_use]
    pub fn failing_submission(self, oracle: Address, error: SendError) -> Self {
        self.state.lock().fail_submit.insert(oracle, error);
        self
    }

    /// Delay each submission by a uniform draw from `min..=max`.
    #[must_use]
    pub fn with_submit_latency(self, min: Duration, max: Duration) -> Self {
        self.state.lock().submit_latency = Some((min, max));
        self
    }

    /// Toggle the contract's operational flag.
    pub fn set_operational(&self, operational: bool) {
        self.operational.store(operational, Ordering::SeqCst);
    }

    /// Simulate losing (or regaining) the node connection. While
    /// unreachable every gateway call fails with `NetworkError`.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// The event bus behind this ledger.
    pub fn bus(&self) -> &LedgerBus {
        &self.bus
    }

    /// Dapp-side trigger: open a request for `flight` under a random
    /// index and emit `OracleRequest`. Returns the journal offset.
    pub fn request_flight_status(&self, flight: FlightKey) -> u64 {
        let index = self.rng.lock().gen_range(0..10);
        self.request_with_index(index, flight)
    }

    /// Open a request under a specific `index` and emit `OracleRequest`.
    pub fn request_with_index(&self, index: u8, flight: FlightKey) -> u64 {
        self.state
            .lock()
            .requests
            .entry((index, flight.clone()))
            .or_default();
        info!(index, flight = %flight, "Flight status requested");
        self.bus.publish(LedgerEvent::OracleRequest { index, flight })
    }

    /// Republish the journaled event at `offset`, as a node replaying
    /// its log would. Returns the new offset.
    pub fn redeliver(&self, offset: u64) -> Option<u64> {
        let event = self.bus.event_at(offset)?;
        Some(self.bus.publish(event))
    }

    /// Accepted responses recorded for `flight` across all indexes.
    pub fn responses(&self, flight: &FlightKey) -> Vec<(Address, FlightStatus)> {
        let state = self.state.lock();
        state
            .requests
            .iter()
            .filter(|((_, key), _)| key == flight)
            .flat_map(|(_, record)| record.responses.iter().copied())
            .collect()
    }

    /// High-water mark of simultaneously in-flight submissions.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn ensure_reachable(&self) -> Result<(), SendError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SendError::NetworkError("ledger node unreachable".into()))
        }
    }

    fn receipt(&self) -> TransactionReceipt {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        let mut tx_hash = [0u8; 32];
        tx_hash[24..].copy_from_slice(&n.to_be_bytes());
        TransactionReceipt { tx_hash, block: n }
    }

    fn draw_indexes(&self) -> IndexSet {
        let mut rng = self.rng.lock();
        let mut set = [0u8; 3];
        let mut filled = 0;
        while filled < 3 {
            let candidate = rng.gen_range(0..10u8);
            if !set[..filled].contains(&candidate) {
                set[filled] = candidate;
                filled += 1;
            }
        }
        IndexSet(set)
    }
}

impl Default for SimLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks in-flight submissions and the high-water mark.
struct InFlight<'a> {
    ledger: &'a SimLedger,
}

impl<'a> InFlight<'a> {
    fn enter(ledger: &'a SimLedger) -> Self {
        let now = ledger.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        ledger.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { ledger }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ledger.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerGateway for SimLedger {
    async fn operational(&self) -> Result<bool, SendError> {
        self.ensure_reachable()?;
        Ok(self.operational.load(Ordering::SeqCst))
    }

    async fn registration_fee(&self) -> Result<Wei, SendError> {
        self.ensure_reachable()?;
        Ok(REGISTRATION_FEE)
    }

    async fn register_oracle(
        &self,
        from: Address,
        value: Wei,
    ) -> Result<TransactionReceipt, SendError> {
        self.ensure_reachable()?;
        if !self.operational.load(Ordering::SeqCst) {
            return Err(SendError::Reverted("contract is not operational".into()));
        }
        if value < REGISTRATION_FEE {
            return Err(SendError::InsufficientFunds {
                required: REGISTRATION_FEE,
                available: value,
            });
        }
        if self.state.lock().fail_register.contains(&from) {
            return Err(SendError::Reverted("registration rejected".into()));
        }

        let set = {
            let preset = self.state.lock().preset_indexes.get(&from).copied();
            preset.unwrap_or_else(|| self.draw_indexes())
        };
        self.state.lock().oracles.insert(from, set);
        debug!(indexes = ?set.0, "Oracle registered");
        Ok(self.receipt())
    }

    async fn oracle_indexes(&self, from: Address) -> Result<IndexSet, SendError> {
        self.ensure_reachable()?;
        self.state
            .lock()
            .oracles
            .get(&from)
            .copied()
            .ok_or_else(|| SendError::Reverted("not registered as an oracle".into()))
    }

    async fn submit_oracle_response(
        &self,
        from: Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<TransactionReceipt, SendError> {
        self.ensure_reachable()?;
        let _guard = InFlight::enter(self);

        let latency = {
            let state = self.state.lock();
            state.submit_latency.map(|(min, max)| {
                if max > min {
                    let span = (max - min).as_millis() as u64;
                    min + Duration::from_millis(self.rng.lock().gen_range(0..=span))
                } else {
                    min
                }
            })
        };
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        let finalize = {
            let mut state = self.state.lock();
            if let Some(error) = state.fail_submit.get(&from) {
                return Err(error.clone());
            }
            let Some(set) = state.oracles.get(&from).copied() else {
                return Err(SendError::Reverted("not registered as an oracle".into()));
            };
            if !set.contains(index) {
                return Err(SendError::Reverted(
                    "index does not match oracle request".into(),
                ));
            }
            let Some(record) = state.requests.get_mut(&(index, flight.clone())) else {
                return Err(SendError::Reverted(
                    "flight or timestamp do not match oracle request".into(),
                ));
            };
            if record.closed {
                return Err(SendError::Reverted("oracle request is closed".into()));
            }
            if record.responses.iter().any(|(oracle, _)| *oracle == from) {
                return Err(SendError::Reverted("response already submitted".into()));
            }

            record.responses.push((from, status));
            let agreeing = record
                .responses
                .iter()
                .filter(|(_, s)| *s == status)
                .count();
            if agreeing >= MIN_RESPONSES {
                record.closed = true;
            }
            record.closed
        };

        self.bus.publish(LedgerEvent::OracleReport {
            flight: flight.clone(),
            status,
        });
        if finalize {
            info!(flight = %flight, %status, "Flight status finalized");
            self.bus.publish(LedgerEvent::FlightStatusFinal {
                flight: flight.clone(),
                status,
            });
        }
        Ok(self.receipt())
    }

    fn subscribe(&self, filter: EventFilter, offset: StartOffset) -> Subscription {
        self.bus.subscribe(filter, offset)
    }
}
