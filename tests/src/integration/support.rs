//! Shared fixtures for the integration suite.

use ledger_bus::StartOffset;
use ledger_sim::SimLedger;
use oracle_pool::{FlightStatusSource, PoolConfig, PoolSupervisor};
use std::sync::Arc;
use std::time::Duration;
use surety_types::{Address, FlightKey, FlightStatus, IndexSet};

/// The five-oracle fixture used across the dispatch scenarios.
///
/// | Oracle  | Indexes   |
/// |---------|-----------|
/// | addr(1) | 1, 3, 7   |
/// | addr(2) | 2, 4, 5   |
/// | addr(3) | 3, 6, 9   |
/// | addr(4) | 0, 1, 2   |
/// | addr(5) | 3, 5, 8   |
pub const FIXTURE_SETS: [[u8; 3]; 5] = [[1, 3, 7], [2, 4, 5], [3, 6, 9], [0, 1, 2], [3, 5, 8]];

pub fn addr(n: u8) -> Address {
    [n; 20]
}

pub fn fixture_accounts() -> Vec<Address> {
    (1..=5).map(addr).collect()
}

pub fn flight(timestamp: u64) -> FlightKey {
    FlightKey::new([0xAA; 20], "ND1309", timestamp)
}

/// Simulated ledger pre-seeded with the fixture index sets.
pub fn fixture_ledger() -> SimLedger {
    let mut ledger = SimLedger::with_seed(9);
    for (n, set) in (1u8..=5).zip(FIXTURE_SETS) {
        ledger = ledger.with_indexes(addr(n), IndexSet(set));
    }
    ledger
}

/// Every oracle reports the same status, so finalization is reachable.
pub struct FixedStatus(pub FlightStatus);

impl FlightStatusSource for FixedStatus {
    fn observe(&self, _oracle: &Address, _flight: &FlightKey) -> FlightStatus {
        self.0
    }
}

pub fn pool_config() -> PoolConfig {
    PoolConfig {
        pool_size: 5,
        concurrency_limit: 8,
        start_offset: StartOffset::Genesis,
        stop_grace: Duration::from_secs(2),
    }
}

/// Supervisor over `ledger` with every oracle reporting `status`.
pub fn supervisor_with_status(
    ledger: &Arc<SimLedger>,
    config: PoolConfig,
    status: FlightStatus,
) -> PoolSupervisor {
    let gateway: Arc<dyn oracle_pool::LedgerGateway> = ledger.clone();
    PoolSupervisor::new(config, gateway, Arc::new(FixedStatus(status)))
        .expect("valid test config")
}

/// Poll until `cond` holds or a few seconds pass.
pub async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..300 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// Give in-flight work a moment, then assert nothing more arrived.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}
