//! Oracle registry: owns every oracle identity in the pool.
//!
//! The map is mutated only during the `register_all` initialization
//! phase and is read-only on the dispatch hot path, so a single
//! `RwLock` suffices.

use crate::ports::outbound::LedgerGateway;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use surety_types::{Address, IndexSet, SendError, Wei};
use tracing::{debug, warn};

use super::identity::{OracleIdentity, RegistrationState};

#[derive(Default)]
struct RegistryInner {
    /// Address-keyed identity records.
    by_address: HashMap<Address, OracleIdentity>,
    /// Insertion order, so matching results are deterministic.
    order: Vec<Address>,
}

/// The pool's identity store.
///
/// Owned by the supervisor and shared by reference with the dispatcher;
/// no other component mutates it.
#[derive(Default)]
pub struct OracleRegistry {
    inner: RwLock<RegistryInner>,
}

impl OracleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every address with the ledger, paying `fee` each.
    ///
    /// Fan-out: one task per identity, awaited independently, so one
    /// oracle's slow or failing registration never blocks the others.
    /// A failed registration marks that identity `RegistrationFailed`
    /// and is reported in the result map; it does not abort the rest.
    pub async fn register_all(
        self: &Arc<Self>,
        gateway: Arc<dyn LedgerGateway>,
        addresses: &[Address],
        fee: Wei,
    ) -> HashMap<Address, Result<IndexSet, SendError>> {
        {
            let mut inner = self.inner.write();
            for &address in addresses {
                let mut identity = OracleIdentity::new(address);
                identity.begin_registration();
                if inner.by_address.insert(address, identity).is_none() {
                    inner.order.push(address);
                }
            }
        }

        let mut handles = Vec::with_capacity(addresses.len());
        for &address in addresses {
            let gateway = Arc::clone(&gateway);
            handles.push((
                address,
                tokio::spawn(async move {
                    gateway.register_oracle(address, fee).await?;
                    gateway.oracle_indexes(address).await
                }),
            ));
        }

        let mut results = HashMap::with_capacity(handles.len());
        for (address, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(SendError::NetworkError(format!(
                    "registration task failed: {join_err}"
                ))),
            };
            match &outcome {
                Ok(index_set) => {
                    self.record_registered(address, *index_set);
                    debug!(oracle = %hex20(&address), indexes = %index_set, "Oracle registered");
                }
                Err(err) => {
                    self.record_failed(address);
                    warn!(oracle = %hex20(&address), error = %err, "Oracle registration failed");
                }
            }
            results.insert(address, outcome);
        }
        results
    }

    /// Look up one identity by address.
    #[must_use]
    pub fn lookup(&self, address: &Address) -> Option<OracleIdentity> {
        self.inner.read().by_address.get(address).cloned()
    }

    /// Every registered identity whose index set contains
    /// `request_index`, in registration order.
    ///
    /// Identities in `RegistrationFailed` (or any non-registered) state
    /// are never returned. O(pool size) scan; pools are tens of
    /// oracles.
    #[must_use]
    pub fn matching(&self, request_index: u8) -> Vec<OracleIdentity> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|addr| inner.by_address.get(addr))
            .filter(|identity| identity.matches(request_index))
            .cloned()
            .collect()
    }

    /// (registered, failed) identity counts.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.inner.read();
        let mut registered = 0;
        let mut failed = 0;
        for identity in inner.by_address.values() {
            match identity.state {
                RegistrationState::Registered => registered += 1,
                RegistrationState::RegistrationFailed => failed += 1,
                _ => {}
            }
        }
        (registered, failed)
    }

    /// Number of identities in the registry, in any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_address.len()
    }

    /// Whether the registry holds no identities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_address.is_empty()
    }

    fn record_registered(&self, address: Address, index_set: IndexSet) {
        let mut inner = self.inner.write();
        if let Some(identity) = inner.by_address.get_mut(&address) {
            identity.complete_registration(index_set);
        }
    }

    fn record_failed(&self, address: Address) {
        let mut inner = self.inner.write();
        if let Some(identity) = inner.by_address.get_mut(&address) {
            identity.fail_registration();
        }
    }
}

/// Short hex rendering of an address for log fields.
pub(crate) fn hex20(address: &Address) -> String {
    format!("0x{:02x}{:02x}..{:02x}", address[0], address[1], address[19])
}
