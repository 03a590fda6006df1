//! Oracle identity and its registration lifecycle.

use surety_types::{Address, IndexSet};

/// Registration lifecycle of one oracle identity.
///
/// ```text
/// Unregistered ──→ Registering ──→ Registered
///                       │
///                       └─────→ RegistrationFailed (terminal)
/// ```
///
/// `RegistrationFailed` is terminal: there is no automatic retry within
/// a process run, and failed identities are excluded from request
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// Created but no registration submitted yet.
    Unregistered,
    /// Registration transaction issued, awaiting confirmation.
    Registering,
    /// Index set received; eligible for request matching.
    Registered,
    /// Registration rejected or errored. Terminal.
    RegistrationFailed,
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unregistered => "unregistered",
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::RegistrationFailed => "registration-failed",
        };
        f.write_str(name)
    }
}

/// One simulated oracle: an account address plus the index set the
/// ledger assigned to it.
#[derive(Debug, Clone)]
pub struct OracleIdentity {
    /// Account address. Immutable once created.
    pub address: Address,
    /// Assigned indexes. `Some` only in the `Registered` state.
    pub index_set: Option<IndexSet>,
    /// Current lifecycle state.
    pub state: RegistrationState,
}

impl OracleIdentity {
    /// Create an identity in the `Unregistered` state.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            index_set: None,
            state: RegistrationState::Unregistered,
        }
    }

    /// Mark the registration transaction as issued.
    pub fn begin_registration(&mut self) {
        debug_assert_eq!(self.state, RegistrationState::Unregistered);
        self.state = RegistrationState::Registering;
    }

    /// Record the confirmed index set. The set is fixed from here on.
    pub fn complete_registration(&mut self, index_set: IndexSet) {
        debug_assert_eq!(self.state, RegistrationState::Registering);
        self.index_set = Some(index_set);
        self.state = RegistrationState::Registered;
    }

    /// Mark the registration as failed. Terminal.
    pub fn fail_registration(&mut self) {
        self.index_set = None;
        self.state = RegistrationState::RegistrationFailed;
    }

    /// Whether this identity is registered and eligible for matching.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state == RegistrationState::Registered
    }

    /// Whether a request index selects this oracle. Always false for
    /// identities that are not `Registered`.
    #[must_use]
    pub fn matches(&self, index: u8) -> bool {
        self.is_registered() && self.index_set.is_some_and(|set| set.contains(index))
    }
}
