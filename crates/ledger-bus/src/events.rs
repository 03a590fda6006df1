//! # Ledger Events
//!
//! The events a FlightSurety ledger emits, as consumed by the oracle
//! pool. Field shapes follow the contract's event signatures.

use serde::{Deserialize, Serialize};
use surety_types::{Address, FlightKey, FlightStatus, Wei};

/// All events that can flow through the ledger bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A passenger (via the dapp) asked for a flight's status. Oracles
    /// whose index set contains `index` are expected to respond.
    OracleRequest {
        /// Request index selecting the responding shard of oracles.
        index: u8,
        /// The flight instance being queried.
        flight: FlightKey,
    },

    /// An individual oracle response was accepted by the ledger.
    OracleReport {
        /// The flight the response applies to.
        flight: FlightKey,
        /// The status that oracle reported.
        status: FlightStatus,
    },

    /// Enough agreeing responses arrived; the flight status is settled
    /// and, for insured delays, payouts become withdrawable.
    FlightStatusFinal {
        /// The settled flight.
        flight: FlightKey,
        /// The consensus status.
        status: FlightStatus,
    },

    /// A passenger withdrew an insurance payout.
    Paid {
        /// The passenger's account.
        passenger: Address,
        /// Remaining credited balance after the withdrawal.
        balance: Wei,
    },
}

impl LedgerEvent {
    /// The topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OracleRequest { .. } => EventTopic::OracleRequest,
            Self::OracleReport { .. } => EventTopic::OracleReport,
            Self::FlightStatusFinal { .. } => EventTopic::FlightStatusFinal,
            Self::Paid { .. } => EventTopic::Paid,
        }
    }
}

/// Topics for subscription filtering, one per event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    OracleRequest,
    OracleReport,
    FlightStatusFinal,
    Paid,
}

/// Filter for event subscriptions.
///
/// An empty topic list matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to receive. Empty = all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Match every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}
