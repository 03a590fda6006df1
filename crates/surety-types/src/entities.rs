//! # Core Domain Entities
//!
//! Defines the entities shared between the oracle pool, the ledger bus,
//! and the simulated ledger.
//!
//! The status codes and the flight-identity triple mirror the on-chain
//! contract interface: a flight instance is always addressed as
//! (airline, flight, timestamp), and status values are the fixed
//! multiples of ten the contract understands.

use serde::{Deserialize, Serialize};

/// A 20-byte Ethereum-style account address.
pub type Address = [u8; 20];

/// Money scalar in wei.
pub type Wei = u128;

/// Identifies one flight instance being queried.
///
/// This triple is the correlation key for oracle responses: every
/// response the pool submits carries it back to the ledger unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    /// The airline's account address.
    pub airline: Address,
    /// Flight code, e.g. "ND1309".
    pub flight: String,
    /// Scheduled departure as a unix timestamp.
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: Address, flight: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl std::fmt::Display for FlightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} ({:02x}{:02x}..)",
            self.flight, self.timestamp, self.airline[0], self.airline[1]
        )
    }
}

/// Flight status as reported by oracles and settled by the contract.
///
/// The discriminants are the ledger's wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlightStatus {
    /// No information available yet.
    Unknown = 0,
    /// Flight departed on time.
    OnTime = 10,
    /// Delay attributable to the airline (the insured case).
    LateAirline = 20,
    /// Delay due to weather.
    LateWeather = 30,
    /// Delay due to a technical problem.
    LateTechnical = 40,
    /// Delay for any other reason.
    LateOther = 50,
}

impl FlightStatus {
    /// Every status an oracle may report, in wire-code order.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// The ledger wire code for this status.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a ledger wire code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::OnTime => "on-time",
            Self::LateAirline => "late-airline",
            Self::LateWeather => "late-weather",
            Self::LateTechnical => "late-technical",
            Self::LateOther => "late-other",
        };
        write!(f, "{name}({})", self.code())
    }
}

/// The three request indexes the ledger assigns to an oracle at
/// registration. Fixed for the identity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSet(pub [u8; 3]);

impl IndexSet {
    /// Whether a request index selects this oracle.
    #[must_use]
    pub fn contains(&self, index: u8) -> bool {
        self.0.contains(&index)
    }
}

impl std::fmt::Display for IndexSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.0[0], self.0[1], self.0[2])
    }
}

/// Opaque confirmation handle for a state-changing ledger send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionReceipt {
    /// Hash of the accepted transaction.
    pub tx_hash: [u8; 32],
    /// Block the transaction was included in.
    pub block: u64,
}
