//! # Inbound Port - OraclePoolApi
//!
//! The observability surface the pool exposes to whatever hosts it
//! (runtime binary, metrics collector, tests).

use crate::domain::PoolStatus;

/// Status query for a running (or stopped) oracle pool.
pub trait OraclePoolApi: Send + Sync {
    /// Current lifecycle state, registration counts, and submission
    /// counters.
    fn status(&self) -> PoolStatus;
}
