//! Pool error types.
//!
//! Only fatal startup conditions and misuse surface as errors; failures
//! of individual registrations or submissions are recorded per identity
//! or per task and never propagate here.

use crate::domain::status::SupervisorState;
use surety_types::SendError;
use thiserror::Error;

/// Errors returned by the pool supervisor.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The ledger could not be reached at all during startup.
    #[error("ledger unreachable: {0}")]
    LedgerUnreachable(SendError),

    /// The ledger is reachable but reports itself non-operational.
    #[error("ledger reports not operational")]
    NotOperational,

    /// The registration fee could not be fetched during startup.
    #[error("cannot fetch registration fee: {0}")]
    FeeUnavailable(SendError),

    /// `start()` called while the supervisor is not stopped.
    #[error("supervisor is {0}, expected stopped")]
    NotStopped(SupervisorState),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
