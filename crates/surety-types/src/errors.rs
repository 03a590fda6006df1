//! Error taxonomy for ledger interaction.

use crate::entities::Wei;
use thiserror::Error;

/// Failure categories for state-changing ledger sends and read calls.
///
/// `Timeout` and `NetworkError` are transient: the operation may have
/// succeeded on the ledger even though no confirmation arrived.
/// `InsufficientFunds` and `Reverted` are definitive rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("insufficient funds: required {required} wei, available {available}")]
    InsufficientFunds { required: Wei, available: Wei },

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("no confirmation after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("network error: {0}")]
    NetworkError(String),
}

impl SendError {
    /// Whether the failure is transient (the send may still have landed).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NetworkError(_))
    }
}
