//! Pool configuration.

use crate::domain::error::PoolError;
use ledger_bus::StartOffset;
use std::time::Duration;

/// Configuration for one oracle pool instance.
///
/// All knobs the coordination core recognizes; everything else about
/// the environment (accounts, ledger endpoint) is passed explicitly to
/// the supervisor.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of oracle identities to register at startup.
    pub pool_size: usize,
    /// Maximum submissions simultaneously in flight.
    pub concurrency_limit: usize,
    /// Where the request-event subscription starts.
    pub start_offset: StartOffset,
    /// How long `stop()` waits for in-flight submissions to drain
    /// before abandoning them.
    pub stop_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            // The original simulation runs 20 oracle accounts.
            pool_size: 20,
            concurrency_limit: 8,
            start_offset: StartOffset::Genesis,
            stop_grace: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.pool_size == 0 {
            return Err(PoolError::InvalidConfig("pool_size must be at least 1"));
        }
        if self.concurrency_limit == 0 {
            return Err(PoolError::InvalidConfig(
                "concurrency_limit must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool_size, 20);
        assert_eq!(config.start_offset, StartOffset::Genesis);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = PoolConfig::default();
        config.pool_size = 0;
        assert!(config.validate().is_err());

        let mut config = PoolConfig::default();
        config.concurrency_limit = 0;
        assert!(config.validate().is_err());
    }
}
