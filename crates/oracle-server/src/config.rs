//! Server configuration, overridable from the environment.

use ledger_bus::StartOffset;
use oracle_pool::PoolConfig;
use std::time::Duration;
use tracing::warn;

/// Everything the server needs to run one pool.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub pool: PoolConfig,
}

impl ServerConfig {
    /// Defaults overridden by `SURETY_*` environment variables.
    /// Unparseable values are warned about and ignored.
    pub fn from_env() -> Self {
        let mut pool = PoolConfig::default();

        if let Some(size) = parse_var::<usize>("SURETY_POOL_SIZE") {
            pool.pool_size = size;
        }
        if let Some(limit) = parse_var::<usize>("SURETY_CONCURRENCY") {
            pool.concurrency_limit = limit;
        }
        if let Some(ms) = parse_var::<u64>("SURETY_STOP_GRACE_MS") {
            pool.stop_grace = Duration::from_millis(ms);
        }
        if let Ok(raw) = std::env::var("SURETY_START_OFFSET") {
            match raw.to_ascii_lowercase().as_str() {
                "genesis" => pool.start_offset = StartOffset::Genesis,
                "now" => pool.start_offset = StartOffset::Now,
                other => match other.parse::<u64>() {
                    Ok(offset) => pool.start_offset = StartOffset::At(offset),
                    Err(_) => warn!(
                        value = raw,
                        "SURETY_START_OFFSET must be 'genesis', 'now', or an offset"
                    ),
                },
            }
        }

        Self { pool }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = raw, "Ignoring unparseable value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pool_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.pool.pool_size, PoolConfig::default().pool_size);
        assert_eq!(
            config.pool.concurrency_limit,
            PoolConfig::default().concurrency_limit
        );
    }
}
