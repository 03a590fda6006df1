//! Domain layer: oracle identities, the registry, dispatch
//! de-duplication, configuration, and pool status.

pub mod config;
pub mod dispatch_log;
pub mod error;
pub mod identity;
pub mod registry;
pub mod status;

pub use config::PoolConfig;
pub use dispatch_log::{DispatchLog, RequestKey};
pub use error::PoolError;
pub use identity::{OracleIdentity, RegistrationState};
pub use registry::OracleRegistry;
pub use status::{MetricsSnapshot, PoolMetrics, PoolStatus, SupervisorState};
