//! # Oracle Pool - Flight-Status Oracle Coordination
//!
//! Coordinates a pool of simulated oracle identities: bulk registration
//! with the ledger, dispatch of flight-status requests to the oracles
//! whose index sets match, and independent, concurrency-bounded
//! response submission.
//!
//! ## Data Flow
//!
//! ```text
//! Ledger feed ──OracleRequest──→ RequestDispatcher
//!                                      │ matching(index), de-dup
//!                                      ▼
//!                              SubmissionScheduler
//!                                      │ semaphore-bounded tasks
//!                                      ▼
//!                              LedgerGateway.submit_oracle_response
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Failed registrations never match requests | `domain/registry.rs` - `matching()` filters on `Registered` |
//! | At most one submission per (oracle, request) | `domain/dispatch_log.rs` - atomic check-and-insert |
//! | Index sets are fixed once registration succeeds | `domain/identity.rs` - set only by `complete_registration` |
//! | In-flight submissions never exceed the concurrency limit | `service/scheduler.rs` - semaphore permits |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  service/ - dispatcher, scheduler, supervisor               │
//! └─────────────────────────────────────────────────────────────┘
//!                        ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - OraclePoolApi (status query)           │
//! │  ports/outbound.rs - LedgerGateway, FlightStatusSource      │
//! └─────────────────────────────────────────────────────────────┘
//!                        ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────┐
//! │  domain/ - identity, registry, dispatch log, config, status │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors from individual oracle tasks are isolated per task: a
//! rejected or timed-out submission is logged and counted, never
//! propagated to the dispatcher or supervisor.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    DispatchLog, OracleIdentity, OracleRegistry, PoolConfig, PoolError, PoolMetrics, PoolStatus,
    RegistrationState, RequestKey, SupervisorState,
};
pub use ports::inbound::OraclePoolApi;
pub use ports::outbound::{FlightStatusSource, LedgerGateway, RandomFlightStatus};
pub use service::{PoolSupervisor, RequestDispatcher, ResponseSubmission, SubmissionScheduler};
