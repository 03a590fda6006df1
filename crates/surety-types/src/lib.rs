//! # Surety Types
//!
//! Shared domain vocabulary for the FlightSurety oracle pool.
//!
//! ## Clusters
//!
//! - **Identity**: [`Address`], [`IndexSet`]
//! - **Flights**: [`FlightKey`], [`FlightStatus`]
//! - **Ledger interaction**: [`TransactionReceipt`], [`SendError`], [`Wei`]
//!
//! Every other crate in the workspace depends on this one; it depends on
//! nothing but serde and thiserror.

pub mod entities;
pub mod errors;

pub use entities::{Address, FlightKey, FlightStatus, IndexSet, TransactionReceipt, Wei};
pub use errors::SendError;
