//! # Ledger Sim - In-Memory Flight-Insurance Ledger
//!
//! A simulated ledger implementing [`oracle_pool::LedgerGateway`] over
//! an in-process [`ledger_bus::LedgerBus`]. It reproduces the oracle
//! contract's observable rules: a 1-ether registration fee, three
//! distinct indexes per oracle, response validation against the open
//! request, and finalization after three agreeing responses.
//!
//! Failure injection (rejected registrations, per-oracle submit errors,
//! latency, unreachable node) exists so hosts and tests can exercise
//! every pool error path without a real chain.

mod sim;

pub use sim::{SimLedger, MIN_RESPONSES, REGISTRATION_FEE};
