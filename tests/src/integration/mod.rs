//! Integration tests: the oracle pool wired to the simulated ledger.

pub mod concurrency;
pub mod dispatch;
pub mod end_to_end;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod support;
