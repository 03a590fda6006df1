//! # FlightSurety Oracle Pool Test Suite
//!
//! Unified test crate exercising the pool against the simulated ledger.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── dispatch.rs     # Index matching, de-duplication, redelivery
//!     ├── lifecycle.rs    # Start/stop, failure isolation, drain
//!     ├── concurrency.rs  # Submission concurrency bound
//!     └── end_to_end.rs   # Request through finalized flight status
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p surety-tests
//!
//! # By category
//! cargo test -p surety-tests integration::dispatch
//! cargo test -p surety-tests integration::lifecycle
//! ```

pub mod integration;
