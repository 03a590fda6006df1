//! # Ledger Bus - Event Feed for Ledger-Emitted Events
//!
//! An in-memory stand-in for a blockchain node's event subscription API.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │  SimLedger   │      publish()       │ Subscription │
//! │  (emitter)   │ ──────┐              │  (consumer)  │
//! └──────────────┘       ▼              └──────────────┘
//!                  ┌──────────────┐            ↑
//!                  │  LedgerBus   │ ───────────┘
//!                  │ journal+fan  │  subscribe(filter, offset)
//!                  └──────────────┘
//! ```
//!
//! Every published event is appended to a journal and assigned a
//! monotonically increasing offset, then fanned out over a broadcast
//! channel. Subscriptions start from a caller-chosen offset (genesis,
//! "now", or an explicit block offset) and replay the journal before
//! switching to live delivery. A subscriber that falls behind the
//! broadcast buffer refills from the journal instead of losing events,
//! so delivery is at-least-once with no gaps.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::LedgerBus;
pub use subscriber::{EventStream, StartOffset, Subscription};

/// Maximum live events buffered per subscriber before a journal refill
/// is needed.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
