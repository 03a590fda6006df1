//! # Publishing Side of the Ledger Bus
//!
//! Appends events to the journal and fans them out to live subscribers.

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::{StartOffset, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// In-memory ledger event feed with a replayable journal.
///
/// The journal keeps every published event for the lifetime of the bus,
/// which is acceptable for a simulation run (tens of oracles, bounded
/// request volume). Offsets are journal positions and double as the
/// "block offset" of the external subscription interface.
pub struct LedgerBus {
    /// Ordered log of every event ever published.
    journal: Arc<RwLock<Vec<LedgerEvent>>>,
    /// Live fan-out channel carrying (offset, event) pairs.
    sender: broadcast::Sender<(u64, LedgerEvent)>,
}

impl LedgerBus {
    /// Create a bus with the default live-channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific live-channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            journal: Arc::new(RwLock::new(Vec::new())),
            sender,
        }
    }

    /// Publish an event, returning its assigned offset.
    ///
    /// The journal append and offset assignment happen under one write
    /// lock so offsets are dense and ordered; the live send may find no
    /// receivers, which is fine because the journal retains the event
    /// for later subscribers.
    pub fn publish(&self, event: LedgerEvent) -> u64 {
        let offset = {
            let mut journal = self.journal.write();
            journal.push(event.clone());
            (journal.len() - 1) as u64
        };

        match self.sender.send((offset, event)) {
            Ok(receivers) => {
                trace!(offset, receivers, "Ledger event published");
            }
            Err(_) => {
                debug!(offset, "Ledger event journaled with no live receivers");
            }
        }
        offset
    }

    /// Subscribe to events matching `filter`, starting from `offset`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter, offset: StartOffset) -> Subscription {
        let next_offset = match offset {
            StartOffset::Genesis => 0,
            StartOffset::Now => self.journal.read().len() as u64,
            StartOffset::At(n) => n,
        };
        Subscription::new(
            self.sender.subscribe(),
            Arc::clone(&self.journal),
            filter,
            next_offset,
        )
    }

    /// The offset the next published event will receive.
    #[must_use]
    pub fn head_offset(&self) -> u64 {
        self.journal.read().len() as u64
    }

    /// A copy of the journaled event at `offset`, if any.
    #[must_use]
    pub fn event_at(&self, offset: u64) -> Option<LedgerEvent> {
        self.journal.read().get(offset as usize).cloned()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LedgerBus {
    fn default() -> Self {
        Self::new()
    }
}
