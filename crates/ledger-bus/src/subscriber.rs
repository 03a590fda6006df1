//! # Subscription Side of the Ledger Bus
//!
//! Replays the journal from the requested offset, then follows live
//! events; falls back to the journal again whenever the live channel
//! lags. Delivery is at-least-once and gap-free.

use crate::events::{EventFilter, LedgerEvent};
use parking_lot::RwLock;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Where a subscription begins reading the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartOffset {
    /// From the first event ever emitted.
    #[default]
    Genesis,
    /// Only events emitted after the subscription is created.
    Now,
    /// From an explicit offset (inclusive).
    At(u64),
}

/// A handle for receiving ledger events in emission order.
///
/// Holds a cursor (`next_offset`) into the journal. `recv` serves
/// journal entries at the cursor first; once caught up it awaits the
/// live channel. A `Lagged` live receive simply loops back to the
/// journal, so a slow consumer re-reads what the channel dropped
/// instead of missing it.
pub struct Subscription {
    receiver: broadcast::Receiver<(u64, LedgerEvent)>,
    journal: Arc<RwLock<Vec<LedgerEvent>>>,
    filter: EventFilter,
    next_offset: u64,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<(u64, LedgerEvent)>,
        journal: Arc<RwLock<Vec<LedgerEvent>>>,
        filter: EventFilter,
        next_offset: u64,
    ) -> Self {
        Self {
            receiver,
            journal,
            filter,
            next_offset,
        }
    }

    /// Receive the next matching event and its offset.
    ///
    /// Returns `None` once the bus is dropped and the journal is fully
    /// consumed.
    pub async fn recv(&mut self) -> Option<(u64, LedgerEvent)> {
        loop {
            // Serve from the journal while the cursor is behind it.
            if let Some(event) = self.journal_next() {
                let offset = self.next_offset;
                self.next_offset += 1;
                if self.filter.matches(&event) {
                    return Some((offset, event));
                }
                continue;
            }

            match self.receiver.recv().await {
                Ok((offset, event)) => {
                    if offset < self.next_offset {
                        // Already replayed from the journal.
                        continue;
                    }
                    self.next_offset = offset + 1;
                    if self.filter.matches(&event) {
                        return Some((offset, event));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged; refilling from journal");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // Bus dropped; anything still unread sits in the journal.
                    if self.journal_len() > self.next_offset {
                        continue;
                    }
                    return None;
                }
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    ///
    /// Returns `Ok(None)` when no matching event is currently available.
    pub fn try_recv(&mut self) -> Result<Option<(u64, LedgerEvent)>, SubscriptionClosed> {
        loop {
            if let Some(event) = self.journal_next() {
                let offset = self.next_offset;
                self.next_offset += 1;
                if self.filter.matches(&event) {
                    return Ok(Some((offset, event)));
                }
                continue;
            }

            match self.receiver.try_recv() {
                Ok((offset, event)) => {
                    if offset < self.next_offset {
                        continue;
                    }
                    self.next_offset = offset + 1;
                    if self.filter.matches(&event) {
                        return Ok(Some((offset, event)));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Closed) => {
                    if self.journal_len() > self.next_offset {
                        continue;
                    }
                    return Err(SubscriptionClosed);
                }
            }
        }
    }

    /// The offset of the next event this subscription will consider.
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    fn journal_next(&self) -> Option<LedgerEvent> {
        self.journal.read().get(self.next_offset as usize).cloned()
    }

    fn journal_len(&self) -> u64 {
        self.journal.read().len() as u64
    }
}

/// The bus was dropped and no journaled events remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ledger bus closed")]
pub struct SubscriptionClosed;

/// Stream adapter over a [`Subscription`] for use with stream
/// combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }
}

impl Stream for EventStream {
    type Item = (u64, LedgerEvent);

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(item)) => Poll::Ready(Some(item)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionClosed) => Poll::Ready(None),
        }
    }
}
