//! # Event bus for broadcasting writer events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from both synchronous callers (`write`,
//! `reopen`, `close` run on any thread) and the signal bridge task.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Receivers:
//!   HupWriter ops ──┐
//!   Signal bridge ──┼──────► Bus ──┬──► HupWriter::subscribe() receivers
//!   Sub. workers  ──┘ (broadcast)  └──► subscriber listener ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and needs no runtime;
//!   it calls `broadcast::Sender::send`, which is safe while holding the writer lock.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.
//!
//! ## Capacity behavior
//! When the channel reaches capacity and new events are sent:
//! - The ring buffer keeps only the most recent `capacity` events.
//! - Receivers that fell behind observe `RecvError::Lagged(n)` on the next `recv()`,
//!   indicating how many events were skipped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for writer events.
///
/// Each writer owns one bus; clones share the same channel.
/// `publish` clones the event once per live receiver.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every live receiver; dropped silently when there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn publish_without_receivers_is_dropped() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::Opened));

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn receivers_see_events_after_subscribing() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Reopened));
        bus.publish(Event::new(EventKind::Closed));

        assert_eq!(rx.recv().await.map(|e| e.kind).ok(), Some(EventKind::Reopened));
        assert_eq!(rx.recv().await.map(|e| e.kind).ok(), Some(EventKind::Closed));
    }
}
