//! # Lifecycle events emitted by the writer and its signal bridge.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **File events**: the output handle was opened, reopened or closed
//! - **Marker events**: the process-id marker was written or removed
//! - **Bridge events**: an OS notification arrived, or a reopen it triggered failed
//!
//! The [`Event`] struct carries the affected path and an optional reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! File events are published while the writer lock is held, so for one writer
//! their `seq` order matches the order of the transitions themselves.
//!
//! ## Example
//! ```rust
//! use hupwriter::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ReopenFailed)
//!     .with_path("/var/log/app.log")
//!     .with_reason("permission denied");
//!
//! assert_eq!(ev.kind, EventKind::ReopenFailed);
//! assert_eq!(ev.reason.as_deref(), Some("permission denied"));
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of writer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === File events ===
    /// Output file opened at construction.
    ///
    /// Sets:
    /// - `path`: output path
    Opened,

    /// Output file closed and reopened at the same path.
    ///
    /// Sets:
    /// - `path`: output path
    Reopened,

    /// Reopen failed; the writer is now closed.
    ///
    /// Sets:
    /// - `path`: output path
    /// - `reason`: error message
    ReopenFailed,

    /// Writer closed; no further operation succeeds.
    ///
    /// Sets:
    /// - `path`: output path
    /// - `reason`: close error, if the final flush failed
    Closed,

    // === Marker events ===
    /// Marker file written with the current process id.
    ///
    /// Sets:
    /// - `path`: marker path
    MarkerWritten,

    /// Marker file removed at close.
    ///
    /// Sets:
    /// - `path`: marker path
    MarkerRemoved,

    /// Marker file could not be removed at close (non-fatal).
    ///
    /// Sets:
    /// - `path`: marker path
    /// - `reason`: error message
    MarkerRemoveFailed,

    // === Bridge events ===
    /// Rotate-request received by the signal bridge.
    RotateRequested,

    /// Terminate-request received by the signal bridge.
    TerminateRequested,
}

/// Writer event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Output or marker path, if applicable.
    pub path: Option<Arc<Path>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            path: None,
            reason: None,
            subscriber: None,
        }
    }

    /// Attaches a path.
    #[inline]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(Arc::from(path.as_ref()));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Returns `true` if this event reports a full or closed subscriber queue.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Returns `true` if this event reports a panicking subscriber.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
