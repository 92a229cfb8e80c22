//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for reacting to writer events (alerting
//! on a failed reopen, counting rotations, auditing marker cleanup). Each
//! subscriber is driven by a dedicated worker loop fed by a bounded queue
//! owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block `write`, `reopen` or
//!   `close`, nor other subscribers.
//! - Each subscriber declares its queue capacity via
//!   [`Subscribe::queue_capacity`]. On overflow, events for that subscriber
//!   are **dropped** and a `SubscriberOverflow` event is published.
//! - A subscriber must not write through the writer it observes from inside
//!   `on_event` for `Closed`/`ReopenFailed`: the writer is closed by then.
//!
//! ## Example (skeleton)
//! ```rust
//! use hupwriter::{Event, EventKind, Subscribe};
//!
//! struct RotationCounter(std::sync::atomic::AtomicU64);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for RotationCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::Reopened {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "rotation-counter" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        64
    }
}
