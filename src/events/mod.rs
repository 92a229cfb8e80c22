//! Writer events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the writer, its signal bridge and
//! the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `HupWriter` (open/reopen/close, marker), the signal bridge
//!   (rotate/terminate requests, reopen failures), `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: `HupWriter::subscribe()` receivers and the subscriber
//!   listener that fans out to a `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
