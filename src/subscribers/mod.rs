//! # Event subscribers for writer events.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and (with the `logging` feature) the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! HupWriter ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                       ┌──────────┼─────────┐
//!                                                       ▼          ▼         ▼
//!                                                   LogWriter   Alerts    Custom
//! ```
//!
//! Subscribers are registered with
//! [`HupWriterBuilder::subscribers`](crate::HupWriterBuilder::subscribers).
//! The listener stops after the writer closes, once every event published up
//! to and including the close has been handed to the set.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
