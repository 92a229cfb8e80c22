//! Notification sources consumed by the signal bridge.
//!
//! The writer never registers OS signal handlers on its own. Instead a
//! [`NotificationSource`] is injected at construction and owned by the
//! bridge task for the lifetime of the writer, so two writers in one process
//! never silently share or steal a subscription.
//!
//! ## Contents
//! - [`Notification`], [`NotificationSource`] the capability and its events
//! - [`OsSignals`] SIGHUP ⇒ rotate, SIGINT ⇒ terminate (Ctrl-C only on Windows)
//! - [`channel`], [`Notifier`], [`ManualSource`] in-process triggering

mod manual;
mod os;
mod source;

pub use manual::{ManualSource, Notifier, channel};
#[cfg(any(unix, windows))]
pub use os::OsSignals;
pub use source::{Notification, NotificationSource};
