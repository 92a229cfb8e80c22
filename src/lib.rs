//! # hupwriter
//!
//! **hupwriter** is an append-only log sink that follows external log
//! rotation. Point a logger at a [`HupWriter`], let logrotate (or newsyslog)
//! rename the file and send `SIGHUP`, and the writer reopens the original
//! path without restarting the process, losing a line, or splitting one
//! across files.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   logger thread #1   logger thread #2   logger task #N
//!          │                  │                 │
//!          └──── io::Write ───┼──── write ──────┘
//!                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  HupWriter                                                        │
//! │  - FileHandle   Mutex<Option<File>>: write / reopen / close       │
//! │  - marker       process-id file, written at open, removed at close│
//! │  - Bus          broadcast of writer events                        │
//! └──────▲───────────────────────────────────────────┬────────────────┘
//!        │ reopen() / close()                        │ publish(Event)
//! ┌──────┴────────────────┐                          ▼
//! │  signal bridge task   │               ┌──────────────────────┐
//! │  NotificationSource:  │               │ subscriber listener  │
//! │   OsSignals (SIGHUP,  │               └──────────┬───────────┘
//! │   SIGINT) or Notifier │                          ▼
//! └───────────────────────┘                    SubscriberSet
//!                                        (LogWriter, custom hooks)
//! ```
//!
//! ### Lifecycle
//! ```text
//! open ──► Open ──reopen──► Open ──close──► Closed (terminal)
//!                  │
//!                  └─ reopen fails to open the path ──► Closed
//!
//! SIGHUP  ──► bridge ──► reopen()   failure ─► ReopenFailurePolicy (exit / abort / report)
//! SIGINT  ──► bridge ──► close()    then     ─► TerminatePolicy (exit(0) / return)
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                         |
//! |-------------------|------------------------------------------------------------|--------------------------------------------|
//! | **Writer**        | Rotation-safe append sink, `io::Write` for `&HupWriter`.   | [`HupWriter`], [`HupWriterBuilder`]        |
//! | **Signals**       | Injected notification sources driving reopen/close.        | [`NotificationSource`], [`signals`]        |
//! | **Policies**      | Escalation for failed reopen and terminate-requests.       | [`ReopenFailurePolicy`], [`TerminatePolicy`] |
//! | **Events**        | Lifecycle events and subscriber fan-out.                   | [`Event`], [`Subscribe`]                   |
//! | **Errors**        | Typed errors for I/O, closed writer and marker file.       | [`WriterError`]                            |
//! | **Configuration** | Construction-time settings.                                | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that mirrors events into `tracing`.
//! - `tracing-subscriber`: implements `tracing_subscriber::fmt::MakeWriter` for [`HupWriter`].
//!
//! ## Example
//! ```rust
//! use std::io::Write;
//! use hupwriter::{HupWriter, ReopenFailurePolicy, TerminatePolicy, signals};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = std::env::temp_dir().join(format!("hupwriter-lib-doc-{}", std::process::id()));
//!     std::fs::create_dir_all(&dir)?;
//!
//!     // In a daemon this would be `.os_signals()`; a notifier keeps the example self-contained.
//!     let (notifier, source) = signals::channel();
//!     let writer = HupWriter::builder(dir.join("app.log"))
//!         .marker(dir.join("app.pid"))
//!         .signals(source)
//!         .reopen_failure(ReopenFailurePolicy::Report)
//!         .terminate(TerminatePolicy::Return)
//!         .open()?;
//!
//!     writeln!(&writer, "before rotation")?;
//!     std::fs::rename(dir.join("app.log"), dir.join("app.1.log"))?;
//!     notifier.rotate();
//!
//!     writer.shutdown().await?;
//!     std::fs::remove_dir_all(&dir)?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
pub mod signals;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_MODE};
pub use crate::core::{HupWriter, HupWriterBuilder};
pub use error::WriterError;
pub use events::{Bus, Event, EventKind};
pub use policies::{ReopenFailurePolicy, TerminatePolicy};
pub use signals::{Notification, NotificationSource};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber that logs events through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
