//! # LogWriter — writer events as `tracing` records
//!
//! A subscriber that forwards every [`Event`] to `tracing`. Routine
//! transitions go to `debug`/`info`; anything that means lost log data or a
//! leftover marker goes to `warn`/`error`.
//!
//! Don't point the `tracing` subscriber that consumes these records at the
//! same `HupWriter` unless you are fine with rotation events appearing in the
//! rotated log itself.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  hupwriter: output opened path=/var/log/app.log
//! DEBUG hupwriter: rotate requested
//! INFO  hupwriter: output reopened path=/var/log/app.log
//! ERROR hupwriter: reopen failed path=/var/log/app.log reason="..."
//! INFO  hupwriter: output closed path=/var/log/app.log
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event-to-`tracing` subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let path = e.path.as_deref().map(|p| p.display().to_string());
        let path = path.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::Opened => tracing::info!(target: "hupwriter", path, "output opened"),
            EventKind::Reopened => tracing::info!(target: "hupwriter", path, "output reopened"),
            EventKind::ReopenFailed => {
                tracing::error!(target: "hupwriter", path, reason, "reopen failed")
            }
            EventKind::Closed if e.reason.is_some() => {
                tracing::warn!(target: "hupwriter", path, reason, "output closed with error")
            }
            EventKind::Closed => tracing::info!(target: "hupwriter", path, "output closed"),
            EventKind::MarkerWritten => tracing::debug!(target: "hupwriter", path, "marker written"),
            EventKind::MarkerRemoved => tracing::debug!(target: "hupwriter", path, "marker removed"),
            EventKind::MarkerRemoveFailed => {
                tracing::warn!(target: "hupwriter", path, reason, "marker not removed")
            }
            EventKind::RotateRequested => tracing::debug!(target: "hupwriter", "rotate requested"),
            EventKind::TerminateRequested => {
                tracing::info!(target: "hupwriter", "terminate requested")
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "hupwriter", subscriber = e.subscriber, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "hupwriter", subscriber = e.subscriber, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
