//! # What the signal bridge does when a signal-driven reopen fails.
//!
//! A writer that can no longer open its output file loses every line written
//! after that point. [`ReopenFailurePolicy`] decides how loudly that is reported:
//!
//! ```text
//! ReopenFailurePolicy::Exit    → error! log, then process::exit(1)   (default)
//! ReopenFailurePolicy::Abort   → error! log, then process::abort()
//! ReopenFailurePolicy::Report  → publish ReopenFailed, stop the bridge
//! ```
//!
//! With every policy the writer has already moved to the closed state, so
//! later writes fail with [`WriterError::Closed`](crate::WriterError::Closed)
//! instead of being silently dropped.
//!
//! Explicit [`HupWriter::reopen`](crate::HupWriter::reopen) calls are never
//! subject to this policy: their error is returned to the caller.

/// Escalation applied by the signal bridge when a rotate-triggered reopen fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReopenFailurePolicy {
    /// Terminate the process with exit status 1 (default).
    #[default]
    Exit,
    /// Abort the process immediately (no destructors, core dump if enabled).
    Abort,
    /// Publish [`EventKind::ReopenFailed`](crate::EventKind::ReopenFailed) and
    /// stop the bridge, leaving the process running.
    Report,
}

impl ReopenFailurePolicy {
    /// Returns `true` if the policy ends the process.
    #[inline]
    pub fn is_fatal(self) -> bool {
        !matches!(self, ReopenFailurePolicy::Report)
    }
}
