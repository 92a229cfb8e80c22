//! # What the signal bridge does on a terminate-request.
//!
//! The writer is always closed first (marker removed, handle released).
//! [`TerminatePolicy`] then decides whether the process ends too:
//!
//! ```text
//! TerminatePolicy::Exit    → close, then process::exit(0)   (default)
//! TerminatePolicy::Return  → close, bridge task ends, process keeps running
//! ```
//!
//! `Return` is meant for library use, where the owning program has its own
//! shutdown sequence and only wants the log sink to let go of its files.

/// Action taken after closing the writer on a terminate-request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminatePolicy {
    /// Exit the process with a successful status (default).
    #[default]
    Exit,
    /// Only close the writer and end the bridge task.
    Return,
}
