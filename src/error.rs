//! Error types used by the writer, its marker file and its signal bridge.
//!
//! All fallible operations return [`WriterError`]. It provides helper methods
//! (`as_label`, `is_closed`) for logging and for callers that want to treat a
//! closed writer differently from an I/O failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by [`HupWriter`](crate::HupWriter).
///
/// - `Io` and `Marker` wrap failures at the OS boundary.
/// - `Closed` is returned by every operation attempted after close.
/// - `Signals` and `Runtime` can only happen while the writer is being built.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WriterError {
    /// Opening, writing, syncing or closing the output file failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        /// The operation that failed (`open`, `reopen`, `write`, ...).
        op: &'static str,
        /// The output file path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The writer was already closed.
    #[error("writer is closed")]
    Closed,

    /// Writing or removing the process-id marker file failed.
    #[error("failed to {op} marker {}: {source}", path.display())]
    Marker {
        /// The operation that failed (`write` or `remove`).
        op: &'static str,
        /// The marker file path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// Registering OS signal listeners failed.
    #[error("failed to register signal listeners: {0}")]
    Signals(#[source] io::Error),

    /// A notification source was supplied outside of a tokio runtime.
    #[error("signal bridge requires a tokio runtime")]
    Runtime,
}

impl WriterError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        WriterError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn marker(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        WriterError::Marker {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use hupwriter::WriterError;
    ///
    /// assert_eq!(WriterError::Closed.as_label(), "writer_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WriterError::Io { .. } => "writer_io",
            WriterError::Closed => "writer_closed",
            WriterError::Marker { .. } => "writer_marker",
            WriterError::Signals(_) => "writer_signals",
            WriterError::Runtime => "writer_runtime",
        }
    }

    /// Returns `true` if the error reports an already closed writer.
    pub fn is_closed(&self) -> bool {
        matches!(self, WriterError::Closed)
    }
}

impl From<WriterError> for io::Error {
    /// Keeps the OS error kind for `Io` failures so `io::Write` callers can
    /// still match on it; everything else becomes [`io::ErrorKind::Other`].
    fn from(err: WriterError) -> Self {
        match err {
            WriterError::Io { source, .. } => source,
            other => io::Error::other(other),
        }
    }
}
