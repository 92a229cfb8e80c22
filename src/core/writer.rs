//! # HupWriter: the public log sink.
//!
//! [`HupWriter`] combines the `FileHandle` state machine, the process-id
//! marker and the signal bridge into one value usable wherever
//! [`std::io::Write`] is expected.
//!
//! ## Ownership
//! ```text
//! HupWriter ──► Arc<Inner> ◄── bridge task (only while running)
//!   │             ├─ FileHandle (Mutex<Option<File>>)
//!   │             ├─ marker path
//!   │             ├─ Bus
//!   │             └─ CancellationToken (cancelled at close)
//!   └─ Tasks: bridge + subscriber listener JoinHandles (awaited by shutdown)
//! ```
//!
//! ## Close sequence
//! ```text
//! close()
//!   ├─► FileHandle::close()   under the lock: flush, sync, drop, publish Closed
//!   ├─► remove marker          publish MarkerRemoved / MarkerRemoveFailed (non-fatal)
//!   └─► token.cancel()         bridge drops its source, listener drains and stops
//! ```
//! A reopen that fails to open the path runs the same sequence after the
//! handle has closed itself.
//!
//! ## Example
//! ```rust
//! use std::io::Write;
//! use hupwriter::{Config, HupWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = std::env::temp_dir().join(format!("hupwriter-writer-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir)?;
//!
//! let writer = HupWriter::open(Config::new(dir.join("app.log")))?;
//! writeln!(&writer, "hello")?;
//! writer.reopen()?;
//! writer.close()?;
//! assert!(writer.close().unwrap_err().is_closed());
//! # std::fs::remove_dir_all(&dir)?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::builder::HupWriterBuilder;
use crate::core::handle::FileHandle;
use crate::core::marker;
use crate::error::WriterError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::{ReopenFailurePolicy, TerminatePolicy};

/// State shared between the facade and the signal bridge.
pub(crate) struct Inner {
    handle: FileHandle,
    marker: Option<PathBuf>,
    pub(crate) bus: Bus,
    token: CancellationToken,
    pub(crate) reopen_failure: ReopenFailurePolicy,
    pub(crate) terminate: TerminatePolicy,
}

impl Inner {
    pub(crate) fn new(
        handle: FileHandle,
        cfg: &Config,
        bus: Bus,
        token: CancellationToken,
    ) -> Self {
        Self {
            handle,
            marker: cfg.marker_path().map(Path::to_path_buf),
            bus,
            token,
            reopen_failure: cfg.reopen_failure,
            terminate: cfg.terminate,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub(crate) fn reopen(&self) -> Result<(), WriterError> {
        self.handle.reopen().map_err(|err| {
            if err.closed_now {
                self.finish_close();
            }
            err.error
        })
    }

    pub(crate) fn close(&self) -> Result<(), WriterError> {
        let res = self.handle.close();
        if matches!(res, Err(WriterError::Closed)) {
            return res;
        }
        self.finish_close();
        tracing::info!(path = %self.handle.path().display(), "writer closed");
        res
    }

    /// Runs once, right after the handle transitioned to closed.
    fn finish_close(&self) {
        if let Some(path) = &self.marker {
            match marker::remove(path) {
                Ok(()) => self
                    .bus
                    .publish(Event::new(EventKind::MarkerRemoved).with_path(path)),
                Err(err) => {
                    tracing::warn!(error = %err, "marker not removed");
                    self.bus.publish(
                        Event::new(EventKind::MarkerRemoveFailed)
                            .with_path(path)
                            .with_reason(err.to_string()),
                    );
                }
            }
        }
        self.token.cancel();
    }
}

/// Background tasks owned by a writer.
#[derive(Default)]
pub(crate) struct Tasks {
    pub(crate) bridge: Option<JoinHandle<()>>,
    pub(crate) listener: Option<JoinHandle<()>>,
}

/// Append-only file writer that follows external log rotation.
///
/// All methods take `&self`; share the writer across threads with an `Arc`.
/// Every operation is serialized by one internal lock, so each call's bytes
/// land entirely in the file that was current when the call got the lock.
///
/// After [`close`](Self::close) every operation fails with
/// [`WriterError::Closed`] without touching the file system. Dropping an
/// open writer closes it.
pub struct HupWriter {
    inner: Arc<Inner>,
    tasks: Mutex<Tasks>,
}

impl HupWriter {
    /// Opens a writer from `cfg` without a signal bridge or subscribers.
    ///
    /// Does not need a tokio runtime.
    pub fn open(cfg: Config) -> Result<Self, WriterError> {
        HupWriterBuilder::from_config(cfg).open()
    }

    /// Starts building a writer for `path`.
    pub fn builder(path: impl Into<PathBuf>) -> HupWriterBuilder {
        HupWriterBuilder::new(path)
    }

    pub(crate) fn from_parts(inner: Arc<Inner>, tasks: Tasks) -> Self {
        Self {
            inner,
            tasks: Mutex::new(tasks),
        }
    }

    /// Appends `buf` and returns the number of bytes written.
    ///
    /// Uses a single `write` call: a short count is returned as is, not retried.
    /// For whole-buffer semantics use `io::Write::write_all`, which holds the
    /// lock until the entire buffer is written.
    pub fn write(&self, buf: &[u8]) -> Result<usize, WriterError> {
        self.inner.handle.write(buf)
    }

    /// Closes the current handle and opens the path again.
    ///
    /// Call this after the file has been renamed away. If the new open fails,
    /// the writer is closed, its marker removed, and the error returned.
    pub fn reopen(&self) -> Result<(), WriterError> {
        self.inner.reopen()
    }

    /// Flushes and releases the handle, removes the marker and stops the
    /// signal bridge.
    ///
    /// A second call returns [`WriterError::Closed`] and does nothing else.
    pub fn close(&self) -> Result<(), WriterError> {
        self.inner.close()
    }

    /// Closes the writer and waits for its background tasks to finish.
    ///
    /// Once this returns, the notification source has been dropped and every
    /// subscriber has processed the close events. An already closed writer is
    /// not an error here.
    pub async fn shutdown(&self) -> Result<(), WriterError> {
        let res = match self.close() {
            Err(WriterError::Closed) => Ok(()),
            other => other,
        };

        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for join in [tasks.bridge, tasks.listener].into_iter().flatten() {
            if let Err(err) = join.await {
                tracing::warn!(error = %err, "writer task ended abnormally");
            }
        }
        res
    }

    /// Returns a receiver for writer events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Returns `true` after close or a failed reopen.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Output file path.
    pub fn path(&self) -> &Path {
        self.inner.handle.path()
    }

    /// Marker file path, if one was configured.
    pub fn marker_path(&self) -> Option<&Path> {
        self.inner.marker.as_deref()
    }
}

impl fmt::Debug for HupWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HupWriter")
            .field("path", &self.path())
            .field("marker", &self.marker_path())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for HupWriter {
    fn drop(&mut self) {
        if self.inner.is_closed() {
            return;
        }
        if let Err(err) = self.inner.close() {
            tracing::warn!(error = %err, "close on drop failed");
        }
    }
}

impl io::Write for &HupWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.handle.write(buf).map_err(io::Error::from)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.handle.write_all(buf).map_err(io::Error::from)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        // Format first so the whole record is appended under one lock.
        if let Some(s) = args.as_str() {
            return self.write_all(s.as_bytes());
        }
        let mut record = String::new();
        fmt::Write::write_fmt(&mut record, args)
            .map_err(|_| io::Error::other("formatter error"))?;
        self.write_all(record.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.handle.flush().map_err(io::Error::from)
    }
}

impl io::Write for HupWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        <&HupWriter as io::Write>::write(&mut &*self, buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        <&HupWriter as io::Write>::write_all(&mut &*self, buf)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        <&HupWriter as io::Write>::write_fmt(&mut &*self, args)
    }

    fn flush(&mut self) -> io::Result<()> {
        <&HupWriter as io::Write>::flush(&mut &*self)
    }
}

#[cfg(feature = "tracing-subscriber")]
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for HupWriter {
    type Writer = &'a HupWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn open(dir: &tempfile::TempDir) -> HupWriter {
        HupWriter::open(Config::new(dir.path().join("w.log"))).unwrap()
    }

    #[test]
    fn write_fmt_is_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let w = open(&dir);
        writeln!(&w, "n={} s={}", 7, "x").unwrap();
        w.close().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("w.log")).unwrap(), "n=7 s=x\n");
    }

    #[test]
    fn io_error_after_close_wraps_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = open(&dir);
        w.close().unwrap();

        let err = w.write_all(b"x").unwrap_err();
        let closed = err
            .get_ref()
            .and_then(|e| e.downcast_ref::<WriterError>())
            .is_some_and(WriterError::is_closed);
        assert!(closed);
        assert!(w.flush().is_err());
    }

    #[test]
    fn drop_closes_and_removes_marker() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("w.pid");
        let w = HupWriter::builder(dir.path().join("w.log"))
            .marker(&marker)
            .open()
            .unwrap();
        assert!(marker.exists());
        drop(w);
        assert!(!marker.exists());
    }

    #[test]
    fn failed_reopen_removes_marker() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("logs");
        fs::create_dir(&sub).unwrap();
        let marker = dir.path().join("w.pid");
        let w = HupWriter::builder(sub.join("w.log"))
            .marker(&marker)
            .open()
            .unwrap();
        let mut rx = w.subscribe();

        fs::remove_dir_all(&sub).unwrap();
        let err = w.reopen().unwrap_err();
        assert_eq!(err.as_label(), "writer_io");
        assert!(w.is_closed());
        assert!(!marker.exists());

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok().map(|e| e.kind)).collect();
        assert_eq!(kinds, vec![EventKind::ReopenFailed, EventKind::MarkerRemoved]);
    }

    #[test]
    fn failing_display_is_an_io_error() {
        struct Broken;
        impl fmt::Display for Broken {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let w = open(&dir);
        let err = write!(&w, "a {}", Broken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);

        writeln!(&w, "still usable").unwrap();
        w.close().unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("w.log")).unwrap(),
            "still usable\n"
        );
    }

    #[test]
    fn reopen_after_close_leaves_marker_alone() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("w.pid");
        let w = HupWriter::builder(dir.path().join("w.log"))
            .marker(&marker)
            .open()
            .unwrap();
        let mut rx = w.subscribe();

        w.close().unwrap();
        fs::write(&marker, "other").unwrap();
        assert!(w.reopen().unwrap_err().is_closed());
        assert_eq!(fs::read_to_string(&marker).unwrap(), "other");

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok().map(|e| e.kind)).collect();
        assert_eq!(kinds, vec![EventKind::Closed, EventKind::MarkerRemoved]);
    }

    #[test]
    fn debug_shows_state() {
        let dir = tempfile::tempdir().unwrap();
        let w = open(&dir);
        let s = format!("{w:?}");
        assert!(s.contains("closed: false"), "{s}");
    }
}
