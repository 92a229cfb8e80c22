//! # FileHandle: the single output handle and its state machine.
//!
//! Owns the one open [`File`] of a writer and serializes every access to it
//! behind one [`Mutex`]. `None` inside the mutex is the closed state.
//!
//! ## State machine
//! ```text
//!            reopen (ok)
//!           ┌──────────┐
//!           ▼          │
//! open ──► Open ───────┘
//!           │
//!           ├── close ─────────────► Closed
//!           └── reopen (open fails) ► Closed
//!
//! Closed: write / write_all / flush / reopen / close ──► Err(Closed), no I/O
//! ```
//!
//! ## Rules
//! - Writes, reopen and close all take the same lock; a write's bytes land
//!   entirely in the file that was current when the lock was acquired.
//! - Reopen is close-then-open: the old handle is synced and dropped before
//!   the path is opened again, so two handles are never held at once.
//! - `closed` mirrors the mutex state for a lock-free fast path: a write on a
//!   closed writer fails without waiting on the lock.
//! - Nothing is logged while the lock is held; the writer may be the sink of
//!   the very `tracing` subscriber that records its events.
//! - A poisoned lock is recovered; the guarded value is a plain `Option<File>`
//!   and every transition replaces it whole.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::WriterError;
use crate::events::{Bus, Event, EventKind};

/// A failed [`FileHandle::reopen`].
#[derive(Debug)]
pub(crate) struct ReopenError {
    pub(crate) error: WriterError,
    /// `true` only for the call that moved the handle to closed.
    pub(crate) closed_now: bool,
}

impl ReopenError {
    fn still_open(error: WriterError) -> Self {
        Self {
            error,
            closed_now: false,
        }
    }
}

/// Mutually exclusive owner of the output file.
#[derive(Debug)]
pub(crate) struct FileHandle {
    path: PathBuf,
    mode: u32,
    file: Mutex<Option<File>>,
    closed: AtomicBool,
    bus: Bus,
}

impl FileHandle {
    /// Opens `path` for append (creating it with `mode` if absent).
    pub(crate) fn open(path: PathBuf, mode: u32, bus: Bus) -> Result<Self, WriterError> {
        let file = open_append(&path, mode).map_err(|e| WriterError::io("open", &path, e))?;
        tracing::debug!(path = %path.display(), "output file opened");

        Ok(Self {
            path,
            mode,
            file: Mutex::new(Some(file)),
            closed: AtomicBool::new(false),
            bus,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Appends `buf` with a single `write` call and returns the count written.
    pub(crate) fn write(&self, buf: &[u8]) -> Result<usize, WriterError> {
        let mut guard = self.lock_open()?;
        let file = guard.as_mut().ok_or(WriterError::Closed)?;
        file.write(buf)
            .map_err(|e| WriterError::io("write", &self.path, e))
    }

    /// Appends all of `buf` while holding the lock, so no reopen can split it.
    pub(crate) fn write_all(&self, buf: &[u8]) -> Result<(), WriterError> {
        let mut guard = self.lock_open()?;
        let file = guard.as_mut().ok_or(WriterError::Closed)?;
        file.write_all(buf)
            .map_err(|e| WriterError::io("write", &self.path, e))
    }

    pub(crate) fn flush(&self) -> Result<(), WriterError> {
        let mut guard = self.lock_open()?;
        let file = guard.as_mut().ok_or(WriterError::Closed)?;
        file.flush()
            .map_err(|e| WriterError::io("flush", &self.path, e))
    }

    /// Replaces the current handle with a fresh one at the same path.
    ///
    /// A failed sync of the old handle is reported after the new handle is
    /// installed; the writer stays open. A failed open leaves it closed, and
    /// only that call reports [`ReopenError::closed_now`].
    pub(crate) fn reopen(&self) -> Result<(), ReopenError> {
        let mut guard = self.lock_open().map_err(ReopenError::still_open)?;
        let old = guard
            .take()
            .ok_or_else(|| ReopenError::still_open(WriterError::Closed))?;

        let synced = old.sync_all();
        drop(old);

        let opened = match open_append(&self.path, self.mode) {
            Ok(file) => {
                *guard = Some(file);
                Ok(())
            }
            Err(e) => {
                self.closed.store(true, Ordering::Release);
                Err(WriterError::io("reopen", &self.path, e))
            }
        };
        // The writer may be its own tracing output: no logging under the lock.
        drop(guard);

        match opened {
            Ok(()) => {
                self.bus
                    .publish(Event::new(EventKind::Reopened).with_path(&self.path));
                tracing::debug!(path = %self.path.display(), "output file reopened");
                synced
                    .map_err(|e| ReopenError::still_open(WriterError::io("sync", &self.path, e)))
            }
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::ReopenFailed)
                        .with_path(&self.path)
                        .with_reason(err.to_string()),
                );
                tracing::error!(path = %self.path.display(), error = %err, "reopen failed; writer closed");
                Err(ReopenError {
                    error: err,
                    closed_now: true,
                })
            }
        }
    }

    /// Flushes, syncs and releases the handle. The writer is closed afterwards
    /// even when the final sync fails.
    pub(crate) fn close(&self) -> Result<(), WriterError> {
        let mut guard = self.lock_open()?;
        let mut file = guard.take().ok_or(WriterError::Closed)?;
        self.closed.store(true, Ordering::Release);
        drop(guard);

        let res = file
            .flush()
            .and_then(|()| file.sync_all())
            .map_err(|e| WriterError::io("close", &self.path, e));
        drop(file);

        let mut ev = Event::new(EventKind::Closed).with_path(&self.path);
        if let Err(err) = &res {
            ev = ev.with_reason(err.to_string());
        }
        self.bus.publish(ev);
        res
    }

    /// Takes the lock unless the writer is already known to be closed.
    fn lock_open(&self) -> Result<MutexGuard<'_, Option<File>>, WriterError> {
        if self.is_closed() {
            return Err(WriterError::Closed);
        }
        Ok(self.file.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Opens `path` in append mode, creating it with `mode` on unix.
fn open_append(path: &Path, mode: u32) -> std::io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    opts.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn handle(dir: &tempfile::TempDir, name: &str) -> FileHandle {
        FileHandle::open(dir.path().join(name), 0o660, Bus::new(16)).expect("open")
    }

    #[test]
    fn open_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.log");
        fs::write(&path, "old\n").unwrap();

        let h = FileHandle::open(path.clone(), 0o660, Bus::new(1)).unwrap();
        h.write_all(b"new\n").unwrap();
        h.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn open_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileHandle::open(dir.path().join("nope/x.log"), 0o660, Bus::new(1)).unwrap_err();
        assert_eq!(err.as_label(), "writer_io");
    }

    #[test]
    fn write_returns_count() {
        let dir = tempfile::tempdir().unwrap();
        let h = handle(&dir, "count.log");
        assert_eq!(h.write(b"hello").unwrap(), 5);
    }

    #[test]
    fn reopen_follows_rename() {
        let dir = tempfile::tempdir().unwrap();
        let h = handle(&dir, "r.log");
        h.write_all(b"before\n").unwrap();

        fs::rename(dir.path().join("r.log"), dir.path().join("r.1.log")).unwrap();
        h.write_all(b"still-old\n").unwrap();
        h.reopen().unwrap();
        h.write_all(b"after\n").unwrap();
        h.close().unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("r.1.log")).unwrap(),
            "before\nstill-old\n"
        );
        assert_eq!(fs::read_to_string(dir.path().join("r.log")).unwrap(), "after\n");
    }

    #[test]
    fn failed_reopen_closes() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let h = FileHandle::open(sub.join("x.log"), 0o660, bus).unwrap();

        fs::remove_file(sub.join("x.log")).unwrap();
        fs::remove_dir(&sub).unwrap();

        let err = h.reopen().unwrap_err();
        assert_eq!(err.error.as_label(), "writer_io");
        assert!(err.closed_now);
        assert!(h.is_closed());
        assert!(h.write(b"lost").unwrap_err().is_closed());
        assert_eq!(rx.try_recv().map(|e| e.kind).ok(), Some(EventKind::ReopenFailed));

        // Only the transition itself reports closed_now.
        let again = h.reopen().unwrap_err();
        assert!(again.error.is_closed());
        assert!(!again.closed_now);
    }

    #[test]
    fn closed_rejects_everything() {
        let dir = tempfile::tempdir().unwrap();
        let h = handle(&dir, "c.log");
        h.close().unwrap();

        assert!(h.write(b"x").unwrap_err().is_closed());
        assert!(h.write_all(b"x").unwrap_err().is_closed());
        assert!(h.flush().unwrap_err().is_closed());
        let err = h.reopen().unwrap_err();
        assert!(err.error.is_closed() && !err.closed_now);
        assert!(h.close().unwrap_err().is_closed());
        assert_eq!(fs::metadata(dir.path().join("c.log")).unwrap().len(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn created_with_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.log");
        let h = FileHandle::open(path.clone(), 0o600, Bus::new(1)).unwrap();
        h.close().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !0o600, 0, "mode {mode:o} grants more than 0600");
    }
}
