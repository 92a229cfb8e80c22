//! # Process-id marker file.
//!
//! External tooling (logrotate's `postrotate`, init scripts) reads this file
//! to find the process to send SIGHUP to. The content is the decimal process
//! id with nothing else, not even a trailing newline.
//!
//! [`PendingMarker`] rolls the file back if construction fails after the
//! marker was written.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WriterError;

/// Creates (or truncates) `path` and writes `pid` into it.
pub(crate) fn write(path: &Path, pid: u32) -> Result<(), WriterError> {
    fs::write(path, pid.to_string()).map_err(|e| WriterError::marker("write", path, e))
}

/// Removes the marker at `path`.
pub(crate) fn remove(path: &Path) -> Result<(), WriterError> {
    fs::remove_file(path).map_err(|e| WriterError::marker("remove", path, e))
}

/// A marker written during construction, removed on drop unless committed.
#[must_use]
pub(crate) struct PendingMarker {
    path: Option<PathBuf>,
}

impl PendingMarker {
    /// Writes the current process id to `path`.
    pub(crate) fn write(path: &Path) -> Result<Self, WriterError> {
        write(path, std::process::id())?;
        tracing::debug!(path = %path.display(), "marker written");
        Ok(Self {
            path: Some(path.to_path_buf()),
        })
    }

    /// Keeps the marker on disk.
    pub(crate) fn commit(mut self) {
        self.path = None;
    }
}

impl Drop for PendingMarker {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(err) = remove(&path) {
                tracing::warn!(error = %err, "failed to roll back marker");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_bare_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.pid");
        write(&path, 4242).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "4242");

        // rewritten, not appended
        write(&path, 7).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "7");
    }

    #[test]
    fn remove_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = remove(&dir.path().join("gone.pid")).unwrap_err();
        assert_eq!(err.as_label(), "writer_marker");
    }

    #[test]
    fn pending_marker_rolls_back_unless_committed() {
        let dir = tempfile::tempdir().unwrap();
        let rolled = dir.path().join("rolled.pid");
        let kept = dir.path().join("kept.pid");

        drop(PendingMarker::write(&rolled).unwrap());
        assert!(!rolled.exists());

        PendingMarker::write(&kept).unwrap().commit();
        assert_eq!(
            fs::read_to_string(&kept).unwrap(),
            std::process::id().to_string()
        );
    }
}
