//! # Writer configuration.
//!
//! [`Config`] collects everything [`HupWriter`](crate::HupWriter) needs at
//! construction: the output path, the optional process-id marker, file
//! permissions, escalation policies and the event bus capacity.
//!
//! Config is used in two ways:
//! 1. **Direct**: `HupWriter::open(config)` (no signal bridge)
//! 2. **Builder**: `HupWriter::builder(path)` fills a `Config` field by field
//!
//! ## Sentinel values
//! - `marker = ""` → no marker file is written or removed
//! - `bus_capacity = 0` → clamped to 1

use std::path::{Path, PathBuf};

use crate::policies::{ReopenFailurePolicy, TerminatePolicy};

/// Default permission bits for a newly created output file.
pub const DEFAULT_MODE: u32 = 0o660;

/// Construction-time configuration for a writer.
///
/// ## Field semantics
/// - `path`: output file, opened in append mode and created if absent
/// - `marker`: process-id marker path (empty = none)
/// - `mode`: permission bits for a newly created output file (unix only)
/// - `reopen_failure`: escalation when a SIGHUP-driven reopen fails
/// - `terminate`: whether a terminate-request also exits the process
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Output file path. Immutable for the lifetime of the writer.
    pub path: PathBuf,

    /// Process-id marker path.
    ///
    /// An empty path disables the marker: nothing is created at construction
    /// and nothing is removed at close.
    pub marker: PathBuf,

    /// Permission bits applied when the output file is created.
    ///
    /// Ignored on non-unix platforms and for files that already exist.
    pub mode: u32,

    /// What the signal bridge does when a rotate-triggered reopen fails.
    pub reopen_failure: ReopenFailurePolicy,

    /// What the signal bridge does after closing on a terminate-request.
    pub terminate: TerminatePolicy,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging by more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,
}

impl Config {
    /// Creates a configuration for `path` with every other field at its default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Returns the marker path as an `Option`.
    ///
    /// - `None` → no marker
    /// - `Some(p)` → marker written at `p`
    #[inline]
    pub fn marker_path(&self) -> Option<&Path> {
        if self.marker.as_os_str().is_empty() {
            None
        } else {
            Some(&self.marker)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `path = ""` (must be set before opening)
    /// - `marker = ""` (no marker)
    /// - `mode = 0o660`
    /// - `reopen_failure = ReopenFailurePolicy::Exit`
    /// - `terminate = TerminatePolicy::Exit`
    /// - `bus_capacity = 64`
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            marker: PathBuf::new(),
            mode: DEFAULT_MODE,
            reopen_failure: ReopenFailurePolicy::default(),
            terminate: TerminatePolicy::default(),
            bus_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_marker_means_none() {
        let cfg = Config::new("app.log");
        assert_eq!(cfg.marker_path(), None);

        let cfg = Config {
            marker: PathBuf::from("app.pid"),
            ..Config::new("app.log")
        };
        assert_eq!(cfg.marker_path(), Some(Path::new("app.pid")));
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn defaults_end_the_process() {
        let cfg = Config::default();
        assert_eq!(cfg.mode, 0o660);
        assert!(cfg.reopen_failure.is_fatal());
        assert_eq!(cfg.terminate, TerminatePolicy::Exit);
    }
}
