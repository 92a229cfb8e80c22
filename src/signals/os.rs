//! # OS signal notifications.
//!
//! [`OsSignals`] maps process signals onto [`Notification`]s.
//!
//! ## Unix
//! - **SIGHUP** ⇒ [`Notification::Rotate`] (what logrotate's `postrotate` sends)
//! - **SIGINT** ⇒ [`Notification::Terminate`]
//!
//! Both kinds can be replaced with [`OsSignals::with_kinds`], e.g. to
//! rotate on `SIGUSR1` or terminate on `SIGTERM`.
//!
//! tokio keeps a signal handler installed for the life of the process, so
//! dropping the listeners alone would leave the terminate signal swallowed.
//! While an `OsSignals` is alive the terminate signal is delivered to the
//! bridge; once the last one for that signal is dropped (at close), the
//! signal's default action is emulated again and e.g. SIGINT ends the
//! process. A rotate signal arriving after close is ignored.
//!
//! ## Windows
//! Only Ctrl-C is observed, as [`Notification::Terminate`]. There is no
//! rotation signal; use a [`Notifier`](super::Notifier) instead.
//!
//! Listeners must be created inside a tokio runtime.

use async_trait::async_trait;

use super::source::{Notification, NotificationSource};
use crate::error::WriterError;

/// Signal listeners owned by one writer's bridge.
#[cfg(unix)]
#[derive(Debug)]
pub struct OsSignals {
    rotate: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    _fallback: fallback::Guard,
}

#[cfg(unix)]
impl OsSignals {
    /// Registers SIGHUP (rotate) and SIGINT (terminate) listeners.
    pub fn new() -> Result<Self, WriterError> {
        use signal_hook::consts::{SIGHUP, SIGINT};

        Self::with_kinds(SIGHUP, SIGINT)
    }

    /// Registers listeners for custom rotate and terminate signals, given as
    /// raw numbers (see `signal_hook::consts`).
    pub fn with_kinds(
        rotate: std::ffi::c_int,
        terminate: std::ffi::c_int,
    ) -> Result<Self, WriterError> {
        use tokio::signal::unix::{SignalKind, signal};

        let fallback = fallback::Guard::acquire(terminate).map_err(WriterError::Signals)?;
        Ok(Self {
            rotate: signal(SignalKind::from_raw(rotate)).map_err(WriterError::Signals)?,
            terminate: signal(SignalKind::from_raw(terminate)).map_err(WriterError::Signals)?,
            _fallback: fallback,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl NotificationSource for OsSignals {
    async fn recv(&mut self) -> Option<Notification> {
        tokio::select! {
            got = self.rotate.recv()    => got.map(|()| Notification::Rotate),
            got = self.terminate.recv() => got.map(|()| Notification::Terminate),
        }
    }

    fn name(&self) -> &'static str {
        "os-signals"
    }
}

/// Default-action fallback for terminate signals nobody listens to anymore.
///
/// One conditional-default action is registered per signal number for the
/// life of the process; it fires only while no [`Guard`] for that signal is
/// alive.
#[cfg(unix)]
mod fallback {
    use std::ffi::c_int;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    struct Entry {
        signal: c_int,
        released: Arc<AtomicBool>,
        live: usize,
    }

    static ENTRIES: Mutex<Vec<Entry>> = Mutex::new(Vec::new());

    #[derive(Debug)]
    pub(super) struct Guard {
        signal: c_int,
    }

    impl Guard {
        pub(super) fn acquire(signal: c_int) -> io::Result<Self> {
            let mut entries = ENTRIES.lock().unwrap_or_else(PoisonError::into_inner);
            match entries.iter_mut().find(|e| e.signal == signal) {
                Some(entry) => {
                    entry.live += 1;
                    entry.released.store(false, Ordering::SeqCst);
                }
                None => {
                    let released = Arc::new(AtomicBool::new(false));
                    signal_hook::flag::register_conditional_default(
                        signal,
                        Arc::clone(&released),
                    )?;
                    entries.push(Entry {
                        signal,
                        released,
                        live: 1,
                    });
                }
            }
            Ok(Self { signal })
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            let mut entries = ENTRIES.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.iter_mut().find(|e| e.signal == self.signal) {
                entry.live = entry.live.saturating_sub(1);
                if entry.live == 0 {
                    entry.released.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    #[cfg(test)]
    pub(super) fn is_released(signal: c_int) -> Option<bool> {
        let entries = ENTRIES.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|e| e.signal == signal)
            .map(|e| e.released.load(Ordering::SeqCst))
    }
}

/// Signal listeners owned by one writer's bridge.
#[cfg(windows)]
#[derive(Debug)]
pub struct OsSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl OsSignals {
    /// Registers a Ctrl-C (terminate) listener.
    pub fn new() -> Result<Self, WriterError> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c().map_err(WriterError::Signals)?,
        })
    }
}

#[cfg(windows)]
#[async_trait]
impl NotificationSource for OsSignals {
    async fn recv(&mut self) -> Option<Notification> {
        self.ctrl_c.recv().await.map(|()| Notification::Terminate)
    }

    fn name(&self) -> &'static str {
        "os-signals"
    }
}
