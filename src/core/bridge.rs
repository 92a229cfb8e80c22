//! # Signal bridge: notifications in, writer calls out.
//!
//! One task per writer. It owns the [`NotificationSource`] and turns each
//! notification into a synchronous call on the shared writer state.
//!
//! ## Loop
//! ```text
//! loop {
//!   select! (biased) {
//!     token.cancelled()  ─► exit (writer closed)
//!     source.recv()      ─► None            ─► exit
//!                        ─► Some(Rotate)    ─► publish RotateRequested
//!                        │                     reopen()
//!                        │                       ├─ Ok                      ─► continue
//!                        │                       ├─ Err(Closed)             ─► exit
//!                        │                       ├─ Err, writer now closed  ─► escalate(ReopenFailurePolicy)
//!                        │                       └─ Err, writer still open  ─► warn, continue
//!                        └► Some(Terminate) ─► publish TerminateRequested
//!                                              close() (Closed is benign)
//!                                              TerminatePolicy::Exit   ─► process::exit(0)
//!                                              TerminatePolicy::Return ─► exit
//! }
//! drop(source)   // subscription released exactly once
//! ```
//!
//! ## Rules
//! - The source is dropped when the task ends, which always follows close.
//! - A notification racing an explicit close finds the writer closed and does
//!   no I/O: reopen and close both check the state under the writer lock.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::writer::Inner;
use crate::events::{Event, EventKind};
use crate::policies::{ReopenFailurePolicy, TerminatePolicy};
use crate::signals::{Notification, NotificationSource};

/// Spawns the bridge task on `runtime`.
pub(crate) fn spawn(
    runtime: &tokio::runtime::Handle,
    inner: Arc<Inner>,
    source: Box<dyn NotificationSource>,
    token: CancellationToken,
) -> JoinHandle<()> {
    runtime.spawn(run(inner, source, token))
}

async fn run(inner: Arc<Inner>, mut source: Box<dyn NotificationSource>, token: CancellationToken) {
    let name = source.name();
    tracing::debug!(source = name, "signal bridge started");

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            n = source.recv() => n,
        };

        match next {
            None => {
                tracing::debug!(source = name, "notification source ended");
                break;
            }
            Some(Notification::Rotate) => {
                inner.bus.publish(Event::new(EventKind::RotateRequested));
                if !on_rotate(&inner) {
                    break;
                }
            }
            Some(Notification::Terminate) => {
                inner.bus.publish(Event::new(EventKind::TerminateRequested));
                on_terminate(&inner);
                break;
            }
        }
    }

    drop(source);
    tracing::debug!(source = name, "signal bridge stopped");
}

/// Returns `false` when the bridge should stop.
fn on_rotate(inner: &Inner) -> bool {
    let err = match inner.reopen() {
        Ok(()) => return true,
        Err(err) if err.is_closed() => return false,
        Err(err) => err,
    };

    if !inner.is_closed() {
        tracing::warn!(error = %err, "reopen completed with error");
        return true;
    }

    match inner.reopen_failure {
        ReopenFailurePolicy::Exit => {
            tracing::error!(error = %err, "failed to reopen the log file; exiting");
            std::process::exit(1);
        }
        ReopenFailurePolicy::Abort => {
            tracing::error!(error = %err, "failed to reopen the log file; aborting");
            std::process::abort();
        }
        ReopenFailurePolicy::Report => {
            tracing::error!(error = %err, "failed to reopen the log file; writer closed");
            false
        }
    }
}

fn on_terminate(inner: &Inner) {
    match inner.close() {
        Ok(()) => {}
        Err(err) if err.is_closed() => {}
        Err(err) => tracing::warn!(error = %err, "close on terminate failed"),
    }

    if inner.terminate == TerminatePolicy::Exit {
        std::process::exit(0);
    }
}
