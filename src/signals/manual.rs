//! # In-process notifications.
//!
//! [`channel`] returns a [`Notifier`] / [`ManualSource`] pair backed by an
//! unbounded mpsc queue. Hand the source to the writer builder and keep the
//! notifier to trigger rotations from code, e.g. from an admin endpoint or a
//! test.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hupwriter::{HupWriter, ReopenFailurePolicy, TerminatePolicy, signals};
//!
//! let dir = std::env::temp_dir().join(format!("hupwriter-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir)?;
//!
//! let (notifier, source) = signals::channel();
//! let writer = HupWriter::builder(dir.join("app.log"))
//!     .signals(source)
//!     .reopen_failure(ReopenFailurePolicy::Report)
//!     .terminate(TerminatePolicy::Return)
//!     .open()?;
//!
//! assert!(notifier.rotate());
//! writer.shutdown().await?;
//! # std::fs::remove_dir_all(&dir)?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::source::{Notification, NotificationSource};

/// Creates a connected notifier/source pair.
pub fn channel() -> (Notifier, ManualSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, ManualSource { rx })
}

/// Sending half: cloneable, usable from sync and async code.
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Queues `n`. Returns `false` if the bridge is gone (writer closed).
    pub fn send(&self, n: Notification) -> bool {
        self.tx.send(n).is_ok()
    }

    /// Queues a rotate-request.
    pub fn rotate(&self) -> bool {
        self.send(Notification::Rotate)
    }

    /// Queues a terminate-request.
    pub fn terminate(&self) -> bool {
        self.send(Notification::Terminate)
    }

    /// Returns `true` once the receiving bridge has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, handed to the writer.
///
/// Yields `None` after every [`Notifier`] has been dropped.
#[derive(Debug)]
pub struct ManualSource {
    rx: mpsc::UnboundedReceiver<Notification>,
}

#[async_trait]
impl NotificationSource for ManualSource {
    async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order_then_ends() {
        let (notifier, mut source) = channel();
        assert!(notifier.rotate());
        assert!(notifier.terminate());
        drop(notifier);

        assert_eq!(source.recv().await, Some(Notification::Rotate));
        assert_eq!(source.recv().await, Some(Notification::Terminate));
        assert_eq!(source.recv().await, None);
    }

    #[test]
    fn send_fails_after_source_dropped() {
        let (notifier, source) = channel();
        drop(source);
        assert!(notifier.is_closed());
        assert!(!notifier.rotate());
    }
}
