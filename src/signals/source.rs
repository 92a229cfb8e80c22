//! # The notification capability.
//!
//! A [`NotificationSource`] is an async stream of [`Notification`]s. The
//! signal bridge polls it from its own task and turns each item into a
//! synchronous call on the writer:
//!
//! ```text
//! source.recv() ──► Some(Rotate)    ──► HupWriter::reopen()
//!               ──► Some(Terminate) ──► HupWriter::close() (+ exit per policy)
//!               ──► None            ──► bridge ends, writer stays open
//! ```

use async_trait::async_trait;

/// An out-of-band request delivered to the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The output file was rotated away; reopen it.
    Rotate,
    /// Close the writer and, depending on policy, end the process.
    Terminate,
}

/// Contract for notification sources.
///
/// Implementations must be cancel-safe: the bridge drops a pending `recv`
/// future when the writer closes.
#[async_trait]
pub trait NotificationSource: Send + 'static {
    /// Waits for the next notification.
    ///
    /// Returns `None` once the source can never deliver again.
    async fn recv(&mut self) -> Option<Notification>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
