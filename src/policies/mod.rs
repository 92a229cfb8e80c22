//! Escalation policies for the signal bridge.
//!
//! ## Contents
//! - [`ReopenFailurePolicy`] what happens when a SIGHUP-driven reopen fails
//! - [`TerminatePolicy`]     whether a terminate-request also ends the process
//!
//! ## Defaults
//! Both default to ending the process, which is what a standalone daemon
//! logging through the writer expects. Libraries embedding the writer usually
//! want `ReopenFailurePolicy::Report` and `TerminatePolicy::Return`.

mod reopen;
mod terminate;

pub use reopen::ReopenFailurePolicy;
pub use terminate::TerminatePolicy;
