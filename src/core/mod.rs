//! Writer core: file handle, marker, signal bridge and the public facade.
//!
//! The only public API from this module is [`HupWriter`] and its
//! [`HupWriterBuilder`].
//!
//! Internal modules:
//! - [`handle`]: the single output handle and its Open/Closed state machine;
//! - [`marker`]: process-id marker file, with rollback on failed construction;
//! - [`bridge`]: background task turning notifications into reopen/close calls;
//! - [`writer`]: the facade, `io::Write` impls and the close sequence;
//! - [`builder`]: construction order and background task wiring.

mod bridge;
mod builder;
mod handle;
mod marker;
mod writer;

pub use builder::HupWriterBuilder;
pub use writer::HupWriter;
