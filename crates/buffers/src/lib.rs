//! Byte buffers for the tinyjson engine.
//!
//! [`Writer`] accumulates encoded JSON text in a buffer that grows on demand,
//! [`Reader`] walks an input slice with an explicit cursor so that every
//! consumer can report the byte offset it stopped at.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;
