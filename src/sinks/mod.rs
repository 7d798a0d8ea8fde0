//! Sink implementations

pub mod buffer;
pub mod console;
pub mod writer;

pub use buffer::BufferSink;
pub use console::{ConsoleSink, ConsoleTarget};
pub use writer::WriterSink;

pub use crate::core::Sink;
