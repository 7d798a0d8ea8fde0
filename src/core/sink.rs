//! Sink trait for record output destinations

use super::error::Result;

/// Destination for encoded records.
///
/// Each call to [`Sink::write_record`] receives one complete record ending in
/// a newline; implementations must write it in one piece.
pub trait Sink: Send {
    fn write_record(&mut self, line: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
