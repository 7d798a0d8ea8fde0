//! In-memory sink for capturing output

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable in-memory sink; all clones share one buffer.
///
/// Hand one clone to the logger and keep another to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written records, one per entry, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Sink for BufferSink {
    fn write_record(&mut self, line: &[u8]) -> Result<()> {
        self.buffer.lock().extend_from_slice(line);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "buffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() -> Result<()> {
        let sink = BufferSink::new();
        let mut writer = sink.clone();

        writer.write_record(b"one\n")?;
        writer.write_record(b"two\n")?;

        assert_eq!(sink.lines(), ["one", "two"]);
        assert_eq!(sink.len(), 8);

        sink.clear();
        assert!(writer.is_empty());
        Ok(())
    }
}
