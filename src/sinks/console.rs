//! Console sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Writes records to the process's stdout or stderr.
///
/// The stream lock is held for the whole record, so lines from other
/// writers in the process cannot land in the middle of it.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl Sink for ConsoleSink {
    fn write_record(&mut self, line: &[u8]) -> Result<()> {
        let written = match self.target {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(line),
            ConsoleTarget::Stderr => io::stderr().lock().write_all(line),
        };
        written.map_err(|e| LoggerError::io_operation("writing record to console", e))
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}
