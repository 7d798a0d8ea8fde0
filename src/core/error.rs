//! Error types for the logging core

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Strict level parsing rejected the input
    #[error("unknown level: '{input}'")]
    UnknownLevel { input: String },

    /// Attribute encoding or envelope reparse failed
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// IO error with context
    #[error("IO error while {operation}: {source}")]
    IoOperation {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// Create an unknown level error
    pub fn unknown_level(input: impl Into<String>) -> Self {
        LoggerError::UnknownLevel {
            input: input.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(operation: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            source,
        }
    }
}
