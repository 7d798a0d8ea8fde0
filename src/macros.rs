//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The message is
//! only formatted when the level is enabled, and the macro's call site is
//! reported as the record source.
//!
//! # Examples
//!
//! ```
//! use rust_slog_core::prelude::*;
//! use rust_slog_core::info;
//!
//! let sink = BufferSink::new();
//! let logger = Logger::builder().sink(sink.clone()).build();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(sink.lines().len(), 2);
//! ```

/// Log a formatted message at an arbitrary level.
///
/// # Examples
///
/// ```
/// # use rust_slog_core::prelude::*;
/// # let logger = Logger::builder().sink(BufferSink::new()).build();
/// use rust_slog_core::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level::new(6), "Between warn and error: {}", 6);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a trace-level message with a stack trace attached.
///
/// # Examples
///
/// ```
/// # use rust_slog_core::prelude::*;
/// # let logger = Logger::builder().level(Level::TRACE).sink(BufferSink::new()).build();
/// use rust_slog_core::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.tracef(format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_slog_core::prelude::*;
/// # let logger = Logger::builder().sink(BufferSink::new()).build();
/// use rust_slog_core::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a fatal-level message, then terminate through the logger's exit hook.
///
/// # Examples
///
/// ```
/// # use rust_slog_core::prelude::*;
/// let logger = Logger::builder()
///     .sink(BufferSink::new())
///     .exit_fn(|code| assert_eq!(code, 1))
///     .build();
///
/// use rust_slog_core::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}
