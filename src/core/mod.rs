//! Core logger types and traits

pub mod call_context;
pub mod config_cell;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod raw;
pub mod sink;
pub mod stacktrace;

pub use call_context::{CallContext, EnrichmentPolicy};
pub use config_cell::{LevelCell, SourceFlagCell};
pub use encoder::{
    format_source, identity_time, JsonHandler, TimeFn, LEVEL_KEY, LOGGER_KEY, MESSAGE_KEY,
    SOURCE_KEY, STACKTRACE_KEY, TIME_KEY,
};
pub use error::{LoggerError, Result};
pub use handler::{Handler, NopHandler};
pub use log_context::{Attr, BoundContext, Value};
pub use log_entry::Record;
pub use log_level::Level;
pub use logger::{ExitFn, Logger, LoggerBuilder, Options, FATAL_EXIT_CODE};
pub use metrics::HandlerMetrics;
pub use raw::{RawFallback, RawFormat};
pub use sink::Sink;
