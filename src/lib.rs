//! # Rust Slog Core
//!
//! A structured-logging core: leveled records with typed attributes, encoded
//! as one canonical JSON object per line.
//!
//! ## Features
//!
//! - **Extended Severity Scale**: `trace` through `fatal` on a signed integer
//!   scale, with in-between levels rendered as offsets (`info+2`)
//! - **Shared Runtime Configuration**: a logger family shares one level and
//!   one source-capture flag, both readable without locking
//! - **Cheap Derivation**: named, attribute-bound and grouped child loggers
//! - **Canonical Envelope**: stable field order, optional `source` and
//!   `stacktrace`, and raw JSON/YAML fields expanded in place
//!
//! ## Example
//!
//! ```
//! use rust_slog_core::prelude::*;
//!
//! let sink = BufferSink::new();
//! let logger = Logger::builder().sink(sink.clone()).build();
//!
//! let db = logger.named("db").with([Attr::string("pool", "primary")]);
//! db.warn("slow query", [Attr::duration("elapsed", std::time::Duration::from_millis(1500))]);
//!
//! let line = sink.contents();
//! assert!(line.starts_with(r#"{"level":"warn","logger":"db","msg":"slow query","pool":"primary""#));
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Attr, CallContext, Handler, HandlerMetrics, Level, Logger, LoggerBuilder, LoggerError,
        Options, Record, Result, Sink, Value,
    };
    pub use crate::sinks::{BufferSink, ConsoleSink, WriterSink};
}

pub use crate::core::{
    Attr, BoundContext, CallContext, EnrichmentPolicy, ExitFn, Handler, HandlerMetrics,
    JsonHandler, Level, LevelCell, Logger, LoggerBuilder, LoggerError, NopHandler, Options,
    RawFallback, RawFormat, Record, Result, Sink, SourceFlagCell, TimeFn, Value,
};
pub use crate::global::Registry;
pub use crate::sinks::{BufferSink, ConsoleSink, ConsoleTarget, WriterSink};
