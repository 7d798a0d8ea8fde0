//! Handler trait: the seam between loggers and record backends
//!
//! A [`Logger`](super::Logger) checks its shared level threshold, builds a
//! [`Record`] and hands it to its handler together with the bound attribute
//! context. [`JsonHandler`](super::JsonHandler) encodes records into the
//! canonical JSON envelope; an adapter onto another logging backend is simply
//! another `Handler` that applies its own [`Handler::enabled`] filter.

use super::call_context::CallContext;
use super::error::Result;
use super::log_context::BoundContext;
use super::log_entry::Record;
use super::log_level::Level;
use super::metrics::HandlerMetrics;
use super::sink::Sink;

pub trait Handler: Send + Sync {
    /// Backend-side filter, consulted after the logger's own threshold
    fn enabled(&self, level: Level) -> bool;

    fn handle(&self, cx: &CallContext, record: Record, bound: &BoundContext) -> Result<()>;

    /// Replace the output sink; handlers without one ignore this
    fn set_sink(&self, _sink: Box<dyn Sink>) {}

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn metrics(&self) -> Option<&HandlerMetrics> {
        None
    }

    fn name(&self) -> &str;
}

/// Handler that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NopHandler;

impl Handler for NopHandler {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn handle(&self, _cx: &CallContext, _record: Record, _bound: &BoundContext) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "nop"
    }
}
