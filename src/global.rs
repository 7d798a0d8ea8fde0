//! Process-wide default logger
//!
//! Libraries should take a [`Logger`] from their caller. The default registry
//! exists for code that cannot: it holds one swappable logger, and the free
//! functions below log through whatever logger is installed at call time.
//! Tests that need isolation construct their own [`Registry`].

use crate::core::{Attr, CallContext, EnrichmentPolicy, Level, Logger, Sink};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Caller frames dropped from a stack trace once the crate's own frames are
/// gone, the free function included
const GLOBAL_STACK_SKIP: usize = 0;

const GLOBAL: EnrichmentPolicy = EnrichmentPolicy::CALLER;
const GLOBAL_WITH_STACK: EnrichmentPolicy = EnrichmentPolicy::with_stack(GLOBAL_STACK_SKIP);

/// Holder of a current logger that can be swapped at runtime.
///
/// Reads never block, including while another thread installs a new logger.
pub struct Registry {
    current: ArcSwap<Logger>,
}

impl Registry {
    pub fn new(logger: Logger) -> Self {
        Self {
            current: ArcSwap::from_pointee(logger),
        }
    }

    /// The logger installed right now
    pub fn get(&self) -> Arc<Logger> {
        self.current.load_full()
    }

    /// Install `logger`, returning the one it replaces
    pub fn set(&self, logger: Logger) -> Arc<Logger> {
        self.current.swap(Arc::new(logger))
    }

    /// Set the level of the current logger's family
    pub fn set_level(&self, level: Level) {
        self.current.load().set_level(level);
    }

    pub fn level(&self) -> Level {
        self.current.load().level()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Logger::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("current", &**self.current.load())
            .finish()
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, created on first use with a stdout logger at `info`
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::default)
}

/// The current default logger
pub fn default() -> Arc<Logger> {
    registry().get()
}

pub fn set_default(logger: Logger) -> Arc<Logger> {
    registry().set(logger)
}

pub fn set_default_level(level: Level) {
    registry().set_level(level);
}

pub fn default_level() -> Level {
    registry().level()
}

/// Redirect the default logger's family to `sink`
pub fn set_default_output<S: Sink + 'static>(sink: S) {
    registry().get().set_output(sink);
}

#[track_caller]
pub fn trace<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL_WITH_STACK, None, Level::TRACE, || msg.into(), attrs);
}

#[track_caller]
pub fn tracef(args: fmt::Arguments<'_>) {
    default().emit(GLOBAL_WITH_STACK, None, Level::TRACE, || args.to_string(), []);
}

#[track_caller]
pub fn trace_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL_WITH_STACK, Some(cx), Level::TRACE, || msg.into(), attrs);
}

#[track_caller]
pub fn debug<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, None, Level::DEBUG, || msg.into(), attrs);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    default().emit(GLOBAL, None, Level::DEBUG, || args.to_string(), []);
}

#[track_caller]
pub fn debug_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, Some(cx), Level::DEBUG, || msg.into(), attrs);
}

#[track_caller]
pub fn info<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, None, Level::INFO, || msg.into(), attrs);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    default().emit(GLOBAL, None, Level::INFO, || args.to_string(), []);
}

#[track_caller]
pub fn info_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, Some(cx), Level::INFO, || msg.into(), attrs);
}

#[track_caller]
pub fn warn<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, None, Level::WARN, || msg.into(), attrs);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    default().emit(GLOBAL, None, Level::WARN, || args.to_string(), []);
}

#[track_caller]
pub fn warn_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, Some(cx), Level::WARN, || msg.into(), attrs);
}

#[track_caller]
pub fn error<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, None, Level::ERROR, || msg.into(), attrs);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    default().emit(GLOBAL, None, Level::ERROR, || args.to_string(), []);
}

#[track_caller]
pub fn error_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, Some(cx), Level::ERROR, || msg.into(), attrs);
}

/// Log at `fatal` through the default logger, then terminate.
#[track_caller]
pub fn fatal<I>(msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    let logger = default();
    logger.emit(GLOBAL_WITH_STACK, None, Level::FATAL, || msg.into(), attrs);
    logger.terminate();
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    let logger = default();
    logger.emit(GLOBAL_WITH_STACK, None, Level::FATAL, || args.to_string(), []);
    logger.terminate();
}

#[track_caller]
pub fn fatal_ctx<I>(cx: &CallContext, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    let logger = default();
    logger.emit(GLOBAL_WITH_STACK, Some(cx), Level::FATAL, || msg.into(), attrs);
    logger.terminate();
}

#[track_caller]
pub fn log<I>(level: Level, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, None, level, || msg.into(), attrs);
}

#[track_caller]
pub fn logf(level: Level, args: fmt::Arguments<'_>) {
    default().emit(GLOBAL, None, level, || args.to_string(), []);
}

#[track_caller]
pub fn log_ctx<I>(cx: &CallContext, level: Level, msg: impl Into<String>, attrs: I)
where
    I: IntoIterator<Item = Attr>,
{
    default().emit(GLOBAL, Some(cx), level, || msg.into(), attrs);
}
