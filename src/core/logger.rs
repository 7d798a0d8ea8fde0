//! Main logger implementation

use super::{
    call_context::{CallContext, EnrichmentPolicy},
    config_cell::{LevelCell, SourceFlagCell},
    encoder::{identity_time, JsonHandler, TimeFn, LOGGER_KEY},
    error::Result,
    handler::{Handler, NopHandler},
    log_context::{Attr, BoundContext},
    log_entry::Record,
    log_level::Level,
    metrics::HandlerMetrics,
    sink::Sink,
    stacktrace,
};
use crate::sinks::ConsoleSink;
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Called with the exit code after a fatal record has been written
pub type ExitFn = Arc<dyn Fn(i32) + Send + Sync>;

/// Caller frames dropped from a stack trace once the crate's own frames are
/// gone; direct callers of a `Logger` method keep every frame of their own.
const METHOD_STACK_SKIP: usize = 0;

const METHOD: EnrichmentPolicy = EnrichmentPolicy::CALLER;
const METHOD_WITH_STACK: EnrichmentPolicy = EnrichmentPolicy::with_stack(METHOD_STACK_SKIP);

/// Exit code used by the fatal tier
pub const FATAL_EXIT_CODE: i32 = 1;

/// Construction options for [`Logger::new`]
pub struct Options {
    /// Initial threshold; also decides whether sources are captured
    pub level: Level,
    /// Output sink; stdout when `None`
    pub sink: Option<Box<dyn Sink>>,
    /// Applied to every record timestamp before rendering
    pub time_fn: TimeFn,
    /// Invoked after a fatal record; `std::process::exit` by default
    pub exit_fn: ExitFn,
}

fn exit_process(code: i32) {
    std::process::exit(code)
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            sink: None,
            time_fn: identity_time(),
            exit_fn: Arc::new(exit_process),
        }
    }
}

/// Structured logger handle.
///
/// A logger is an immutable identity (name and bound attributes) attached to
/// mutable configuration shared with every logger derived from it. Cloning
/// or deriving is cheap and never affects the original.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    context: Arc<BoundContext>,
    level: Arc<LevelCell>,
    add_source: Arc<SourceFlagCell>,
    handler: Arc<dyn Handler>,
    exit_fn: ExitFn,
}

impl Logger {
    #[must_use]
    pub fn new(options: Options) -> Self {
        let add_source = Arc::new(SourceFlagCell::default());
        let sink = options
            .sink
            .unwrap_or_else(|| Box::new(ConsoleSink::stdout()));
        let handler = JsonHandler::new(sink, Arc::clone(&add_source), options.time_fn);

        let logger = Self {
            name: Arc::from(""),
            context: Arc::new(BoundContext::new()),
            level: Arc::new(LevelCell::new(options.level)),
            add_source,
            handler: Arc::new(handler),
            exit_fn: options.exit_fn,
        };
        logger.set_level(options.level);
        logger
    }

    /// Logger over a custom handler, e.g. an adapter onto another backend
    #[must_use]
    pub fn from_handler(handler: Arc<dyn Handler>, level: Level) -> Self {
        let logger = Self {
            name: Arc::from(""),
            context: Arc::new(BoundContext::new()),
            level: Arc::new(LevelCell::new(level)),
            add_source: Arc::new(SourceFlagCell::default()),
            handler,
            exit_fn: Options::default().exit_fn,
        };
        logger.set_level(level);
        logger
    }

    /// Logger that discards every record
    #[must_use]
    pub fn nop() -> Self {
        Self::from_handler(Arc::new(NopHandler), Level::INFO)
    }

    /// Set the threshold for the whole logger family.
    ///
    /// Source capture follows the level: it is on exactly when the threshold
    /// is `debug` or more verbose.
    pub fn set_level(&self, level: Level) {
        self.add_source.set(level <= Level::DEBUG);
        self.level.set(level);
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// Whether records currently carry their source location
    pub fn source_enabled(&self) -> bool {
        self.add_source.get()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level) && self.handler.enabled(level)
    }

    /// Dotted hierarchical name; empty for a root logger
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &BoundContext {
        &self.context
    }

    /// Replace the output sink for the whole logger family
    pub fn set_output<S: Sink + 'static>(&self, sink: S) {
        self.handler.set_sink(Box::new(sink));
    }

    pub fn flush(&self) -> Result<()> {
        self.handler.flush()
    }

    pub fn metrics(&self) -> Option<&HandlerMetrics> {
        self.handler.metrics()
    }

    /// Derive a logger named `<name>.<suffix>` (or `suffix` at the root).
    ///
    /// The full name is emitted as the `logger` field of every record.
    #[must_use]
    pub fn named(&self, suffix: &str) -> Logger {
        let name = if self.name.is_empty() {
            suffix.to_owned()
        } else {
            format!("{}.{}", self.name, suffix)
        };
        let context = self
            .context
            .with_root_attr(Attr::string(LOGGER_KEY, name.clone()));
        self.derive(context, Arc::from(name))
    }

    /// Derive a logger with `attrs` bound to every record it emits
    #[must_use]
    pub fn with<I>(&self, attrs: I) -> Logger
    where
        I: IntoIterator<Item = Attr>,
    {
        let context = self.context.with_attrs(attrs);
        self.derive(context, Arc::clone(&self.name))
    }

    /// Derive a logger whose later attributes nest under `name`
    #[must_use]
    pub fn with_group(&self, name: &str) -> Logger {
        let context = self.context.with_group(name);
        self.derive(context, Arc::clone(&self.name))
    }

    fn derive(&self, context: BoundContext, name: Arc<str>) -> Logger {
        Logger {
            name,
            context: Arc::new(context),
            level: Arc::clone(&self.level),
            add_source: Arc::clone(&self.add_source),
            handler: Arc::clone(&self.handler),
            exit_fn: Arc::clone(&self.exit_fn),
        }
    }

    #[track_caller]
    pub fn trace<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD_WITH_STACK, None, Level::TRACE, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD_WITH_STACK, None, Level::TRACE, || args.to_string(), []);
    }

    #[track_caller]
    pub fn trace_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD_WITH_STACK, Some(cx), Level::TRACE, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn debug<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, None, Level::DEBUG, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD, None, Level::DEBUG, || args.to_string(), []);
    }

    #[track_caller]
    pub fn debug_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, Some(cx), Level::DEBUG, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn info<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, None, Level::INFO, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD, None, Level::INFO, || args.to_string(), []);
    }

    #[track_caller]
    pub fn info_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, Some(cx), Level::INFO, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn warn<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, None, Level::WARN, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD, None, Level::WARN, || args.to_string(), []);
    }

    #[track_caller]
    pub fn warn_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, Some(cx), Level::WARN, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn error<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, None, Level::ERROR, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD, None, Level::ERROR, || args.to_string(), []);
    }

    #[track_caller]
    pub fn error_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, Some(cx), Level::ERROR, || msg.into(), attrs);
    }

    /// Log at `fatal`, then terminate through the exit hook with code 1.
    #[track_caller]
    pub fn fatal<I>(&self, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD_WITH_STACK, None, Level::FATAL, || msg.into(), attrs);
        self.terminate();
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.emit(METHOD_WITH_STACK, None, Level::FATAL, || args.to_string(), []);
        self.terminate();
    }

    #[track_caller]
    pub fn fatal_ctx<I>(&self, cx: &CallContext, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD_WITH_STACK, Some(cx), Level::FATAL, || msg.into(), attrs);
        self.terminate();
    }

    /// Log at an arbitrary level. Never captures a stack trace or exits.
    #[track_caller]
    pub fn log<I>(&self, level: Level, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, None, level, || msg.into(), attrs);
    }

    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        self.emit(METHOD, None, level, || args.to_string(), []);
    }

    #[track_caller]
    pub fn log_ctx<I>(&self, cx: &CallContext, level: Level, msg: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.emit(METHOD, Some(cx), level, || msg.into(), attrs);
    }

    /// Hand a prebuilt record to the handler as-is.
    ///
    /// No caller correction happens: the record's own location (if any) is
    /// reported, and only enrichment already present in `cx` applies.
    #[track_caller]
    pub fn handle_record(&self, cx: &CallContext, record: Record) {
        if !self.enabled(record.level) {
            return;
        }
        let cx = self.call_context(EnrichmentPolicy::PASSTHROUGH, Some(cx), Location::caller());
        self.dispatch(&cx, record);
    }

    /// Shared path of every enriched entry point.
    ///
    /// The threshold check comes first so that a disabled call neither builds
    /// the message nor collects the attributes.
    #[track_caller]
    pub(crate) fn emit<F, I>(
        &self,
        policy: EnrichmentPolicy,
        base: Option<&CallContext>,
        level: Level,
        message: F,
        attrs: I,
    ) where
        F: FnOnce() -> String,
        I: IntoIterator<Item = Attr>,
    {
        if !self.enabled(level) {
            return;
        }
        let cx = self.call_context(policy, base, Location::caller());
        let record = Record::new(level, message()).with_attrs(attrs);
        self.dispatch(&cx, record);
    }

    #[inline(never)]
    fn call_context(
        &self,
        policy: EnrichmentPolicy,
        base: Option<&CallContext>,
        caller: &'static Location<'static>,
    ) -> CallContext {
        let mut cx = base.cloned().unwrap_or_default();
        if policy.capture_caller {
            cx = cx.with_caller(caller);
        }
        if policy.capture_stack {
            cx = cx.with_stack_trace(stacktrace::capture(policy.stack_skip));
        }
        cx
    }

    fn dispatch(&self, cx: &CallContext, record: Record) {
        if let Err(e) = self.handler.handle(cx, record, &self.context) {
            eprintln!(
                "[LOGGER ERROR] Handler '{}' dropped a record: {}",
                self.handler.name(),
                e
            );
        }
    }

    pub(crate) fn terminate(&self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        (self.exit_fn)(FATAL_EXIT_CODE);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("source", &self.source_enabled())
            .field("handler", &self.handler.name())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_slog_core::prelude::*;
///
/// let sink = BufferSink::new();
/// let logger = Logger::builder()
///     .level(Level::DEBUG)
///     .sink(sink.clone())
///     .build();
///
/// logger.info("ready", [Attr::int("port", 8080)]);
/// assert!(sink.contents().contains("\"port\":8080"));
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    options: Options,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.options.level = level;
        self
    }

    /// Set the level from a name, falling back to `info` when unrecognized
    #[must_use = "builder methods return a new value"]
    pub fn level_name(mut self, name: &str) -> Self {
        self.options.level = Level::parse_lenient(name);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.options.sink = Some(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_fn<F>(mut self, time_fn: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.options.time_fn = Arc::new(time_fn);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_fn<F>(mut self, exit_fn: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.options.exit_fn = Arc::new(exit_fn);
        self
    }

    pub fn build(self) -> Logger {
        Logger::new(self.options)
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::BufferSink;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn capture(level: Level) -> (Logger, BufferSink) {
        let sink = BufferSink::new();
        let logger = Logger::builder()
            .level(level)
            .sink(sink.clone())
            .time_fn(|_| DateTime::<Utc>::UNIX_EPOCH)
            .build();
        (logger, sink)
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().sink(BufferSink::new()).build();
        assert_eq!(logger.level(), Level::INFO);
        assert!(!logger.source_enabled());
        assert_eq!(logger.name(), "");
    }

    #[test]
    fn test_builder_level_name_is_lenient() {
        let logger = Logger::builder()
            .level_name("DEBUG")
            .sink(BufferSink::new())
            .build();
        assert_eq!(logger.level(), Level::DEBUG);
        assert!(logger.source_enabled());

        let logger = Logger::builder()
            .level_name("chatty")
            .sink(BufferSink::new())
            .build();
        assert_eq!(logger.level(), Level::INFO);
    }

    #[test]
    fn test_set_level_couples_source_flag() {
        let (logger, _) = capture(Level::INFO);

        logger.set_level(Level::DEBUG);
        assert!(logger.source_enabled());

        logger.set_level(Level::TRACE);
        assert!(logger.source_enabled());

        logger.set_level(Level::new(-3));
        assert!(!logger.source_enabled());

        logger.set_level(Level::WARN);
        assert!(!logger.source_enabled());
        assert_eq!(logger.level(), Level::WARN);
    }

    #[test]
    fn test_disabled_levels_write_nothing() {
        let (logger, sink) = capture(Level::WARN);

        logger.debug("d", [Attr::int("n", 1)]);
        logger.info("i", []);
        logger.infof(format_args!("formatted {}", 1));

        assert!(sink.is_empty());

        logger.warn("w", []);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_disabled_call_does_not_build_message() {
        let (logger, _) = capture(Level::ERROR);
        let built = std::cell::Cell::new(false);

        let message = || {
            built.set(true);
            String::new()
        };
        logger.emit(METHOD, None, Level::INFO, message, []);

        assert!(!built.get());
    }

    #[test]
    fn test_derivation_shares_config() {
        let (root, _) = capture(Level::INFO);
        let child = root.named("db").with([Attr::int("shard", 2)]).with_group("q");

        child.set_level(Level::ERROR);
        assert_eq!(root.level(), Level::ERROR);

        root.set_level(Level::DEBUG);
        assert_eq!(child.level(), Level::DEBUG);
        assert!(child.source_enabled());
    }

    #[test]
    fn test_named_chain() {
        let (root, sink) = capture(Level::INFO);
        let c = root.named("a").named("b").named("c");
        assert_eq!(c.name(), "a.b.c");

        c.info("m", []);
        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","logger":"a.b.c","msg":"m","time":"1970-01-01T00:00:00Z"}"#]
        );
    }

    #[test]
    fn test_derivation_does_not_mutate_parent() {
        let (root, sink) = capture(Level::INFO);
        let _left = root.named("left").with([Attr::int("l", 1)]);
        let _right = root.with_group("g").with([Attr::int("r", 2)]);

        root.info("plain", []);
        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","msg":"plain","time":"1970-01-01T00:00:00Z"}"#]
        );
    }

    #[test]
    fn test_with_group_nests_record_attrs() {
        let (root, sink) = capture(Level::INFO);
        root.with([Attr::string("app", "x")])
            .with_group("http")
            .with([Attr::string("method", "GET")])
            .info("req", [Attr::int("status", 200)]);

        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","msg":"req","app":"x","http":{"method":"GET","status":200},"time":"1970-01-01T00:00:00Z"}"#]
        );
    }

    #[test]
    fn test_source_follows_level() {
        let (logger, sink) = capture(Level::DEBUG);

        let line = line!() + 1;
        logger.info("with source", []);
        assert!(sink
            .contents()
            .contains(&format!("\"source\":\"src/core/logger.rs:{}\"", line)));

        sink.clear();
        logger.set_level(Level::INFO);
        logger.info("without source", []);
        assert!(!sink.contents().contains("\"source\""));
    }

    #[inline(never)]
    fn trace_from_helper(logger: &Logger) {
        logger.trace("t", []);
    }

    #[test]
    fn test_trace_attaches_stacktrace() {
        let (logger, sink) = capture(Level::TRACE);
        trace_from_helper(&logger);
        logger.debug("d", []);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        let trace: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let debug: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();

        let stack = trace["stacktrace"].as_str().unwrap();
        let first = stack.lines().next().unwrap();
        assert!(first.contains("trace_from_helper"), "first frame was {}", first);
        assert!(!stack.contains("stacktrace::capture"));
        assert!(debug.get("stacktrace").is_none());
    }

    #[test]
    fn test_fatal_writes_then_exits() {
        let sink = BufferSink::new();
        let exit_code = Arc::new(AtomicI32::new(-1));
        let observed = Arc::clone(&exit_code);
        let observed_sink = sink.clone();

        let logger = Logger::builder()
            .sink(sink.clone())
            .exit_fn(move |code| {
                assert_eq!(observed_sink.lines().len(), 1, "record written before exit");
                observed.store(code, Ordering::SeqCst);
            })
            .build();

        logger.fatal("going down", [Attr::string("reason", "disk")]);

        assert_eq!(exit_code.load(Ordering::SeqCst), FATAL_EXIT_CODE);
        let line: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(line["level"], "fatal");
        assert_eq!(line["reason"], "disk");
        assert!(line.get("stacktrace").is_some());
    }

    #[test]
    fn test_error_does_not_exit() {
        let exited = Arc::new(AtomicI32::new(0));
        let observed = Arc::clone(&exited);
        let logger = Logger::builder()
            .sink(BufferSink::new())
            .exit_fn(move |_| {
                observed.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        logger.error("recoverable", []);
        logger.log(Level::FATAL, "generic path", []);
        assert_eq!(exited.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handle_record_passthrough() {
        let (logger, sink) = capture(Level::DEBUG);
        let record = Record::new(Level::new(2), "raw").with_attrs([Attr::bool("ok", true)]);

        logger.handle_record(&CallContext::background(), record);

        assert_eq!(
            sink.lines(),
            [r#"{"level":"info+2","msg":"raw","ok":true,"time":"1970-01-01T00:00:00Z"}"#]
        );
    }

    #[test]
    fn test_context_variant_keeps_prior_stack() {
        let (logger, sink) = capture(Level::INFO);
        let cx = CallContext::background().with_stack_trace("captured elsewhere");

        logger.warn_ctx(&cx, "w", []);

        let line: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(line["stacktrace"], "captured elsewhere");
    }

    #[test]
    fn test_set_output_swaps_family_sink() {
        let (root, first) = capture(Level::INFO);
        let child = root.named("svc");
        let second = BufferSink::new();

        child.set_output(second.clone());
        root.info("after swap", []);

        assert!(first.is_empty());
        assert_eq!(second.lines().len(), 1);
        assert_eq!(root.metrics().map(HandlerMetrics::written_count), Some(1));
    }

    #[test]
    fn test_nop_logger() {
        let logger = Logger::nop();
        assert!(!logger.enabled(Level::FATAL));
        logger.error("discarded", []);
        assert!(logger.metrics().is_none());
    }
}
