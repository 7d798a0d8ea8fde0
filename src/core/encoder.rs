//! Record encoder producing the canonical JSON envelope
//!
//! Every record becomes one line:
//!
//! ```text
//! {"level":..,["logger":..,]"msg":..,["source":..,]<attributes>,["stacktrace":..,]"time":..}
//! ```
//!
//! Attributes are first encoded into a scratch buffer, parsed back into an
//! ordered mapping and then reshaped: structural keys move to the head or
//! foot, raw fields are expanded, and the line is assembled field by field.

use super::call_context::CallContext;
use super::config_cell::SourceFlagCell;
use super::error::Result;
use super::handler::Handler;
use super::log_context::BoundContext;
use super::log_entry::Record;
use super::log_level::Level;
use super::metrics::HandlerMetrics;
use super::raw::{self, RawFallback};
use super::sink::Sink;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

pub const LEVEL_KEY: &str = "level";
pub const LOGGER_KEY: &str = "logger";
pub const MESSAGE_KEY: &str = "msg";
pub const SOURCE_KEY: &str = "source";
pub const STACKTRACE_KEY: &str = "stacktrace";
pub const TIME_KEY: &str = "time";

/// Normalizes record timestamps before they are rendered
pub type TimeFn = Arc<dyn Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync>;

/// Identity time normalization
pub fn identity_time() -> TimeFn {
    Arc::new(|t| t)
}

struct EncoderState {
    scratch: Vec<u8>,
    sink: Box<dyn Sink>,
}

/// Handler writing one canonical JSON object per record.
///
/// The scratch buffer and the sink sit behind one mutex, so at most one
/// record is encoded and written at a time per handler.
pub struct JsonHandler {
    state: Mutex<EncoderState>,
    add_source: Arc<SourceFlagCell>,
    time_fn: TimeFn,
    metrics: HandlerMetrics,
}

impl JsonHandler {
    pub fn new(sink: Box<dyn Sink>, add_source: Arc<SourceFlagCell>, time_fn: TimeFn) -> Self {
        Self {
            state: Mutex::new(EncoderState {
                scratch: Vec::with_capacity(512),
                sink,
            }),
            add_source,
            time_fn,
            metrics: HandlerMetrics::new(),
        }
    }

    fn encode(
        &self,
        state: &mut EncoderState,
        cx: &CallContext,
        record: &Record,
        bound: &BoundContext,
        source: Option<String>,
    ) -> Result<()> {
        let EncoderState { scratch, sink } = state;

        bound.write_json(&record.attrs, &mut *scratch)?;
        let fields: Map<String, JsonValue> = serde_json::from_slice(scratch.as_slice())?;

        let line = self.assemble(cx, record, fields, source)?;
        sink.write_record(&line)
    }

    fn assemble(
        &self,
        cx: &CallContext,
        record: &Record,
        fields: Map<String, JsonValue>,
        source: Option<String>,
    ) -> serde_json::Result<Vec<u8>> {
        // Raw names are resolved first so they obey the same key policy as
        // every other attribute: a repeated key keeps its first position and
        // takes the last value.
        let mut fields: Map<String, JsonValue> =
            fields.into_iter().map(|(k, v)| reshape(k, v)).collect();

        // Synthesized from the record, never taken from attributes.
        for key in [LEVEL_KEY, MESSAGE_KEY, TIME_KEY] {
            fields.shift_remove(key);
        }

        let logger = fields.shift_remove(LOGGER_KEY);
        let user_source = fields.shift_remove(SOURCE_KEY);
        let source = source.map(JsonValue::String).or(user_source);
        let user_trace = fields.shift_remove(STACKTRACE_KEY);
        let stacktrace = cx
            .stack_trace()
            .map(|trace| JsonValue::String(trace.to_owned()))
            .or(user_trace);
        let time = (self.time_fn)(record.time).to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut envelope = Envelope::with_capacity(256);

        envelope.field(LEVEL_KEY, &record.level.to_string())?;
        if let Some(logger) = &logger {
            envelope.field(LOGGER_KEY, logger)?;
        }
        envelope.field(MESSAGE_KEY, &record.message)?;
        if let Some(source) = &source {
            envelope.field(SOURCE_KEY, source)?;
        }

        for (key, value) in &fields {
            envelope.field(key, value)?;
        }

        if let Some(trace) = &stacktrace {
            envelope.field(STACKTRACE_KEY, trace)?;
        }
        envelope.field(TIME_KEY, &time)?;

        Ok(envelope.finish())
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn handle(&self, cx: &CallContext, mut record: Record, bound: &BoundContext) -> Result<()> {
        if let Some(caller) = cx.caller() {
            record.location = Some(caller);
        }
        let source = if self.add_source.get() {
            record.location.map(format_source)
        } else {
            None
        };

        let result = {
            let mut state = self.state.lock();
            let result = self.encode(&mut state, cx, &record, bound, source);
            state.scratch.clear();
            result
        };

        match result {
            Ok(()) => self.metrics.record_written(),
            Err(_) => self.metrics.record_dropped(),
        };
        result
    }

    fn set_sink(&self, sink: Box<dyn Sink>) {
        self.state.lock().sink = sink;
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().sink.flush()
    }

    fn metrics(&self) -> Option<&HandlerMetrics> {
        Some(&self.metrics)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Field-by-field JSON object writer
struct Envelope {
    out: Vec<u8>,
}

impl Envelope {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> serde_json::Result<()> {
        self.out.push(if self.out.is_empty() { b'{' } else { b',' });
        serde_json::to_writer(&mut self.out, key)?;
        self.out.push(b':');
        serde_json::to_writer(&mut self.out, value)
    }

    fn finish(mut self) -> Vec<u8> {
        if self.out.is_empty() {
            self.out.push(b'{');
        }
        self.out.extend_from_slice(b"}\n");
        self.out
    }
}

/// Strip raw-field key prefixes and expand their documents, inside groups too.
fn reshape(key: String, value: JsonValue) -> (String, JsonValue) {
    if let Some((format, name)) = raw::split_key(&key) {
        let name = name.to_owned();
        return (name, raw::expand(format, value, RawFallback::LiteralString));
    }

    match value {
        JsonValue::Object(map) => {
            let nested = map.into_iter().map(|(k, v)| reshape(k, v)).collect();
            (key, JsonValue::Object(nested))
        }
        other => (key, other),
    }
}

/// `<file>:<line>`; absolute paths are shortened to `<parent>/<file>`.
pub fn format_source(location: &Location<'_>) -> String {
    let path = Path::new(location.file());
    if !path.is_absolute() {
        return format!("{}:{}", location.file(), location.line());
    }

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    match path.parent().and_then(Path::file_name) {
        Some(parent) => format!("{}/{}:{}", parent.to_string_lossy(), file, location.line()),
        None => format!("{}:{}", file, location.line()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::Attr;
    use crate::sinks::BufferSink;

    fn frozen() -> TimeFn {
        Arc::new(|_| {
            DateTime::parse_from_rfc3339("2006-01-02T15:04:05Z")
                .unwrap()
                .with_timezone(&Utc)
        })
    }

    fn handler(add_source: bool) -> (JsonHandler, BufferSink) {
        let sink = BufferSink::new();
        let flag = Arc::new(SourceFlagCell::new(add_source));
        (JsonHandler::new(Box::new(sink.clone()), flag, frozen()), sink)
    }

    #[test]
    fn test_minimal_envelope() {
        let (handler, sink) = handler(false);
        handler
            .handle(
                &CallContext::background(),
                Record::new(Level::INFO, "m"),
                &BoundContext::new(),
            )
            .unwrap();

        assert_eq!(
            sink.contents(),
            "{\"level\":\"info\",\"msg\":\"m\",\"time\":\"2006-01-02T15:04:05Z\"}\n"
        );
    }

    #[test]
    fn test_structural_fields_move_out_of_body() {
        let (handler, sink) = handler(false);
        let bound = BoundContext::new()
            .with_attrs([Attr::string("service", "api")])
            .with_root_attr(Attr::string(LOGGER_KEY, "db.pool"));
        let record = Record::new(Level::WARN, "slow")
            .with_attrs([Attr::string(SOURCE_KEY, "manual"), Attr::int("ms", 900)]);

        handler
            .handle(
                &CallContext::background().with_stack_trace("a\nb"),
                record,
                &bound,
            )
            .unwrap();

        assert_eq!(
            sink.lines(),
            [r#"{"level":"warn","logger":"db.pool","msg":"slow","source":"manual","service":"api","ms":900,"stacktrace":"a\nb","time":"2006-01-02T15:04:05Z"}"#]
        );
    }

    #[test]
    fn test_reserved_attribute_names_are_suppressed() {
        let (handler, sink) = handler(false);
        let record = Record::new(Level::ERROR, "boom").with_attrs([
            Attr::string(LEVEL_KEY, "fake"),
            Attr::string(MESSAGE_KEY, "fake"),
            Attr::string(TIME_KEY, "fake"),
        ]);

        handler
            .handle(&CallContext::background(), record, &BoundContext::new())
            .unwrap();

        assert_eq!(
            sink.lines(),
            [r#"{"level":"error","msg":"boom","time":"2006-01-02T15:04:05Z"}"#]
        );
    }

    #[test]
    fn test_caller_correction_sets_source() {
        let (handler, sink) = handler(true);
        let here = Location::caller();
        let cx = CallContext::background().with_caller(here);

        handler
            .handle(&cx, Record::new(Level::DEBUG, "x"), &BoundContext::new())
            .unwrap();

        let line: JsonValue = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(line[SOURCE_KEY], JsonValue::String(format_source(here)));
    }

    #[test]
    fn test_source_suppressed_when_flag_off() {
        let (handler, sink) = handler(false);
        let cx = CallContext::background().with_caller(Location::caller());

        handler
            .handle(&cx, Record::new(Level::DEBUG, "x"), &BoundContext::new())
            .unwrap();

        assert!(!sink.contents().contains("\"source\""));
    }

    #[test]
    fn test_passthrough_keeps_record_location() {
        let (handler, sink) = handler(true);
        let here = Location::caller();

        handler
            .handle(
                &CallContext::background(),
                Record::new(Level::INFO, "x").with_location(here),
                &BoundContext::new(),
            )
            .unwrap();

        assert!(sink.contents().contains(&format_source(here)));
    }

    #[test]
    fn test_raw_fields_expand_in_body_and_groups() {
        let (handler, sink) = handler(false);
        let bound = BoundContext::new().with_group("req");
        let record = Record::new(Level::INFO, "m").with_attrs([
            Attr::raw_json("doc", r#"{"x":1}"#),
            Attr::raw_json("bad", "{oops"),
            Attr::string("raw;xml;other", "<a/>"),
        ]);

        handler
            .handle(&CallContext::background(), record, &bound)
            .unwrap();

        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","msg":"m","req":{"doc":{"x":1},"bad":"{oops","raw;xml;other":"<a/>"},"time":"2006-01-02T15:04:05Z"}"#]
        );
    }

    #[test]
    fn test_raw_names_never_duplicate_keys() {
        let (handler, sink) = handler(false);
        let bound = BoundContext::new().with_root_attr(Attr::string(LOGGER_KEY, "svc"));
        let record = Record::new(Level::INFO, "m").with_attrs([
            Attr::string("doc", "a"),
            Attr::raw_json("doc", r#"{"x":1}"#),
            Attr::raw_json(LEVEL_KEY, r#"{"x":1}"#),
            Attr::raw_json(MESSAGE_KEY, r#"{"x":1}"#),
            Attr::raw_json(TIME_KEY, r#"{"x":1}"#),
            Attr::raw_json(STACKTRACE_KEY, r#"{"frames":[]}"#),
        ]);

        handler
            .handle(&CallContext::background(), record, &bound)
            .unwrap();

        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","logger":"svc","msg":"m","doc":{"x":1},"stacktrace":{"frames":[]},"time":"2006-01-02T15:04:05Z"}"#]
        );
    }

    #[test]
    fn test_raw_name_collision_inside_group() {
        let (handler, sink) = handler(false);
        let bound = BoundContext::new().with_group("req");
        let record = Record::new(Level::INFO, "m").with_attrs([
            Attr::raw_json("body", r#"{"id":1}"#),
            Attr::int("n", 2),
            Attr::string("body", "plain"),
        ]);

        handler
            .handle(&CallContext::background(), record, &bound)
            .unwrap();

        assert_eq!(
            sink.lines(),
            [r#"{"level":"info","msg":"m","req":{"body":"plain","n":2},"time":"2006-01-02T15:04:05Z"}"#]
        );
    }

    #[test]
    fn test_message_is_escaped() {
        let (handler, sink) = handler(false);
        handler
            .handle(
                &CallContext::background(),
                Record::new(Level::INFO, "line1\n\"quoted\""),
                &BoundContext::new(),
            )
            .unwrap();

        assert_eq!(sink.lines().len(), 1);
        let line: JsonValue = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(line[MESSAGE_KEY], "line1\n\"quoted\"");
    }

    #[test]
    fn test_metrics_and_sink_swap() {
        let (handler, first) = handler(false);
        let second = BufferSink::new();

        handler
            .handle(&CallContext::background(), Record::new(Level::INFO, "a"), &BoundContext::new())
            .unwrap();
        handler.set_sink(Box::new(second.clone()));
        handler
            .handle(&CallContext::background(), Record::new(Level::INFO, "b"), &BoundContext::new())
            .unwrap();

        assert_eq!(first.lines().len(), 1);
        assert_eq!(second.lines().len(), 1);
        assert_eq!(handler.metrics().map(HandlerMetrics::written_count), Some(2));
    }

    #[test]
    fn test_format_source() {
        let relative = Location::caller();
        assert!(format_source(relative).starts_with(relative.file()));
        assert!(format_source(relative).ends_with(&format!(":{}", relative.line())));
    }
}
