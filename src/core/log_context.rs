//! Structured attributes and the bound attribute context
//!
//! This module provides:
//! - `Value`: the closed set of attribute value kinds
//! - `Attr`: one key/value pair
//! - `BoundContext`: attributes and open groups accumulated by logger derivation

use super::raw::RawFormat;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::io::Write;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    /// Encoded as integer nanoseconds
    Duration(Duration),
    /// Encoded as RFC 3339 with sub-second precision
    Time(DateTime<Utc>),
    /// Nested attributes, encoded as an object; empty groups are elided
    Group(Vec<Attr>),
}

impl Value {
    /// A group with nothing to emit, directly or through nested groups
    pub fn is_empty_group(&self) -> bool {
        match self {
            Value::Group(attrs) => attrs.iter().all(|attr| attr.value.is_empty_group()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Group(attrs) => {
                write!(f, "[")?;
                for (idx, attr) in attrs.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(fl) => serializer.serialize_f64(*fl),
            Value::String(s) => serializer.serialize_str(s),
            Value::Duration(d) => {
                serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            }
            Value::Time(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Group(attrs) => AttrMap {
                parts: &[attrs.as_slice()],
            }
            .serialize(serializer),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

/// A single structured field
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(value))
    }

    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Self::new(key, Value::Group(attrs.into_iter().collect()))
    }

    /// Text embedded as a nested object under `name` when it parses as JSON
    pub fn raw_json(name: &str, text: impl Into<String>) -> Self {
        Self::string(RawFormat::Json.key(name), text)
    }

    /// Text embedded as a nested object under `name` when it parses as YAML
    pub fn raw_yaml(name: &str, text: impl Into<String>) -> Self {
        Self::string(RawFormat::Yaml.key(name), text)
    }
}

impl<K, V> From<(K, V)> for Attr
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from((key, value): (K, V)) -> Self {
        Attr::new(key, value)
    }
}

/// Serializes one or more attribute slices as a single JSON object.
struct AttrMap<'a> {
    parts: &'a [&'a [Attr]],
}

impl Serialize for AttrMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for attr in self.parts.iter().flat_map(|part| part.iter()) {
            if attr.value.is_empty_group() {
                continue;
            }
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

/// Attributes and group nesting bound to a logger by derivation.
///
/// The context is a value: every derivation returns a new context and leaves
/// the receiver untouched. Attributes bound while groups are open land inside
/// those groups, as do the attributes of records emitted through the logger.
#[derive(Debug, Clone, Default)]
pub struct BoundContext {
    attrs: Vec<Attr>,
    /// Index path from the root into the currently open group
    open: Vec<usize>,
}

impl BoundContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root-level attributes, including open groups
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Number of open groups
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.iter().all(|attr| attr.value.is_empty_group())
    }

    /// New context with `attrs` appended inside the innermost open group
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let mut next = self.clone();
        next.open_group_mut().extend(attrs);
        next
    }

    /// New context with group `name` opened inside the innermost open group.
    /// An empty name opens nothing.
    pub fn with_group(&self, name: &str) -> Self {
        let mut next = self.clone();
        if name.is_empty() {
            return next;
        }

        let current = next.open_group_mut();
        current.push(Attr::group(name, Vec::new()));
        let index = current.len() - 1;
        next.open.push(index);
        next
    }

    /// New context with `attr` set at the root, replacing a root attribute
    /// with the same key in place.
    pub fn with_root_attr(&self, attr: Attr) -> Self {
        let mut next = self.clone();
        match next.attrs.iter_mut().find(|existing| existing.key == attr.key) {
            Some(existing) => existing.value = attr.value,
            None => next.attrs.push(attr),
        }
        next
    }

    /// Encode the bound attributes followed by `extra` as one JSON object.
    ///
    /// `extra` goes into the innermost open group, exactly like bound
    /// attributes do.
    pub fn write_json<W: Write>(&self, extra: &[Attr], writer: W) -> serde_json::Result<()> {
        if self.open.is_empty() || extra.is_empty() {
            let parts = [self.attrs.as_slice(), extra];
            return serde_json::to_writer(writer, &AttrMap { parts: &parts });
        }

        let mut merged = self.clone();
        merged.open_group_mut().extend(extra.iter().cloned());
        let parts = [merged.attrs.as_slice()];
        serde_json::to_writer(writer, &AttrMap { parts: &parts })
    }

    fn open_group_mut(&mut self) -> &mut Vec<Attr> {
        let mut current = &mut self.attrs;
        for &index in &self.open {
            current = match &mut current[index].value {
                Value::Group(children) => children,
                _ => unreachable!("open group path always points at groups"),
            };
        }
        current
    }
}
