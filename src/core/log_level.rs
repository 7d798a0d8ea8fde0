//! Severity scale
//!
//! Levels are plain signed integers on a fixed scale. Six named breakpoints
//! anchor the scale; any value in between is valid and renders relative to
//! the nearest breakpoint at or below it (`info+2`, `error+3`, `trace-1`).
//!
//! Two parsers coexist on purpose:
//!
//! - [`Level::parse`] (and `FromStr`) is strict and rejects unknown names with
//!   [`LoggerError::UnknownLevel`]. Use it to validate configuration.
//! - [`Level::parse_lenient`] never fails and falls back to [`Level::INFO`].
//!   Use it where a best-effort default is preferable to refusing to start.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(i32);

const BREAKPOINTS: [(&str, Level); 6] = [
    ("trace", Level::TRACE),
    ("debug", Level::DEBUG),
    ("info", Level::INFO),
    ("warn", Level::WARN),
    ("error", Level::ERROR),
    ("fatal", Level::FATAL),
];

impl Level {
    pub const TRACE: Level = Level(-8);
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);
    pub const FATAL: Level = Level(12);

    #[inline]
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Level shifted by `offset` steps, saturating at the ends of the scale
    #[must_use]
    pub const fn offset(self, offset: i32) -> Self {
        Level(self.0.saturating_add(offset))
    }

    /// Strict parse: case-insensitive match against the six breakpoint names.
    pub fn parse(input: &str) -> Result<Self> {
        let lowered = input.to_ascii_lowercase();
        BREAKPOINTS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, level)| *level)
            .ok_or_else(|| LoggerError::unknown_level(input))
    }

    /// Lenient parse: like [`Level::parse`] but unknown input yields `info`.
    pub fn parse_lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or(Level::INFO)
    }

    /// Name of the breakpoint this level is rendered against, and its value.
    ///
    /// A value equal to a breakpoint always belongs to that breakpoint's
    /// bracket, so `FATAL` renders as `fatal`, never `error+4`.
    fn bracket(self) -> (&'static str, Level) {
        match self {
            l if l < Level::DEBUG => ("trace", Level::TRACE),
            l if l < Level::INFO => ("debug", Level::DEBUG),
            l if l < Level::WARN => ("info", Level::INFO),
            l if l < Level::ERROR => ("warn", Level::WARN),
            l if l < Level::FATAL => ("error", Level::ERROR),
            _ => ("fatal", Level::FATAL),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = self.bracket();
        // Differences stay within i32 for every bracket, including the open ends.
        let offset = self.0 - base.0;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, offset)
        }
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Level::parse(s)
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Level::parse(&raw).map_err(serde::de::Error::custom)
    }
}
