//! Shared runtime configuration
//!
//! A root [`Logger`](super::Logger) owns one [`LevelCell`] and one
//! [`SourceFlagCell`]; every logger derived from it holds the same `Arc`s,
//! so a change made through any member of the family is seen by all of them.
//! Both cells are single atomics: reads never block and a write is one store.

use super::log_level::Level;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Atomically swappable verbosity threshold
pub struct LevelCell {
    value: AtomicI32,
}

impl LevelCell {
    pub const fn new(level: Level) -> Self {
        Self {
            value: AtomicI32::new(level.as_i32()),
        }
    }

    #[inline]
    pub fn get(&self) -> Level {
        Level::new(self.value.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, level: Level) {
        self.value.store(level.as_i32(), Ordering::Release);
    }

    /// Whether a record at `level` passes the threshold
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.get()
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl fmt::Debug for LevelCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelCell({})", self.get())
    }
}

/// Atomically swappable "capture source location" flag
#[derive(Default)]
pub struct SourceFlagCell {
    value: AtomicBool,
}

impl SourceFlagCell {
    pub const fn new(enabled: bool) -> Self {
        Self {
            value: AtomicBool::new(enabled),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, enabled: bool) {
        self.value.store(enabled, Ordering::Release);
    }
}

impl fmt::Debug for SourceFlagCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceFlagCell({})", self.get())
    }
}
