//! Handler metrics
//!
//! Counters for records written and records dropped because encoding or the
//! sink write failed. Logging calls never report these failures to the caller,
//! so the counters are the only place they show up besides stderr.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for handler observability
///
/// # Example
///
/// ```
/// use rust_slog_core::HandlerMetrics;
///
/// let metrics = HandlerMetrics::new();
/// metrics.record_written();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    written: AtomicU64,
    dropped: AtomicU64,
}

impl HandlerMetrics {
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Record a written record, returning the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped record, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }
}
