//! Per-call enrichment signals
//!
//! Every logging call builds its own [`CallContext`]. The context says whether
//! the call site should be reported as the record's source, and may carry a
//! stack trace captured at that call site. Contexts are values: deriving one
//! never touches the original, so nothing leaks between concurrent calls.

use std::panic::Location;
use std::sync::Arc;

/// How a call path enriches its records.
///
/// Each public entry point owns one policy constant, so the number of frames
/// trimmed from a stack trace is a property of the path, not of the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentPolicy {
    /// Report the caller's location as the record source
    pub capture_caller: bool,
    /// Attach a stack trace captured at the call site
    pub capture_stack: bool,
    /// Caller frames dropped once the logging path's own frames are gone
    pub stack_skip: usize,
}

impl EnrichmentPolicy {
    /// Records handed over as-is: no caller correction, no stack
    pub const PASSTHROUGH: Self = Self {
        capture_caller: false,
        capture_stack: false,
        stack_skip: 0,
    };

    /// Caller correction only
    pub const CALLER: Self = Self {
        capture_caller: true,
        capture_stack: false,
        stack_skip: 0,
    };

    /// Caller correction plus a stack trace trimmed by `stack_skip` frames
    pub const fn with_stack(stack_skip: usize) -> Self {
        Self {
            capture_caller: true,
            capture_stack: true,
            stack_skip,
        }
    }
}

/// Implicit context threaded through one logging call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    caller: Option<&'static Location<'static>>,
    stack_trace: Option<Arc<str>>,
}

impl CallContext {
    /// A context that requests nothing
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose records report `caller` as their source
    #[must_use]
    pub fn with_caller(&self, caller: &'static Location<'static>) -> Self {
        Self {
            caller: Some(caller),
            stack_trace: self.stack_trace.clone(),
        }
    }

    /// Derive a context carrying a pre-captured stack trace
    #[must_use]
    pub fn with_stack_trace(&self, trace: impl Into<Arc<str>>) -> Self {
        Self {
            caller: self.caller,
            stack_trace: Some(trace.into()),
        }
    }

    /// Whether the record's location should be replaced by the call site
    pub fn caller_correction(&self) -> bool {
        self.caller.is_some()
    }

    pub fn caller(&self) -> Option<&'static Location<'static>> {
        self.caller
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }
}
