//! Stack trace capture for the trace and fatal tiers

use std::backtrace::Backtrace;

/// Symbol fragment identifying [`capture`] in a rendered backtrace
const CAPTURE_SYMBOL: &str = "stacktrace::capture";

const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

#[derive(Debug, PartialEq, Eq)]
struct Frame {
    symbol: String,
    location: Option<String>,
}

impl Frame {
    fn render(&self) -> String {
        match &self.location {
            Some(location) => format!("{} at {}", self.symbol, location),
            None => self.symbol.clone(),
        }
    }
}

/// Capture the current stack, one frame per line, innermost first.
///
/// Everything up to the first frame outside this crate's logging path is
/// removed: the backtrace machinery, this function and whichever crate frames
/// survived inlining. `skip` further frames are then dropped, for callers
/// that log through a helper of their own. An empty string means the platform
/// gave no usable frames.
#[inline(never)]
pub fn capture(skip: usize) -> String {
    let rendered = Backtrace::force_capture().to_string();
    trim(parse_frames(&rendered), skip)
        .iter()
        .map(Frame::render)
        .collect::<Vec<_>>()
        .join("\n")
}

fn trim(frames: Vec<Frame>, skip: usize) -> Vec<Frame> {
    let origin = match frames.iter().position(|f| f.symbol.contains(CAPTURE_SYMBOL)) {
        Some(pos) => pos + 1,
        // Unsymbolized stack: drop only what we can recognize as std machinery.
        None => frames
            .iter()
            .take_while(|f| f.symbol.starts_with("std::backtrace"))
            .count(),
    };
    let internal = frames[origin..]
        .iter()
        .take_while(|f| is_internal(&f.symbol))
        .count();
    frames.into_iter().skip(origin + internal + skip).collect()
}

/// A frame of the logging path itself; this crate's own tests are callers.
fn is_internal(symbol: &str) -> bool {
    symbol.contains(CRATE_PREFIX) && !symbol.contains("::tests::")
}

/// Parse std's backtrace rendering:
///
/// ```text
///    4: my_crate::work
///              at ./src/lib.rs:10:5
///       my_crate::inlined_into_work
///              at ./src/lib.rs:3:9
/// ```
fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for line in rendered.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.location = Some(location.to_string());
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if index.chars().all(|c| c.is_ascii_digit()) => symbol,
            _ => line,
        };
        frames.push(Frame {
            symbol: symbol.to_string(),
            location: None,
        });
    }

    frames
}
