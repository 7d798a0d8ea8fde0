//! Basic logger usage example
//!
//! Demonstrates levels, derivation and the default logger, writing JSON lines
//! to stdout.
//!
//! Run with: cargo run --example basic_usage

use rust_slog_core::prelude::*;
use rust_slog_core::{global, info, warn};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Slog Core - Basic Usage Example ===\n");

    let logger = Logger::builder().level_name("info").build();

    println!("1. Logging at different levels (threshold: info):");
    logger.trace("This trace message is filtered", []);
    logger.debug("This debug message is filtered", []);
    logger.info("This is an info message", []);
    logger.warn("This is a warning message", [Attr::int("retries", 3)]);
    logger.error("This is an error message", [Attr::string("code", "E42")]);
    logger.log(Level::new(6), "Between warn and error", []);

    println!("\n2. Lowering the threshold turns on source locations:");
    logger.set_level(Level::DEBUG);
    logger.debug("Now visible, with a source field", []);

    println!("\n3. Derived loggers:");
    let db = logger.named("db").with([Attr::string("pool", "primary")]);
    db.info("Connected", [Attr::duration("elapsed", Duration::from_millis(12))]);

    let query = db.with_group("query").with([Attr::string("table", "users")]);
    query.warn("Slow query", [Attr::uint("rows", 1200)]);

    println!("\n4. Formatting macros:");
    let port = 8080;
    info!(logger, "Listening on port {}", port);
    warn!(db, "Pool at {}% capacity", 85);

    println!("\n5. Default logger:");
    global::set_default(logger.named("app"));
    global::info("Through the default logger", []);

    logger.flush()?;

    println!("\n=== Example completed successfully ===");
    Ok(())
}
