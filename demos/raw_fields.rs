//! Raw field example
//!
//! Attributes keyed `raw;json;<name>` or `raw;yaml;<name>` carry documents
//! that are embedded as nested objects when they parse.
//!
//! Run with: cargo run --example raw_fields

use rust_slog_core::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Slog Core - Raw Fields Example ===\n");

    let logger = Logger::builder().sink(ConsoleSink::stderr()).build();

    println!("1. A JSON document becomes a nested object:");
    logger.info(
        "Webhook received",
        [Attr::raw_json("payload", r#"{"event":"push","commits":3}"#)],
    );

    println!("\n2. Text that does not parse is kept as a string:");
    logger.info("Webhook received", [Attr::raw_json("payload", "{truncated")]);

    println!("\n3. YAML documents work the same way:");
    logger.info(
        "Config loaded",
        [Attr::raw_yaml("config", "listen: 0.0.0.0:8080\nworkers: 4\n")],
    );

    println!("\n4. Raw fields inside groups:");
    logger
        .with_group("request")
        .warn("Rejected", [Attr::raw_json("headers", r#"{"x-id":"abc"}"#)]);

    logger.flush()?;

    println!("\n=== Example completed successfully ===");
    Ok(())
}
