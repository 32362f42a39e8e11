//! Basic logger usage example
//!
//! Demonstrates a single-destination logger, levels, implied args, names
//! and exclusion filters.
//!
//! Run with: cargo run --example basic_usage

use fanlog::prelude::*;
use fanlog::{debug, info, warn};

fn main() -> Result<()> {
    println!("=== fanlog - Basic Usage Example ===\n");

    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_name("app")
            .with_level(Level::Trace)
            .with_color(ColorOption::Auto)
            .with_include_location(true),
    );

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message", &[]);
    logger.debug("This is a debug message", &[]);
    logger.info("This is an info message", &[]);
    logger.warn("This is a warning message", &[]);
    logger.error("This is an error message", &[]);

    println!("\n2. Raising the threshold:");
    logger.set_level(Level::Info);
    println!("   Level set to INFO - trace and debug won't show:");
    logger.trace("Trace message (hidden)", &[]);
    logger.debug("Debug message (hidden)", &[]);
    logger.info("Info message (visible)", &[]);

    println!("\n3. Sub-loggers with names and implied args:");
    let http = logger.named("http").with(args!["listener", "0.0.0.0:8080"]);
    info!(http, "request served"; "status" => 200, "ms" => 12);
    warn!(http, "slow request took {}ms", 912; "path" => "/v1/items");
    debug!(http, "hidden at INFO");

    println!("\n4. Excluding noisy messages:");
    let quiet = DestinationLogger::new(
        &LoggerOptions::new()
            .with_name("probe")
            .with_exclude(ExcludeByPrefix::new("health: ")),
    );
    quiet.info("health: ok", &[]);
    quiet.info("probe registered", args!["interval_s", 10]);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
