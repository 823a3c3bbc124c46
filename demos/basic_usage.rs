//! Basic logger usage example
//!
//! Demonstrates logging at different levels through a buffered stderr writer.
//!
//! Run with: cargo run --example basic_usage

use std::sync::Arc;
use std::time::Duration;
use stream_logger::prelude::*;
use stream_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Stream Logger - Basic Usage Example ===\n");

    // Buffered writer flushing to stderr every 50ms
    let writer = Arc::new(StreamWriter::new(
        StreamWriterOptions::default().with_sync_interval_millis(50),
    ));
    writer.open()?;

    println!("1. Logging at different levels:");
    let logger = Logger::builder()
        .formatter(SimpleFormatter::default())
        .min_level(LogLevel::Debug)
        .writer(writer.clone())
        .build()?;

    logger.debug(&[&"This is a debug message"]);
    logger.info(&[&"This is an info message"]);
    logger.warn(&[&"This is a warning message"]);
    logger.error(&[&"This is an error message"]);

    println!("\n2. Formatted messages:");
    let port = 8080;
    logger.infof(format_args!("listening on port {}", port));
    info!(logger, "{} workers ready", 4);
    warn!(logger, "cache at {}%", 91);

    println!("\n3. A second logger with a custom template and minimum level:");
    let terse = Logger::builder()
        .formatter(SimpleFormatter::new("%level% | %args%"))
        .min_level(LogLevel::Warn)
        .time_zone(TimeZoneSetting::Utc)
        .writer(writer.clone())
        .build()?;
    terse.info(&[&"Info message (hidden)"]);
    terse.warn(&[&"Warning message (visible)"]);

    if !writer.close(Duration::from_secs(1)) {
        eprintln!("some log lines may not have been written");
    }

    let metrics = writer.metrics();
    println!(
        "\n{} lines accepted in {} flushes",
        metrics.accepted(),
        metrics.flushes()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
