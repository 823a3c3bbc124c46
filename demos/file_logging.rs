//! File logging example
//!
//! Loads logger and writer settings from JSON and logs to a file.
//!
//! Run with: cargo run --example file_logging

use std::sync::Arc;
use std::time::Duration;
use stream_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Stream Logger - File Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("stream_logger_demo");
    let log_path = log_dir.join("app.log");

    let config = LoggerConfig::from_json(
        r#"{
            "min_level": "Debug",
            "time_zone": "utc",
            "template": "%timestamp% [%level%] %pkg% - %args%"
        }"#,
    )?;

    let writer_config = WriterConfig {
        output: log_path.display().to_string(),
        sync_interval_ms: 200,
        ..WriterConfig::default()
    };

    let writer = Arc::new(StreamWriter::new(writer_config.to_options()?));
    writer.open()?;

    let logger = LoggerBuilder::from_config(&config)
        .writer(writer.clone())
        .build()?;

    for request in 1..=5 {
        logger.infof(format_args!("handled request {}", request));
    }
    logger.debug(&[&"cache warmed"]);
    logger.error(&[&"upstream timed out after ", &30, &"s"]);

    if writer.close(Duration::from_secs(2)) {
        println!("Log written to {}", log_path.display());
    } else {
        eprintln!("Timed out draining {}", log_path.display());
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
