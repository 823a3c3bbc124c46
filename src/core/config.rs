//! Serializable configuration
//!
//! Plain data mirroring the builder options, so a logger and its writers
//! can be described in a JSON file. Every field has a default.

use super::error::{LoggerError, Result};
use super::formatter::DEFAULT_TEMPLATE;
use super::log_level::LogLevel;
use super::timestamp::{TimeZoneSetting, DEFAULT_TIME_FORMAT};
use crate::writers::output::Output;
use crate::writers::stream::{StreamWriterOptions, DEFAULT_QUEUE_CAPACITY, DEFAULT_SYNC_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Logger settings
///
/// # Example
///
/// ```
/// use stream_logger::core::{LoggerConfig, LogLevel};
///
/// let config = LoggerConfig::from_json(r#"{ "min_level": "Debug", "time_zone": "utc" }"#).unwrap();
/// assert_eq!(config.min_level, LogLevel::Debug);
/// assert_eq!(config.template, "%timestamp%  %level% --- [%pkg%] %args%");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    /// chrono strftime pattern
    pub time_format: String,
    pub time_zone: TimeZoneSetting,
    pub template: String,
    /// Resolve call sites for `%pkg%`; when false it renders empty
    pub include_location: bool,
    /// Color the level value (ignored without the `console` feature)
    pub colored_level: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Unset,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_zone: TimeZoneSetting::Local,
            template: DEFAULT_TEMPLATE.to_string(),
            include_location: true,
            colored_level: false,
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                path.display().to_string(),
                e,
            )
        })?;
        Self::from_json(&json)
    }
}

/// Stream writer settings
///
/// `output` is `"stderr"`, `"stdout"`, or a file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub output: String,
    pub sync_interval_ms: u64,
    pub queue_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output: "stderr".to_string(),
            sync_interval_ms: DEFAULT_SYNC_INTERVAL.as_millis() as u64,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WriterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Open the configured output and build writer options from it.
    ///
    /// # Errors
    ///
    /// Fails if a file output cannot be opened or locked, or if a file path
    /// is given while the `file` feature is disabled.
    pub fn to_options(&self) -> Result<StreamWriterOptions> {
        let output = match self.output.trim() {
            "" | "stderr" => Output::stderr(),
            "stdout" => Output::stdout(),
            #[cfg(feature = "file")]
            path => Output::file(path)?,
            #[cfg(not(feature = "file"))]
            path => {
                return Err(LoggerError::config(
                    "WriterConfig",
                    format!("file output '{}' requires the `file` feature", path),
                ))
            }
        };

        Ok(StreamWriterOptions::default()
            .with_output(output)
            .with_sync_interval(Duration::from_millis(self.sync_interval_ms))
            .with_queue_capacity(self.queue_capacity))
    }
}
