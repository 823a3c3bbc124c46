//! Core logger types and traits

pub mod config;
pub mod error;
pub mod formatter;
pub mod level_table;
pub mod location;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod timestamp;
pub mod writer;

pub use config::{LoggerConfig, WriterConfig};
pub use error::{LoggerError, Result};
pub use formatter::{LogFormatter, SimpleFormatter, DEFAULT_TEMPLATE};
pub use level_table::LevelTable;
pub use location::{LocationResolver, NoLocation, SourceLocation};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::WriterMetrics;
pub use timestamp::{Clock, TimeZoneSetting, DEFAULT_TIME_FORMAT};
pub use writer::LogWriter;
