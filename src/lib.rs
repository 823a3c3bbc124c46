//! # Stream Logger
//!
//! Leveled logging with template formatting and a buffered writer that
//! flushes on a background thread.
//!
//! ## Features
//!
//! - **Template formatting**: `%timestamp%`, `%level%`, `%pkg%` and `%args%`
//!   placeholders, rendered once per enabled call
//! - **Cheap disabled levels**: the minimum level is resolved into a dispatch
//!   table at construction, so filtered calls do no formatting at all
//! - **Buffered output**: [`StreamWriter`] batches lines and syncs them
//!   periodically, with a bounded graceful close
//! - **Thread safe**: loggers and writers are shared freely across threads
//!
//! ## Example
//!
//! ```no_run
//! use stream_logger::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let writer = Arc::new(StreamWriter::new(StreamWriterOptions::default()));
//! writer.open()?;
//!
//! let logger = Logger::builder()
//!     .formatter(SimpleFormatter::default())
//!     .writer(writer.clone())
//!     .build()?;
//!
//! logger.info(&[&"service started"]);
//! stream_logger::warn!(logger, "cache at {}%", 91);
//!
//! writer.close(Duration::from_secs(1));
//! # Ok::<(), stream_logger::LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        Clock, LevelTable, LocationResolver, LogFormatter, LogLevel, LogWriter, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, NoLocation, Result, SimpleFormatter,
        SourceLocation, TimeZoneSetting, WriterConfig, WriterMetrics, DEFAULT_TEMPLATE,
        DEFAULT_TIME_FORMAT,
    };
    pub use crate::writers::{
        DirectWriter, Output, StreamWriter, StreamWriterOptions, WriterState,
        DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SYNC_INTERVAL,
    };
}

pub use core::{
    Clock, LevelTable, LocationResolver, LogFormatter, LogLevel, LogWriter, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, NoLocation, Result, SimpleFormatter,
    SourceLocation, TimeZoneSetting, WriterConfig, WriterMetrics, DEFAULT_TEMPLATE,
    DEFAULT_TIME_FORMAT,
};
pub use writers::{
    DirectWriter, Output, StreamWriter, StreamWriterOptions, WriterState, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SYNC_INTERVAL,
};
