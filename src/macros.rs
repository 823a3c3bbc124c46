//! Logging macros with `format!`-style arguments.
//!
//! Each macro forwards to [`Logger::logf`](crate::Logger::logf) with
//! `format_args!`, so the arguments are only rendered when the level is
//! enabled and the recorded call site is the macro invocation.
//!
//! # Examples
//!
//! ```
//! use stream_logger::prelude::*;
//! use stream_logger::info;
//! use std::sync::Arc;
//!
//! let logger = Logger::builder()
//!     .formatter(SimpleFormatter::default())
//!     .writer(Arc::new(DirectWriter::new(Output::stdout())))
//!     .build()?;
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # Ok::<(), stream_logger::LoggerError>(())
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use stream_logger::prelude::*;
/// # let logger = Logger::builder().formatter(SimpleFormatter::default()).build().unwrap();
/// use stream_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use stream_logger::prelude::*;
/// # let logger = Logger::builder().formatter(SimpleFormatter::default()).build().unwrap();
/// use stream_logger::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
