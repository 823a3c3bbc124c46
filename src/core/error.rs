//! Error types for the logger system
//!
//! Only construction and lifecycle calls return these. Log calls and
//! `LogWriter::write` never fail; sink errors are reported out of band.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Lifecycle call made in the wrong writer state
    #[error("Invalid state for {component}: {message}")]
    InvalidState { component: String, message: String },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidState {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("Clock", "bad time zone");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::invalid_state("StreamWriter", "already open");
        assert!(matches!(err, LoggerError::InvalidState { .. }));

        let err = LoggerError::file_lock("/var/log/app.log");
        assert!(matches!(err, LoggerError::FileLockError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("Clock", "invalid time format '%Q'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for Clock: invalid time format '%Q'"
        );

        let err = LoggerError::invalid_state("StreamWriter", "writer is already open");
        assert_eq!(
            err.to_string(),
            "Invalid state for StreamWriter: writer is already open"
        );

        let err = LoggerError::file_lock("/var/log/app.log");
        assert_eq!(
            err.to_string(),
            "Failed to acquire file lock on '/var/log/app.log'"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open for append", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open for append"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: LoggerError = json_err.into();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }
}
