//! Byte sinks for writers

use std::fmt;
use std::io::{self, Write};

#[cfg(feature = "file")]
use crate::core::{LoggerError, Result};
#[cfg(feature = "file")]
use fs2::FileExt;
#[cfg(feature = "file")]
use std::fs::OpenOptions;
#[cfg(feature = "file")]
use std::path::Path;

/// Destination a writer owns exclusively.
///
/// The sink itself does not need to be thread-safe; writers serialize
/// access to it.
pub struct Output {
    inner: Box<dyn Write + Send>,
    description: String,
}

impl Output {
    pub fn stderr() -> Self {
        Self {
            inner: Box::new(io::stderr()),
            description: "stderr".to_string(),
        }
    }

    pub fn stdout() -> Self {
        Self {
            inner: Box::new(io::stdout()),
            description: "stdout".to_string(),
        }
    }

    /// Wrap any `Write` implementation, e.g. a pipe or an in-memory buffer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Box::new(writer),
            description: "custom".to_string(),
        }
    }

    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// The file is locked exclusively for the lifetime of the output, so a
    /// second output (in this or another process) on the same file fails
    /// instead of interleaving lines.
    ///
    /// # Errors
    ///
    /// `IoOperation` if the file cannot be opened, `FileLockError` if it is
    /// already locked.
    #[cfg(feature = "file")]
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation("creating log directory", display.clone(), e)
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggerError::io_operation("opening log file", display.clone(), e))?;

        FileExt::try_lock_exclusive(&file).map_err(|_| LoggerError::file_lock(display.clone()))?;

        Ok(Self {
            inner: Box::new(file),
            description: format!("file:{}", display),
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Write for Output {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
