//! Synchronous writer
//!
//! Writes each line straight to its output on the caller's thread. Simpler
//! than [`StreamWriter`](super::StreamWriter) and needs no lifecycle, but
//! every log call pays for the I/O.

use super::output::Output;
use crate::core::{LogWriter, WriterMetrics};
use parking_lot::Mutex;
use std::io::Write;

pub struct DirectWriter {
    output: Mutex<Output>,
    name: String,
    metrics: WriterMetrics,
}

impl DirectWriter {
    pub fn new(output: Output) -> Self {
        let name = format!("direct:{}", output.description());
        Self {
            output: Mutex::new(output),
            name,
            metrics: WriterMetrics::new(),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Output::stderr())
    }

    pub fn metrics(&self) -> &WriterMetrics {
        &self.metrics
    }
}

impl Default for DirectWriter {
    fn default() -> Self {
        Self::stderr()
    }
}

impl LogWriter for DirectWriter {
    fn write(&self, msg: &str) {
        self.metrics.record_accepted();

        let mut line = String::with_capacity(msg.len() + 1);
        line.push_str(msg);
        line.push('\n');

        let mut output = self.output.lock();
        match output
            .write_all(line.as_bytes())
            .and_then(|()| output.flush())
        {
            Ok(()) => self.metrics.record_flush(line.len()),
            Err(e) => {
                self.metrics.record_flush_error(1);
                eprintln!("[LOGGER ERROR] Writer '{}' failed: {}", self.name, e);
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
