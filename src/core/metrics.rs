//! Writer metrics for observability
//!
//! Counters describing what happened to the lines handed to a writer:
//! how many were accepted, how many reached the sink, and how many were
//! lost to sink errors or to writes after close.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for writer observability
///
/// # Example
///
/// ```
/// use stream_logger::WriterMetrics;
///
/// let metrics = WriterMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_flush(6);
///
/// assert_eq!(metrics.accepted(), 1);
/// assert_eq!(metrics.bytes_flushed(), 6);
/// ```
#[derive(Debug)]
pub struct WriterMetrics {
    /// Lines accepted by `write`
    accepted: AtomicU64,

    /// Lines refused because the writer was already closed
    rejected: AtomicU64,

    /// Successful sink writes
    flushes: AtomicU64,

    /// Bytes handed to the sink successfully
    bytes_flushed: AtomicU64,

    /// Sink writes that failed
    flush_errors: AtomicU64,

    /// Lines lost to failed sink writes
    lines_dropped: AtomicU64,

    /// Flushes requested early because the pending queue filled up
    early_flushes: AtomicU64,
}

impl WriterMetrics {
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            bytes_flushed: AtomicU64::new(0),
            flush_errors: AtomicU64::new(0),
            lines_dropped: AtomicU64::new(0),
            early_flushes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_flushed(&self) -> u64 {
        self.bytes_flushed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_errors(&self) -> u64 {
        self.flush_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn early_flushes(&self) -> u64 {
        self.early_flushes.load(Ordering::Relaxed)
    }

    /// Record an accepted line, returning the previous count
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successful sink write of `bytes` bytes
    #[inline]
    pub fn record_flush(&self, bytes: usize) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.bytes_flushed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a failed sink write that lost `lines` lines
    #[inline]
    pub fn record_flush_error(&self, lines: usize) {
        self.flush_errors.fetch_add(1, Ordering::Relaxed);
        self.lines_dropped.fetch_add(lines as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_early_flush(&self) -> u64 {
        self.early_flushes.fetch_add(1, Ordering::Relaxed)
    }

    /// Fraction of accepted lines lost to sink errors, as a percentage (0.0 - 100.0)
    pub fn loss_rate(&self) -> f64 {
        let accepted = self.accepted() as f64;
        if accepted == 0.0 {
            0.0
        } else {
            (self.lines_dropped() as f64 / accepted) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
        self.bytes_flushed.store(0, Ordering::Relaxed);
        self.flush_errors.store(0, Ordering::Relaxed);
        self.lines_dropped.store(0, Ordering::Relaxed);
        self.early_flushes.store(0, Ordering::Relaxed);
    }
}

impl Default for WriterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WriterMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted()),
            rejected: AtomicU64::new(self.rejected()),
            flushes: AtomicU64::new(self.flushes()),
            bytes_flushed: AtomicU64::new(self.bytes_flushed()),
            flush_errors: AtomicU64::new(self.flush_errors()),
            lines_dropped: AtomicU64::new(self.lines_dropped()),
            early_flushes: AtomicU64::new(self.early_flushes()),
        }
    }
}
