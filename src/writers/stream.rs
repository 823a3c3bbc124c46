//! Asynchronous buffered writer
//!
//! `write` only appends to an in-memory buffer. A dedicated flush thread
//! moves the buffer to the sink on a fixed interval, and `close` drains
//! whatever is left before returning.
//!
//! Lock order is sink, then buffer. The buffer lock is only held to append
//! or to swap the buffer out, never across sink I/O, so a slow sink delays
//! flushing but never a caller of `write`.

use super::output::Output;
use crate::core::{LogWriter, LoggerError, Result, WriterMetrics};
use crossbeam_channel::{bounded, select, tick, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default interval between scheduled flushes (100 ms)
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of pending lines that triggers an early flush
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Default drain timeout used when a writer is dropped while open (5 seconds)
///
/// For custom timeout control, call [`StreamWriter::close`] explicitly.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Construction options, consumed by [`StreamWriter::new`]
///
/// # Example
///
/// ```
/// use stream_logger::writers::{Output, StreamWriterOptions};
///
/// let options = StreamWriterOptions::default()
///     .with_output(Output::stdout())
///     .with_sync_interval_millis(50)
///     .with_queue_capacity(1_000);
/// assert_eq!(options.queue_capacity, 1_000);
/// ```
#[derive(Debug)]
pub struct StreamWriterOptions {
    /// Destination of flushed lines (default: stderr)
    pub output: Output,
    /// Time between scheduled flushes
    pub sync_interval: Duration,
    /// Pending lines that wake the flush thread before its next tick
    pub queue_capacity: usize,
}

impl Default for StreamWriterOptions {
    fn default() -> Self {
        Self {
            output: Output::stderr(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl StreamWriterOptions {
    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Set the flush interval; zero keeps the default.
    #[must_use]
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = if interval.is_zero() {
            DEFAULT_SYNC_INTERVAL
        } else {
            interval
        };
        self
    }

    #[must_use]
    pub fn with_sync_interval_millis(self, millis: u64) -> Self {
        self.with_sync_interval(Duration::from_millis(millis))
    }

    /// Set the early-flush threshold; zero keeps the default.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = if capacity == 0 {
            DEFAULT_QUEUE_CAPACITY
        } else {
            capacity
        };
        self
    }
}

/// Lifecycle of a [`StreamWriter`]. A writer is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WriterState {
    Unopened = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl WriterState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WriterState::Unopened,
            1 => WriterState::Open,
            2 => WriterState::Closing,
            _ => WriterState::Closed,
        }
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriterState::Unopened => "unopened",
            WriterState::Open => "open",
            WriterState::Closing => "closing",
            WriterState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Default)]
struct Pending {
    data: String,
    lines: usize,
}

/// State shared between the writer handle and its flush thread.
struct Shared {
    name: String,
    buffer: Mutex<Pending>,
    sink: Mutex<Output>,
    state: AtomicU8,
    metrics: WriterMetrics,
}

impl Shared {
    fn state(&self) -> WriterState {
        WriterState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WriterState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: WriterState, to: WriterState) -> std::result::Result<(), WriterState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(WriterState::from_u8)
    }

    /// Append one line; returns the pending line count, or `None` once closed.
    fn append(&self, msg: &str) -> Option<usize> {
        let mut buffer = self.buffer.lock();
        // Checked under the buffer lock so nothing is appended after the
        // final drain has seen `Closed`.
        if self.state() == WriterState::Closed {
            return None;
        }
        buffer.data.reserve(msg.len() + 1);
        buffer.data.push_str(msg);
        buffer.data.push('\n');
        buffer.lines += 1;
        Some(buffer.lines)
    }

    fn mark_closed(&self) {
        let _buffer = self.buffer.lock();
        self.set_state(WriterState::Closed);
    }

    fn has_pending(&self) -> bool {
        self.buffer.lock().lines > 0
    }

    fn pending_lines(&self) -> usize {
        self.buffer.lock().lines
    }

    fn flush(&self) {
        let mut sink = self.sink.lock();
        self.flush_into(&mut sink);
    }

    /// Flush only if no other flush is in progress.
    fn try_flush(&self) -> bool {
        match self.sink.try_lock() {
            Some(mut sink) => {
                self.flush_into(&mut sink);
                true
            }
            None => false,
        }
    }

    /// Caller holds the sink lock, so swapped-out chunks reach the sink in
    /// the order they were buffered.
    fn flush_into(&self, sink: &mut Output) {
        let pending = std::mem::take(&mut *self.buffer.lock());
        if pending.lines == 0 {
            return;
        }

        match sink
            .write_all(pending.data.as_bytes())
            .and_then(|()| sink.flush())
        {
            Ok(()) => self.metrics.record_flush(pending.data.len()),
            Err(e) => {
                self.metrics.record_flush_error(pending.lines);
                eprintln!(
                    "[LOGGER ERROR] Writer '{}' failed to flush {} lines: {}",
                    self.name, pending.lines, e
                );
            }
        }
    }
}

fn flush_loop(shared: &Shared, ticker: &Receiver<Instant>, control: &Receiver<()>, done: Sender<()>) {
    loop {
        // A disconnected control channel means the handle dropped its
        // sender: shutdown requested.
        let shutdown = select! {
            recv(ticker) -> _ => false,
            recv(control) -> msg => msg.is_err(),
        };
        if shutdown {
            break;
        }
        shared.flush();
    }

    while shared.has_pending() {
        shared.flush();
    }
    shared.mark_closed();
    shared.flush();

    let _ = done.send(());
}

#[derive(Default)]
struct Lifecycle {
    control: Option<Sender<()>>,
    done: Option<Receiver<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Non-blocking buffered writer backed by one flush thread
///
/// Every line accepted by `write` before `close` is called reaches the
/// sink by the time `close` returns `true`. Lines written concurrently
/// with `close` may or may not be included.
///
/// # Example
///
/// ```no_run
/// use stream_logger::writers::{StreamWriter, StreamWriterOptions};
/// use std::time::Duration;
///
/// let writer = StreamWriter::new(StreamWriterOptions::default());
/// writer.open()?;
///
/// use stream_logger::LogWriter;
/// writer.write("server started");
///
/// if !writer.close(Duration::from_secs(1)) {
///     eprintln!("some lines may not have been written");
/// }
/// # Ok::<(), stream_logger::LoggerError>(())
/// ```
pub struct StreamWriter {
    shared: Arc<Shared>,
    sync_interval: Duration,
    queue_capacity: usize,
    lifecycle: Mutex<Lifecycle>,
}

impl StreamWriter {
    /// Create an unopened writer. Call [`open`](Self::open) to start flushing.
    ///
    /// A zero `sync_interval` or `queue_capacity` falls back to its default,
    /// however the options were built.
    pub fn new(options: StreamWriterOptions) -> Self {
        let (interval, capacity) = (options.sync_interval, options.queue_capacity);
        let options = options
            .with_sync_interval(interval)
            .with_queue_capacity(capacity);
        let name = format!("stream:{}", options.output.description());
        Self {
            shared: Arc::new(Shared {
                name,
                buffer: Mutex::new(Pending::default()),
                sink: Mutex::new(options.output),
                state: AtomicU8::new(WriterState::Unopened as u8),
                metrics: WriterMetrics::new(),
            }),
            sync_interval: options.sync_interval,
            queue_capacity: options.queue_capacity,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Start the flush thread.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the writer was already opened or closed, or
    /// `IoOperation` if the thread cannot be spawned.
    pub fn open(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();

        let state = self.shared.state();
        if state != WriterState::Unopened {
            return Err(LoggerError::invalid_state(
                "StreamWriter",
                format!("cannot open a writer that is {}", state),
            ));
        }

        let (control_tx, control_rx) = bounded(1);
        let (done_tx, done_rx) = bounded(1);
        let ticker = tick(self.sync_interval);
        let shared = Arc::clone(&self.shared);

        let handle = thread::Builder::new()
            .name("stream-writer-flush".to_string())
            .spawn(move || flush_loop(&shared, &ticker, &control_rx, done_tx))
            .map_err(|e| {
                LoggerError::io_operation("spawning flush thread", self.shared.name.clone(), e)
            })?;

        lifecycle.control = Some(control_tx);
        lifecycle.done = Some(done_rx);
        lifecycle.handle = Some(handle);
        self.shared.set_state(WriterState::Open);

        Ok(())
    }

    /// Stop the flush thread after draining the buffer.
    ///
    /// Blocks until every line written before this call has been handed to
    /// the sink, or until `timeout` elapses. On timeout one more flush is
    /// attempted if no flush is in progress, the writer is marked closed,
    /// and the flush thread keeps draining in the background.
    ///
    /// Returns `true` if the drain completed in time. Closing a writer that
    /// was never opened flushes its buffer on the calling thread. Closing an
    /// already closed writer returns `true` and does nothing.
    pub fn close(&self, timeout: Duration) -> bool {
        let mut lifecycle = self.lifecycle.lock();

        match self.shared.transition(WriterState::Open, WriterState::Closing) {
            Ok(()) => {}
            Err(WriterState::Unopened) => {
                self.shared.mark_closed();
                self.shared.flush();
                return true;
            }
            Err(WriterState::Closed) => return true,
            Err(_) => return false,
        }

        // Dropping the only sender is the shutdown signal.
        drop(lifecycle.control.take());
        let handle = lifecycle.handle.take();
        let outcome = match lifecycle.done.take() {
            Some(done) => done.recv_timeout(timeout),
            None => Err(RecvTimeoutError::Disconnected),
        };

        match outcome {
            Ok(()) => {
                if let Some(handle) = handle {
                    if handle.join().is_err() {
                        eprintln!(
                            "[LOGGER ERROR] Writer '{}' flush thread panicked during shutdown",
                            self.shared.name
                        );
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                eprintln!(
                    "[LOGGER WARNING] Writer '{}' did not drain within {:?}. \
                     Some logs may be lost.",
                    self.shared.name, timeout
                );
                self.shared.mark_closed();
                self.shared.try_flush();
                false
            }
            Err(RecvTimeoutError::Disconnected) => {
                eprintln!(
                    "[LOGGER ERROR] Writer '{}' flush thread exited before draining",
                    self.shared.name
                );
                self.shared.mark_closed();
                self.shared.flush();
                if let Some(handle) = handle {
                    let _ = handle.join();
                }
                false
            }
        }
    }

    pub fn state(&self) -> WriterState {
        self.shared.state()
    }

    pub fn metrics(&self) -> &WriterMetrics {
        &self.shared.metrics
    }

    /// Lines buffered but not yet handed to the sink
    pub fn pending_lines(&self) -> usize {
        self.shared.pending_lines()
    }

    pub fn sync_interval(&self) -> Duration {
        self.sync_interval
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Wake the flush thread early. Skipped if a lifecycle call holds the
    /// lock or a wake-up is already queued; the next tick covers it.
    fn request_flush(&self) {
        if let Some(lifecycle) = self.lifecycle.try_lock() {
            if let Some(control) = lifecycle.control.as_ref() {
                if control.try_send(()).is_ok() {
                    self.shared.metrics.record_early_flush();
                }
            }
        }
    }
}

impl LogWriter for StreamWriter {
    fn write(&self, msg: &str) {
        match self.shared.append(msg) {
            Some(pending) => {
                self.shared.metrics.record_accepted();
                if pending >= self.queue_capacity {
                    self.request_flush();
                }
            }
            None => {
                self.shared.metrics.record_rejected();
            }
        }
    }

    fn name(&self) -> &str {
        &self.shared.name
    }
}

impl fmt::Debug for StreamWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamWriter")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("sync_interval", &self.sync_interval)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        if matches!(self.state(), WriterState::Unopened | WriterState::Open) {
            self.close(DEFAULT_SHUTDOWN_TIMEOUT);
        }

        let lost = self.shared.metrics.lines_dropped();
        if lost > 0 {
            eprintln!(
                "[LOGGER WARNING] Writer '{}' shutting down with {} lines lost to sink errors (loss rate: {:.2}%)",
                self.shared.name,
                lost,
                self.shared.metrics.loss_rate()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Clone, Default)]
    struct MemorySink(Arc<Mutex<Vec<u8>>>);

    impl MemorySink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).expect("sink holds utf-8")
        }
    }

    impl Write for MemorySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts bytes slowly, a few at a time.
    #[derive(Clone, Default)]
    struct SlowSink(MemorySink);

    impl Write for SlowSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            thread::sleep(Duration::from_millis(5));
            let n = buf.len().min(16);
            self.0.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer_for(sink: impl Write + Send + 'static, interval_ms: u64) -> StreamWriter {
        StreamWriter::new(
            StreamWriterOptions::default()
                .with_output(Output::from_writer(sink))
                .with_sync_interval_millis(interval_ms),
        )
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("{}\n", i)).collect()
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_options_defaults() {
        let options = StreamWriterOptions::default();
        assert_eq!(options.sync_interval, Duration::from_millis(100));
        assert_eq!(options.queue_capacity, 10_000);
        assert_eq!(options.output.description(), "stderr");

        let options = options.with_sync_interval(Duration::ZERO).with_queue_capacity(0);
        assert_eq!(options.sync_interval, DEFAULT_SYNC_INTERVAL);
        assert_eq!(options.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_zero_options_fall_back_to_defaults() {
        let writer = StreamWriter::new(StreamWriterOptions {
            output: Output::from_writer(MemorySink::default()),
            sync_interval: Duration::ZERO,
            queue_capacity: 0,
        });

        assert_eq!(writer.sync_interval(), Duration::from_millis(100));
        assert_eq!(writer.queue_capacity(), 10_000);

        // An idle writer must not be woken by a zero-length tick
        writer.open().expect("open");
        thread::sleep(Duration::from_millis(50));
        assert_eq!(writer.metrics().flushes(), 0);
        assert_eq!(writer.metrics().early_flushes(), 0);

        writer.write("one line");
        assert_eq!(writer.metrics().early_flushes(), 0);
        assert!(writer.close(Duration::from_secs(1)));
    }

    #[test]
    fn test_lifecycle_states() {
        let writer = writer_for(MemorySink::default(), 20);
        assert_eq!(writer.state(), WriterState::Unopened);

        writer.open().expect("open");
        assert_eq!(writer.state(), WriterState::Open);

        assert!(writer.close(Duration::from_secs(1)));
        assert_eq!(writer.state(), WriterState::Closed);
    }

    #[test]
    fn test_write_does_not_touch_sink() {
        let sink = MemorySink::default();
        let writer = writer_for(sink.clone(), 60_000);
        writer.open().expect("open");

        writer.write("buffered");
        assert_eq!(writer.pending_lines(), 1);
        assert_eq!(sink.contents(), "");

        assert!(writer.close(Duration::from_secs(1)));
        assert_eq!(sink.contents(), "buffered\n");
    }

    #[test]
    fn test_periodic_flush_preserves_order() {
        let sink = MemorySink::default();
        let writer = writer_for(sink.clone(), 20);
        writer.open().expect("open");

        for i in 0..10 {
            writer.write(&i.to_string());
        }

        assert!(wait_until(Duration::from_secs(2), || sink.contents() == numbered(10)));
        assert_eq!(writer.pending_lines(), 0);
        assert!(writer.metrics().flushes() >= 1);
        assert!(writer.close(Duration::from_secs(1)));
    }

    #[test]
    fn test_close_flushes_every_prior_write() {
        let sink = MemorySink::default();
        let writer = writer_for(sink.clone(), 100);
        writer.open().expect("open");

        for i in 0..1000 {
            writer.write(&i.to_string());
        }

        assert!(writer.close(Duration::from_secs(1)));
        assert_eq!(sink.contents(), numbered(1000));
        assert_eq!(writer.metrics().accepted(), 1000);
    }

    #[test]
    fn test_concurrent_writers_then_close() {
        let sink = MemorySink::default();
        let writer = Arc::new(writer_for(sink.clone(), 10));
        writer.open().expect("open");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let writer = Arc::clone(&writer);
                thread::spawn(move || {
                    for i in 0..250 {
                        writer.write(&format!("{}-{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert!(writer.close(Duration::from_secs(2)));

        let contents = sink.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2000);
        for t in 0..8 {
            let mine: Vec<&str> = lines
                .iter()
                .copied()
                .filter(|l| l.starts_with(&format!("{}-", t)))
                .collect();
            let expected: Vec<String> = (0..250).map(|i| format!("{}-{}", t, i)).collect();
            assert_eq!(mine, expected, "thread {} lines out of order or missing", t);
        }
    }

    #[test]
    fn test_close_with_tiny_timeout_returns_and_keeps_lines_whole() {
        let sink = SlowSink::default();
        let memory = sink.0.clone();
        let writer = writer_for(sink, 10_000);
        writer.open().expect("open");

        for i in 0..200 {
            writer.write(&i.to_string());
        }

        let start = Instant::now();
        let drained = writer.close(Duration::from_millis(1));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(!drained);
        assert_eq!(writer.state(), WriterState::Closed);

        // The flush thread keeps draining in the background.
        assert!(wait_until(Duration::from_secs(10), || memory.contents() == numbered(200)));
    }

    #[test]
    fn test_write_after_close_is_dropped() {
        let sink = MemorySink::default();
        let writer = writer_for(sink.clone(), 20);
        writer.open().expect("open");
        writer.write("before");
        assert!(writer.close(Duration::from_secs(1)));

        writer.write("after");

        assert_eq!(sink.contents(), "before\n");
        assert_eq!(writer.metrics().rejected(), 1);
        assert_eq!(writer.pending_lines(), 0);
    }

    #[test]
    fn test_second_close_is_noop() {
        let writer = writer_for(MemorySink::default(), 20);
        writer.open().expect("open");
        assert!(writer.close(Duration::from_secs(1)));
        assert!(writer.close(Duration::from_secs(1)));
    }

    #[test]
    fn test_open_twice_fails() {
        let writer = writer_for(MemorySink::default(), 20);
        writer.open().expect("first open");
        let err = writer.open().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidState { .. }));

        assert!(writer.close(Duration::from_secs(1)));
        assert!(writer.open().is_err());
    }

    #[test]
    fn test_close_unopened_flushes_buffer() {
        let sink = MemorySink::default();
        let writer = writer_for(sink.clone(), 20);

        writer.write("early");
        assert!(writer.close(Duration::from_secs(1)));

        assert_eq!(sink.contents(), "early\n");
        assert_eq!(writer.state(), WriterState::Closed);
    }

    #[test]
    fn test_sink_errors_are_counted_not_raised() {
        let writer = writer_for(BrokenSink, 10);
        writer.open().expect("open");

        for i in 0..5 {
            writer.write(&i.to_string());
        }

        assert!(writer.close(Duration::from_secs(1)));
        assert!(writer.metrics().flush_errors() >= 1);
        assert_eq!(writer.metrics().lines_dropped(), 5);
        assert_eq!(writer.metrics().flushes(), 0);
    }

    #[test]
    fn test_queue_capacity_wakes_flush_thread() {
        let sink = MemorySink::default();
        let writer = StreamWriter::new(
            StreamWriterOptions::default()
                .with_output(Output::from_writer(sink.clone()))
                .with_sync_interval(Duration::from_secs(60))
                .with_queue_capacity(5),
        );
        writer.open().expect("open");

        for i in 0..5 {
            writer.write(&i.to_string());
        }

        assert!(wait_until(Duration::from_secs(2), || sink.contents() == numbered(5)));
        assert!(writer.metrics().early_flushes() >= 1);
        assert!(writer.close(Duration::from_secs(1)));
    }

    #[test]
    fn test_drop_drains_open_writer() {
        let sink = MemorySink::default();
        {
            let writer = writer_for(sink.clone(), 60_000);
            writer.open().expect("open");
            writer.write("last words");
        }
        assert_eq!(sink.contents(), "last words\n");
    }

    #[test]
    fn test_name_reflects_output() {
        let writer = writer_for(MemorySink::default(), 20);
        assert_eq!(writer.name(), "stream:custom");
        assert!(format!("{:?}", writer).contains("Unopened"));
    }
}
