//! Main logger implementation

use super::{
    config::LoggerConfig,
    error::{LoggerError, Result},
    formatter::{LogFormatter, SimpleFormatter},
    level_table::LevelTable,
    location::{LocationResolver, NoLocation, SourceLocation},
    log_level::LogLevel,
    timestamp::{Clock, TimeZoneSetting, DEFAULT_TIME_FORMAT},
    writer::LogWriter,
};
use parking_lot::RwLock;
use std::fmt::{self, Display};
use std::panic::Location;
use std::sync::Arc;

/// Leveled logging entry point.
///
/// A logger formats each enabled call once and hands the line to every
/// registered writer. The minimum level is fixed at construction; calls
/// below it return without touching the formatter, the clock or the
/// location resolver.
///
/// # Example
///
/// ```
/// use stream_logger::prelude::*;
/// use std::sync::Arc;
///
/// let writer = Arc::new(DirectWriter::new(Output::stdout()));
/// let logger = Logger::builder()
///     .formatter(SimpleFormatter::default())
///     .min_level(LogLevel::Debug)
///     .writer(writer)
///     .build()?;
///
/// logger.info(&[&"listening on port ", &8080]);
/// logger.debugf(format_args!("{} workers ready", 4));
/// # Ok::<(), stream_logger::LoggerError>(())
/// ```
pub struct Logger {
    writers: RwLock<Vec<Arc<dyn LogWriter>>>,
    formatter: Box<dyn LogFormatter>,
    clock: Clock,
    locator: Box<dyn LocationResolver>,
    table: LevelTable,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Register more writers; they receive every line logged from now on.
    pub fn add_writers<I>(&self, writers: I)
    where
        I: IntoIterator<Item = Arc<dyn LogWriter>>,
    {
        self.writers.write().extend(writers);
    }

    pub fn writer_count(&self) -> usize {
        self.writers.read().len()
    }

    /// Resolved minimum level (never `Unset`).
    pub fn min_level(&self) -> LogLevel {
        self.table.min_level()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.table.is_enabled(level)
    }

    /// Log `args` concatenated, at `level`.
    #[track_caller]
    #[inline]
    pub fn log(&self, level: LogLevel, args: &[&dyn Display]) {
        let caller = Location::caller();
        (self.table.slot(level))(self, level, caller, args);
    }

    /// Log pre-built format arguments at `level`.
    ///
    /// The arguments are only rendered when `level` is enabled.
    #[track_caller]
    #[inline]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log(level, &[&args]);
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Debug, args);
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Info, args);
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Warn, args);
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Error, args);
    }

    #[track_caller]
    #[inline]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Debug, args);
    }

    #[track_caller]
    #[inline]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Info, args);
    }

    #[track_caller]
    #[inline]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Warn, args);
    }

    #[track_caller]
    #[inline]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Error, args);
    }

    /// Active slot of the level table: format once, fan out to every writer.
    pub(crate) fn emit(
        &self,
        level: LogLevel,
        caller: &'static Location<'static>,
        args: &[&dyn Display],
    ) {
        let location = self.locator.resolve(caller);
        let message = self
            .formatter
            .format(&self.clock.now(), level.to_str(), &location, args);

        for writer in self.writers.read().iter() {
            writer.write(&message);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let writers: Vec<String> = self
            .writers
            .read()
            .iter()
            .map(|w| w.name().to_string())
            .collect();
        f.debug_struct("Logger")
            .field("writers", &writers)
            .field("clock", &self.clock)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// A formatter is required; everything else has a default. Configuration
/// problems (bad time format, missing formatter) are reported by `build`.
///
/// # Example
/// ```
/// use stream_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .formatter(SimpleFormatter::new("%level% %args%"))
///     .min_level(LogLevel::Warn)
///     .time_zone(TimeZoneSetting::Utc)
///     .build()
///     .expect("valid configuration");
///
/// assert!(!logger.is_enabled(LogLevel::Info));
/// ```
pub struct LoggerBuilder {
    writers: Vec<Arc<dyn LogWriter>>,
    formatter: Option<Box<dyn LogFormatter>>,
    time_format: String,
    time_zone: TimeZoneSetting,
    min_level: LogLevel,
    locator: Box<dyn LocationResolver>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
            formatter: None,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_zone: TimeZoneSetting::default(),
            min_level: LogLevel::Unset,
            locator: Box::new(SourceLocation),
        }
    }

    /// Start from a deserialized configuration.
    ///
    /// Installs a [`SimpleFormatter`] for the configured template. Writers
    /// are not part of the configuration and still need to be added.
    pub fn from_config(config: &LoggerConfig) -> Self {
        let formatter = SimpleFormatter::new(config.template.clone());
        #[cfg(feature = "console")]
        let formatter = formatter.with_colored_level(config.colored_level);

        let builder = Self::new()
            .formatter(formatter)
            .min_level(config.min_level)
            .time_format(config.time_format.clone())
            .time_zone(config.time_zone);

        if config.include_location {
            builder
        } else {
            builder.location_resolver(NoLocation)
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: LogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writers.push(writer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn writers<I>(mut self, writers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn LogWriter>>,
    {
        self.writers.extend(writers);
        self
    }

    /// Set the chrono strftime pattern for `%timestamp%`
    #[must_use = "builder methods return a new value"]
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_zone(mut self, zone: TimeZoneSetting) -> Self {
        self.time_zone = zone;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Replace how call sites are rendered for `%pkg%`
    #[must_use = "builder methods return a new value"]
    pub fn location_resolver<R: LocationResolver + 'static>(mut self, resolver: R) -> Self {
        self.locator = Box::new(resolver);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if no formatter was set or the time format is
    /// not a valid strftime pattern.
    pub fn build(self) -> Result<Logger> {
        let formatter = self
            .formatter
            .ok_or_else(|| LoggerError::config("Logger", "a formatter is required"))?;
        let clock = Clock::new(self.time_format, self.time_zone)?;

        Ok(Logger {
            writers: RwLock::new(self.writers),
            formatter,
            clock,
            locator: self.locator,
            table: LevelTable::new(self.min_level),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingWriter {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingWriter {
        fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }
    }

    impl LogWriter for RecordingWriter {
        fn write(&self, msg: &str) {
            self.lines.lock().push(msg.to_string());
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct PanickingFormatter;

    impl LogFormatter for PanickingFormatter {
        fn format(&self, _: &str, _: &str, _: &str, _: &[&dyn Display]) -> String {
            panic!("formatter must not run for disabled levels");
        }
    }

    fn logger_with(
        min_level: LogLevel,
        writer: Arc<RecordingWriter>,
    ) -> Logger {
        Logger::builder()
            .formatter(SimpleFormatter::new("%level% %args%"))
            .min_level(min_level)
            .writer(writer)
            .build()
            .expect("valid logger")
    }

    #[test]
    fn test_builder_requires_formatter() {
        let err = Logger::builder().build().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_builder_rejects_bad_time_format() {
        let err = Logger::builder()
            .formatter(SimpleFormatter::default())
            .time_format("%Y-%m-%d %Q")
            .build()
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_default_min_level_is_info() {
        let logger = Logger::builder()
            .formatter(SimpleFormatter::default())
            .build()
            .expect("valid logger");
        assert_eq!(logger.min_level(), LogLevel::Info);
        assert!(!logger.is_enabled(LogLevel::Debug));
    }

    #[test]
    fn test_levels_below_minimum_are_dropped() {
        let writer = Arc::new(RecordingWriter::default());
        let logger = logger_with(LogLevel::Warn, Arc::clone(&writer));

        logger.debug(&[&"d"]);
        logger.info(&[&"i"]);
        logger.warn(&[&"w"]);
        logger.error(&[&"e"]);

        assert_eq!(writer.lines(), vec!["WARN w", "ERROR e"]);
    }

    #[test]
    fn test_formatted_variants() {
        let writer = Arc::new(RecordingWriter::default());
        let logger = logger_with(LogLevel::Debug, Arc::clone(&writer));

        logger.debugf(format_args!("{}+{}", 1, 2));
        logger.infof(format_args!("{:>4}", 7));
        logger.warnf(format_args!("{:?}", "q"));
        logger.errorf(format_args!("{:.2}", 0.5));

        assert_eq!(
            writer.lines(),
            vec!["DEBUG 1+2", "INFO    7", "WARN \"q\"", "ERROR 0.50"]
        );
    }

    #[test]
    fn test_disabled_levels_skip_formatter_and_location() {
        let resolved = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resolved);
        let writer = Arc::new(RecordingWriter::default());

        let logger = Logger::builder()
            .formatter(PanickingFormatter)
            .min_level(LogLevel::Off)
            .location_resolver(move |_: &'static Location<'static>| {
                counter.fetch_add(1, Ordering::SeqCst);
                String::new()
            })
            .writer(writer.clone())
            .build()
            .expect("valid logger");

        logger.debug(&[&"x"]);
        logger.info(&[&"x"]);
        logger.warn(&[&"x"]);
        logger.error(&[&"x"]);
        logger.errorf(format_args!("{}", "x"));
        logger.log(LogLevel::Off, &[&"x"]);

        assert_eq!(resolved.load(Ordering::SeqCst), 0);
        assert!(writer.lines().is_empty());
    }

    #[test]
    fn test_location_is_call_site() {
        let writer = Arc::new(RecordingWriter::default());
        let logger = Logger::builder()
            .formatter(SimpleFormatter::new("[%pkg%] %args%"))
            .writer(writer.clone())
            .build()
            .expect("valid logger");

        let line = line!() + 1;
        logger.info(&[&"here"]);

        assert_eq!(writer.lines(), vec![format!("[core/logger.rs:{}] here", line)]);
    }

    #[test]
    fn test_no_writers_is_silent() {
        let logger = Logger::builder()
            .formatter(SimpleFormatter::default())
            .min_level(LogLevel::Debug)
            .build()
            .expect("valid logger");

        assert_eq!(logger.writer_count(), 0);
        logger.debug(&[&"nobody listens"]);
        logger.errorf(format_args!("{}", 1));
    }

    #[test]
    fn test_add_writers_appends() {
        let first = Arc::new(RecordingWriter::default());
        let second = Arc::new(RecordingWriter::default());
        let logger = logger_with(LogLevel::Info, Arc::clone(&first));

        logger.info(&[&"one"]);
        logger.add_writers([second.clone() as Arc<dyn LogWriter>]);
        logger.info(&[&"two"]);

        assert_eq!(logger.writer_count(), 2);
        assert_eq!(first.lines(), vec!["INFO one", "INFO two"]);
        assert_eq!(second.lines(), vec!["INFO two"]);
    }

    #[test]
    fn test_independent_loggers_keep_their_levels() {
        let writer = Arc::new(RecordingWriter::default());
        let quiet = logger_with(LogLevel::Error, Arc::clone(&writer));
        let chatty = logger_with(LogLevel::Debug, Arc::clone(&writer));

        quiet.debug(&[&"q"]);
        chatty.debug(&[&"c"]);

        assert_eq!(writer.lines(), vec!["DEBUG c"]);
    }

    #[test]
    fn test_from_config() {
        let config = LoggerConfig {
            min_level: LogLevel::Warn,
            template: "%pkg%|%level%|%args%".to_string(),
            include_location: false,
            ..LoggerConfig::default()
        };
        let writer = Arc::new(RecordingWriter::default());
        let logger = LoggerBuilder::from_config(&config)
            .writer(writer.clone())
            .build()
            .expect("valid logger");

        logger.info(&[&"hidden"]);
        logger.warn(&[&"shown"]);

        assert_eq!(writer.lines(), vec!["|WARN|shown"]);
    }
}
