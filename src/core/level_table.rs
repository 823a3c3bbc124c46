//! Precomputed per-level dispatch
//!
//! Each logger decides once, at construction, which level entry points do
//! real work. A disabled level costs one indirect call into [`discard`] and
//! never reaches the formatter, the clock or the location resolver.

use super::log_level::LogLevel;
use super::logger::Logger;
use std::fmt::{self, Display};
use std::panic::Location;

/// Entry point stored in a [`LevelTable`] slot.
pub(crate) type LogFn = fn(&Logger, LogLevel, &'static Location<'static>, &[&dyn Display]);

fn discard(_: &Logger, _: LogLevel, _: &'static Location<'static>, _: &[&dyn Display]) {}

/// Level to entry-point lookup, stored by value inside each [`Logger`].
#[derive(Clone, Copy)]
pub struct LevelTable {
    min_level: LogLevel,
    debug: LogFn,
    info: LogFn,
    warn: LogFn,
    error: LogFn,
}

impl LevelTable {
    /// Build the table for `min_level`; `Unset` behaves as `Info`.
    pub fn new(min_level: LogLevel) -> Self {
        let min_level = min_level.resolve();
        let slot = |level: LogLevel| -> LogFn {
            if level >= min_level {
                Logger::emit as LogFn
            } else {
                discard as LogFn
            }
        };

        Self {
            min_level,
            debug: slot(LogLevel::Debug),
            info: slot(LogLevel::Info),
            warn: slot(LogLevel::Warn),
            error: slot(LogLevel::Error),
        }
    }

    /// Resolved minimum level this table was built for.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        let level = level.resolve();
        level != LogLevel::Off && level >= self.min_level
    }

    #[inline]
    pub(crate) fn slot(&self, level: LogLevel) -> LogFn {
        match level.resolve() {
            LogLevel::Debug => self.debug,
            LogLevel::Info | LogLevel::Unset => self.info,
            LogLevel::Warn => self.warn,
            LogLevel::Error => self.error,
            LogLevel::Off => discard,
        }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::new(LogLevel::Unset)
    }
}

impl fmt::Debug for LevelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelTable")
            .field("min_level", &self.min_level)
            .field("debug", &self.is_enabled(LogLevel::Debug))
            .field("info", &self.is_enabled(LogLevel::Info))
            .field("warn", &self.is_enabled(LogLevel::Warn))
            .field("error", &self.is_enabled(LogLevel::Error))
            .finish()
    }
}
