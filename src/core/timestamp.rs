//! Timestamp rendering for the `%timestamp%` placeholder
//!
//! A [`Clock`] pairs a chrono strftime pattern with a time zone. Both are
//! validated once when the clock is built, so rendering can never fail.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-width `YYYY-MM-DD HH:MM:SS.mmm`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Time zone used to render timestamps
///
/// # Examples
///
/// ```
/// use stream_logger::core::TimeZoneSetting;
///
/// assert_eq!("utc".parse::<TimeZoneSetting>().unwrap(), TimeZoneSetting::Utc);
/// assert!("+09:00".parse::<TimeZoneSetting>().is_ok());
/// assert!("Mars/Olympus".parse::<TimeZoneSetting>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZoneSetting {
    /// The host's local time zone
    #[default]
    Local,
    Utc,
    /// A fixed offset from UTC, e.g. `+09:00`
    Fixed(FixedOffset),
}

impl TimeZoneSetting {
    fn parse_offset(s: &str) -> Option<FixedOffset> {
        let (sign, rest) = match s.as_bytes().first()? {
            b'+' => (1, &s[1..]),
            b'-' => (-1, &s[1..]),
            _ => return None,
        };
        if !rest.is_ascii() {
            return None;
        }
        // "HHMM" or "HH:MM"
        let (hh, mm) = match rest.len() {
            4 => (&rest[..2], &rest[2..]),
            5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
            _ => return None,
        };
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: i32 = hh.parse().ok()?;
        let minutes: i32 = mm.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }
}

impl FromStr for TimeZoneSetting {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "local" => Ok(TimeZoneSetting::Local),
            "utc" | "z" => Ok(TimeZoneSetting::Utc),
            _ => Self::parse_offset(trimmed)
                .map(TimeZoneSetting::Fixed)
                .ok_or_else(|| LoggerError::config("Clock", format!("invalid time zone '{}'", s))),
        }
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSetting::Local => f.write_str("local"),
            TimeZoneSetting::Utc => f.write_str("utc"),
            TimeZoneSetting::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl TryFrom<String> for TimeZoneSetting {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeZoneSetting> for String {
    fn from(value: TimeZoneSetting) -> Self {
        value.to_string()
    }
}

/// Renders the current time with a validated pattern and zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    format: String,
    zone: TimeZoneSetting,
}

impl Clock {
    /// Create a clock; an empty `format` means [`DEFAULT_TIME_FORMAT`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `format` contains an unknown or
    /// incomplete strftime specifier.
    pub fn new(format: impl Into<String>, zone: TimeZoneSetting) -> Result<Self> {
        let mut format = format.into();
        if format.is_empty() {
            format = DEFAULT_TIME_FORMAT.to_string();
        }

        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "Clock",
                format!("invalid time format '{}'", format),
            ));
        }

        Ok(Self { format, zone })
    }

    pub fn format_str(&self) -> &str {
        &self.format
    }

    pub fn zone(&self) -> TimeZoneSetting {
        self.zone
    }

    /// Render the current instant.
    pub fn now(&self) -> String {
        self.format_at(Utc::now())
    }

    /// Render `instant` in the configured zone.
    pub fn format_at(&self, instant: DateTime<Utc>) -> String {
        match self.zone {
            TimeZoneSetting::Local => instant.with_timezone(&Local).format(&self.format).to_string(),
            TimeZoneSetting::Utc => instant.format(&self.format).to_string(),
            TimeZoneSetting::Fixed(offset) => {
                instant.with_timezone(&offset).format(&self.format).to_string()
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIME_FORMAT.to_string(),
            zone: TimeZoneSetting::Local,
        }
    }
}
