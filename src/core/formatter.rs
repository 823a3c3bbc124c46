//! Template-based message formatting
//!
//! A template is plain text with up to four placeholders:
//! `%timestamp%`, `%level%`, `%pkg%` (caller location) and `%args%`.
//! Only the first occurrence of each placeholder is substituted; anything
//! else, including repeated placeholders, is copied verbatim.

use std::fmt::{self, Display, Write as _};

#[cfg(feature = "console")]
use super::log_level::LogLevel;
#[cfg(feature = "console")]
use colored::Colorize;

/// Template used when an empty template is supplied.
pub const DEFAULT_TEMPLATE: &str = "%timestamp%  %level% --- [%pkg%] %args%";

/// Turns the pieces of a log call into the line handed to writers.
///
/// Implementations must be pure: the same inputs always give the same output
/// and no shared state is touched, so one formatter can serve every thread.
pub trait LogFormatter: Send + Sync {
    fn format(&self, timestamp: &str, level: &str, location: &str, args: &[&dyn Display])
        -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Timestamp,
    Level,
    Location,
    Args,
}

impl Token {
    const ALL: [Token; 4] = [Token::Timestamp, Token::Level, Token::Location, Token::Args];

    fn placeholder(self) -> &'static str {
        match self {
            Token::Timestamp => "%timestamp%",
            Token::Level => "%level%",
            Token::Location => "%pkg%",
            Token::Args => "%args%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// Formatter driven by a placeholder template.
///
/// The template is split into literal and placeholder segments once, at
/// construction. Formatting is a single pass over those segments, so a
/// substituted value that itself contains `%level%` is never expanded.
///
/// Placeholders are matched by position in the template, not replaced one
/// token kind after another. When two placeholders overlap on a shared `%`
/// the one starting first wins: `"%args%level%"` renders the arguments
/// followed by the literal `level%`, and the level is not substituted.
///
/// # Example
///
/// ```
/// use stream_logger::core::{LogFormatter, SimpleFormatter};
///
/// let formatter = SimpleFormatter::new("%level%: %args%");
/// let line = formatter.format("2022-01-01 00:00:00.000", "WARN", "src/main.rs:3", &[&"disk ", &91, &"%"]);
/// assert_eq!(line, "WARN: disk 91%");
/// ```
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    template: String,
    segments: Vec<Segment>,
    #[cfg(feature = "console")]
    colored_level: bool,
}

impl SimpleFormatter {
    /// Build a formatter for `template`; an empty template means [`DEFAULT_TEMPLATE`].
    pub fn new(template: impl Into<String>) -> Self {
        let mut template = template.into();
        if template.is_empty() {
            template = DEFAULT_TEMPLATE.to_string();
        }
        let segments = Self::parse(&template);

        Self {
            template,
            segments,
            #[cfg(feature = "console")]
            colored_level: false,
        }
    }

    /// Color the level value with the level's terminal color.
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colored_level(mut self, colored_level: bool) -> Self {
        self.colored_level = colored_level;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn parse(template: &str) -> Vec<Segment> {
        let mut found: Vec<(usize, Token)> = Token::ALL
            .iter()
            .filter_map(|token| template.find(token.placeholder()).map(|pos| (pos, *token)))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);

        let mut segments = Vec::with_capacity(found.len() * 2 + 1);
        let mut cursor = 0;
        for (pos, token) in found {
            // Placeholders share their `%` delimiters, so "%level%args%" holds
            // an overlapping "%args%"; the earlier one wins.
            if pos < cursor {
                continue;
            }
            if pos > cursor {
                segments.push(Segment::Literal(template[cursor..pos].to_string()));
            }
            segments.push(Segment::Token(token));
            cursor = pos + token.placeholder().len();
        }
        if cursor < template.len() {
            segments.push(Segment::Literal(template[cursor..].to_string()));
        }

        segments
    }

    fn write_level(&self, out: &mut String, level: &str) {
        #[cfg(feature = "console")]
        if self.colored_level {
            if let Ok(parsed) = level.parse::<LogLevel>() {
                let _ = write!(out, "{}", level.color(parsed.color_code()));
                return;
            }
        }
        out.push_str(level);
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl LogFormatter for SimpleFormatter {
    fn format(
        &self,
        timestamp: &str,
        level: &str,
        location: &str,
        args: &[&dyn Display],
    ) -> String {
        let mut out = String::with_capacity(self.template.len() + timestamp.len() + 64);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(Token::Timestamp) => out.push_str(timestamp),
                Segment::Token(Token::Level) => self.write_level(&mut out, level),
                Segment::Token(Token::Location) => out.push_str(location),
                Segment::Token(Token::Args) => {
                    let _ = write_args(&mut out, args);
                }
            }
        }

        out
    }
}

/// Concatenate every argument's `Display` output with no separator.
pub(crate) fn write_args(out: &mut String, args: &[&dyn Display]) -> fmt::Result {
    for arg in args {
        write!(out, "{}", arg)?;
    }
    Ok(())
}
