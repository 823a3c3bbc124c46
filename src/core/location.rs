//! Caller location resolution for the `%pkg%` placeholder
//!
//! Log entry points are `#[track_caller]`, so the logger always has the
//! user's call site as a `&'static Location`. Turning it into display text
//! is left to a [`LocationResolver`], which only runs for enabled levels.

use std::panic::Location;

pub trait LocationResolver: Send + Sync {
    fn resolve(&self, caller: &'static Location<'static>) -> String;
}

/// `parent/file.rs:line`, keeping the last two path components.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLocation;

impl LocationResolver for SourceLocation {
    fn resolve(&self, caller: &'static Location<'static>) -> String {
        format!("{}:{}", short_path(caller.file()), caller.line())
    }
}

/// Resolves every call site to an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationResolver for NoLocation {
    fn resolve(&self, _caller: &'static Location<'static>) -> String {
        String::new()
    }
}

impl<F> LocationResolver for F
where
    F: Fn(&'static Location<'static>) -> String + Send + Sync,
{
    fn resolve(&self, caller: &'static Location<'static>) -> String {
        self(caller)
    }
}

fn short_path(file: &str) -> &str {
    let mut separators = file.rmatch_indices(['/', '\\']);
    separators.next();
    match separators.next() {
        Some((idx, _)) => &file[idx + 1..],
        None => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path() {
        assert_eq!(short_path("/home/dev/stream_logger/src/core/logger.rs"), "core/logger.rs");
        assert_eq!(short_path("tests\\integration_tests.rs"), "tests\\integration_tests.rs");
        assert_eq!(short_path("C:\\work\\tests\\stress.rs"), "tests\\stress.rs");
        assert_eq!(short_path("lib.rs"), "lib.rs");
        assert_eq!(short_path("src/lib.rs"), "src/lib.rs");
    }

    #[test]
    fn test_source_location_uses_caller_line() {
        let caller = Location::caller();
        let resolved = SourceLocation.resolve(caller);
        assert_eq!(resolved, format!("core/location.rs:{}", caller.line()));
    }

    #[test]
    fn test_no_location() {
        assert_eq!(NoLocation.resolve(Location::caller()), "");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |caller: &'static Location<'static>| format!("line {}", caller.line());
        assert!(resolver.resolve(Location::caller()).starts_with("line "));
    }
}
