//! Writer trait for log output destinations

/// Consumer of formatted log lines.
///
/// `write` receives one line without a trailing newline. It cannot fail:
/// an implementation that hits an I/O error reports it out of band and
/// drops the line, so a broken sink never disturbs the code doing the
/// logging. Writers are shared as `Arc<dyn LogWriter>` and must accept
/// concurrent calls.
pub trait LogWriter: Send + Sync {
    fn write(&self, msg: &str);
    fn name(&self) -> &str;
}
