//! Core logging types: the [`Log`] trait and indentation guard.

/// Width of a rendered section header.
pub const HEADER_WIDTH: usize = 47;

/// Spaces added per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (direct output) and
/// [`BufferedLog`](super::buffered::BufferedLog) (captured output) implement
/// this trait, so engine code can log without knowing where lines end up.
///
/// Message lines are prefixed with the current indentation. Headers are
/// centred in a fixed-width dashed rule.
pub trait Log: Send + Sync {
    /// Log a section header. An empty title renders a plain rule.
    fn stage(&self, title: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Increase indentation of subsequent lines by one level.
    fn indent(&self);
    /// Decrease indentation by one level, saturating at zero.
    fn dedent(&self);
}

/// Render a header line: `title` centred in a rule of dashes.
///
/// # Examples
///
/// ```
/// use flm_engine::logging::header_line;
///
/// assert_eq!(header_line("").len(), 47);
/// assert!(header_line("SUMMARY").contains("-SUMMARY-"));
/// ```
#[must_use]
pub fn header_line(title: &str) -> String {
    format!("{title:-^HEADER_WIDTH$}")
}

/// Prefix `msg` with `level` indentation steps.
pub(super) fn indent_line(level: usize, msg: &str) -> String {
    format!("{:width$}{msg}", "", width = level * INDENT_WIDTH)
}

/// Scope guard returned by [`indented`]; dedents when dropped.
#[derive(Debug)]
pub struct IndentGuard<'a> {
    log: &'a dyn Log,
}

impl std::fmt::Debug for dyn Log + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn Log>")
    }
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.log.dedent();
    }
}

/// Indent `log` until the returned guard is dropped.
#[must_use = "indentation ends when the guard is dropped"]
pub fn indented(log: &dyn Log) -> IndentGuard<'_> {
    log.indent();
    IndentGuard { log }
}
