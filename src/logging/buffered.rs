//! Buffered logger that captures rendered lines in memory.
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::{Log, header_line, indent_line};

/// Severity of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Section header.
    Stage,
    /// Informational line.
    Info,
    /// Debug line.
    Debug,
    /// Warning line.
    Warn,
    /// Error line.
    Error,
}

/// A single captured entry, already indented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: Level,
    /// Rendered text including indentation.
    pub text: String,
}

impl LogEntry {
    /// Replay this entry to the console and log file via tracing.
    fn replay(&self) {
        let msg = &self.text;
        match self.level {
            Level::Stage => tracing::info!(target: "flm::stage", "{msg}"),
            Level::Info => tracing::info!("{msg}"),
            Level::Debug => tracing::debug!("{msg}"),
            Level::Warn => tracing::warn!("{msg}"),
            Level::Error => tracing::error!("{msg}"),
        }
    }
}

/// Implement the message methods of [`Log`] by buffering each message into
/// `self.entries` at the corresponding [`Level`].
macro_rules! buffer_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push(Level::$variant, msg);
            }
        )+
    };
}

/// Logger that keeps every line in memory.
///
/// Lets a command run the engine silently and decide afterwards whether the
/// output is shown ([`flush`](Self::flush)) or only inspected.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
    level: AtomicUsize,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        let text = indent_line(self.level.load(Ordering::Relaxed), msg);
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(LogEntry { level, text });
        }
    }

    /// Snapshot of every captured entry.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Captured text lines, without levels.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.text).collect()
    }

    /// Whether any captured line at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.level == level && e.text.contains(needle))
    }

    /// Replay all buffered entries through [`tracing`] and clear the buffer.
    pub fn flush(&self) {
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            entry.replay();
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        info  => Info,
        debug => Debug,
        warn  => Warn,
        error => Error,
    }

    fn stage(&self, title: &str) {
        self.push(Level::Stage, &header_line(title));
    }

    fn indent(&self) {
        self.level.fetch_add(1, Ordering::Relaxed);
    }

    fn dedent(&self) {
        let _ = self
            .level
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |l| {
                Some(l.saturating_sub(1))
            });
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{indented, isolated_logger};
    use std::fs;

    #[test]
    fn buffered_log_preserves_entry_order() {
        let buf = BufferedLog::new();
        buf.stage("one");
        buf.info("two");
        buf.warn("three");
        let entries = buf.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, Level::Stage);
        assert_eq!(entries[1].text, "two");
        assert_eq!(entries[2].level, Level::Warn);
    }

    #[test]
    fn buffered_log_applies_indentation() {
        let buf = BufferedLog::new();
        {
            let _i = indented(&buf);
            buf.info("inner");
        }
        buf.info("outer");
        assert_eq!(buf.lines(), vec!["    inner", "outer"]);
    }

    #[test]
    fn contains_matches_level_and_text() {
        let buf = BufferedLog::new();
        buf.error("Unknown key foo!");
        assert!(buf.contains(Level::Error, "Unknown key"));
        assert!(!buf.contains(Level::Warn, "Unknown key"));
    }

    #[test]
    fn flush_replays_to_file_and_clears() {
        let (log, _tmp, _guard) = isolated_logger();
        let buf = BufferedLog::new();
        let marker = format!("buf-marker-{}", std::process::id());
        buf.info(&marker);
        let path = log.log_path().expect("log path");
        let before = fs::read_to_string(path).unwrap();
        assert!(!before.contains(&marker), "nothing written before flush");
        buf.flush();
        let after = fs::read_to_string(path).unwrap();
        assert!(after.contains(&marker), "buffered output appears after flush");
        assert!(buf.entries().is_empty());
    }
}
