//! Structured logger with indentation tracking.
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::{Log, header_line, indent_line};
use super::utils::log_file_path;

/// Implement the message methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that emits through [`tracing`].
///
/// All messages are written to a persistent log file at
/// `$XDG_CACHE_HOME/flm/<command>.log` (default `~/.cache/flm/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
    level: AtomicUsize,
}

impl Logger {
    /// Create a new logger.
    ///
    /// The log file itself is created by
    /// [`init_subscriber`](super::subscriber::init_subscriber); this
    /// constructor only remembers its path.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: log_file_path(command),
            level: AtomicUsize::new(0),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    fn prefix(&self, msg: &str) -> String {
        indent_line(self.level.load(Ordering::Relaxed), msg)
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{}", self.prefix(msg));
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{}", self.prefix(msg));
    }

    /// Log a section header.
    pub fn stage(&self, title: &str) {
        tracing::info!(target: "flm::stage", "{}", self.prefix(&header_line(title)));
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{}", self.prefix(msg));
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file via the [`FileLayer`](super::subscriber::FileLayer)).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{}", self.prefix(msg));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

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
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "log file should be created by the file layer");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(
            contents.contains(&marker),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn warn_written_with_tag() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("warn-marker-{}", std::process::id());
        log.warn(&marker);
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[warn]"), "warn tag should appear");
        assert!(contents.contains(&marker));
    }

    #[test]
    fn error_written_with_tag() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("error-marker-{}", std::process::id());
        log.error(&marker);
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[error]"), "error tag should appear");
        assert!(contents.contains(&marker));
    }

    #[test]
    fn stage_written_as_dashed_header() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Looking for configs");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(
            contents.contains("----Looking for configs----"),
            "header should be centred between dashes"
        );
    }

    #[test]
    fn indentation_prefixes_messages() {
        let (log, _tmp, _guard) = isolated_logger();
        {
            let _indent = indented(&log);
            log.info("nested-line");
        }
        log.info("top-line");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("    nested-line"));
        assert!(contents.contains("] top-line"), "guard should dedent on drop");
    }

    #[test]
    fn dedent_saturates_at_zero() {
        let (log, _tmp, _guard) = isolated_logger();
        log.dedent();
        log.dedent();
        assert_eq!(log.level.load(Ordering::Relaxed), 0);
    }
}
