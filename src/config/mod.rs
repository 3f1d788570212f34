//! Config discovery, INI parsing, value sanitization and engine settings.
pub mod discovery;
pub mod ini;
pub mod sanitize;
pub mod settings;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use ini::{IniDocument, SkippedLine};
use sanitize::Sanitizer;

/// One config file's entries, ready for the engine.
///
/// Values are already sanitized; keys are kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Display name (usually the file path).
    pub name: String,
    /// Root-section `(key, value)` pairs in file order.
    pub entries: Vec<(String, String)>,
    /// Lines that were not `key = value` pairs.
    pub skipped: Vec<SkippedLine>,
}

impl ConfigSource {
    /// Build a source from already-split entries, sanitizing every value.
    #[must_use]
    pub fn new(name: &str, entries: Vec<(String, String)>, sanitizer: &Sanitizer) -> Self {
        Self {
            name: name.to_string(),
            entries: entries
                .into_iter()
                .map(|(k, v)| {
                    let v = sanitizer.sanitize(&v);
                    (k, v)
                })
                .collect(),
            skipped: Vec::new(),
        }
    }

    /// Parse INI text into a source. Malformed lines end up in
    /// [`skipped`](Self::skipped).
    #[must_use]
    pub fn from_ini_str(name: &str, content: &str, sanitizer: &Sanitizer) -> Self {
        Self::from_document(name, ini::parse_kv_sections_from_str(content), sanitizer)
    }

    /// Read and parse an INI file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::InvalidSyntax`] if it is not valid UTF-8.
    pub fn read(path: &Path, sanitizer: &Sanitizer) -> Result<Self, ConfigError> {
        let doc = ini::parse_kv_sections(path)?;
        Ok(Self::from_document(&path.display().to_string(), doc, sanitizer))
    }

    fn from_document(name: &str, doc: IniDocument, sanitizer: &Sanitizer) -> Self {
        Self {
            skipped: doc.skipped,
            ..Self::new(name, ini::root_entries(doc.sections), sanitizer)
        }
    }
}

/// Everything found in a data directory.
#[derive(Debug)]
pub struct Config {
    /// The scanned data directory.
    pub data_dir: PathBuf,
    /// Whether a debug toggle file is present.
    pub debug: bool,
    /// One entry per discovered file; failures are kept so they can be counted.
    pub sources: Vec<Result<ConfigSource, ConfigError>>,
}

impl Config {
    /// Discover and read every config file under `data_dir`.
    ///
    /// Unreadable files do not fail the load; they are returned as `Err`
    /// entries in [`sources`](Self::sources).
    #[must_use]
    pub fn load(data_dir: &Path, sanitizer: &Sanitizer) -> Self {
        let found = discovery::discover(data_dir);
        let sources = found
            .files
            .iter()
            .map(|path| ConfigSource::read(path, sanitizer))
            .collect();
        Self {
            data_dir: data_dir.to_path_buf(),
            debug: found.debug,
            sources,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::fs;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new().expect("rules compile")
    }

    #[test]
    fn source_values_are_sanitized() {
        let src = ConfigSource::from_ini_str(
            "a.ini",
            "formlist = FL01 | 0x00000123 , Apple\n",
            &sanitizer(),
        );
        assert_eq!(
            src.entries,
            vec![("formlist".to_string(), "FL01|0x123,Apple".to_string())]
        );
    }

    #[test]
    fn keys_keep_their_case() {
        let src = ConfigSource::from_ini_str("a.ini", "FormList = A|B\n", &sanitizer());
        assert_eq!(src.entries[0].0, "FormList");
    }

    #[test]
    fn load_keeps_unreadable_sources_as_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let flm = tmp.path().join("FLM");
        fs::create_dir_all(&flm).unwrap();
        fs::write(flm.join("good.ini"), "alias = A|B\n").unwrap();
        fs::write(flm.join("bad.ini"), b"alias = \xff\xfe|B\n").unwrap();

        let config = Config::load(tmp.path(), &sanitizer());
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources.iter().filter(|s| s.is_err()).count(), 1);
        assert!(!config.debug);
    }

    #[test]
    fn malformed_lines_do_not_fail_the_source() {
        let tmp = tempfile::tempdir().unwrap();
        let flm = tmp.path().join("FLM");
        fs::create_dir_all(&flm).unwrap();
        fs::write(flm.join("mixed.ini"), "alias = A|B\nnot a pair\nalias = C|D\n").unwrap();

        let config = Config::load(tmp.path(), &sanitizer());
        let src = config.sources[0].as_ref().expect("source loads");
        assert_eq!(src.entries.len(), 2);
        assert_eq!(src.skipped.len(), 1);
        assert_eq!(src.skipped[0].line, 2);
    }
}
