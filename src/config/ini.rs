//! Multi-key INI parsing.
//!
//! Config files are flat lists of `key = value` lines. Keys may repeat and
//! order matters, so sections are kept as ordered `(key, value)` vectors
//! rather than maps. Entries before the first `[header]` belong to the root
//! section, whose header is the empty string. Lines that fit none of these
//! shapes are set aside as [`SkippedLine`]s; the rest of the file is kept.
use std::path::Path;

use crate::error::ConfigError;

/// A key-value section of an INI file.
///
/// # Examples
///
/// ```
/// use flm_engine::config::ini::KvSection;
///
/// let section = KvSection {
///     header: String::new(),
///     entries: vec![("alias".to_string(), "Food|FoodList".to_string())],
/// };
/// assert!(section.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvSection {
    /// The raw section header; empty for the root section.
    pub header: String,
    /// Key-value entries within this section, in file order.
    pub entries: Vec<(String, String)>,
}

impl KvSection {
    /// Whether this is the implicit section before any header.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.header.is_empty()
    }
}

/// A line that is neither a comment, a header nor a `key = value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// One-based line number.
    pub line: usize,
    /// The trimmed line text.
    pub text: String,
}

/// Parsed sections plus the lines that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    /// Sections in file order.
    pub sections: Vec<KvSection>,
    /// Malformed lines, in file order.
    pub skipped: Vec<SkippedLine>,
}

/// Parse an INI file into key-value sections.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it is not valid UTF-8.
pub fn parse_kv_sections(path: &Path) -> Result<IniDocument, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|err| {
        let valid = err.as_bytes().get(..err.utf8_error().valid_up_to()).unwrap_or_default();
        ConfigError::InvalidSyntax {
            file: path.display().to_string(),
            line: valid.split(|&b| b == b'\n').count(),
            message: "file is not valid UTF-8".to_string(),
        }
    })?;
    Ok(parse_kv_sections_from_str(&content))
}

/// Parse key-value INI content from a string.
///
/// Full-line comments start with `;` or `#`. Values are kept verbatim apart
/// from surrounding whitespace; `#` inside a value is data, not a comment.
///
/// # Examples
///
/// ```
/// use flm_engine::config::ini::parse_kv_sections_from_str;
///
/// let doc = parse_kv_sections_from_str(
///     "; comment\nformlist = FL01|#Group1\nstray text\nformlist = FL02|Apple\n",
/// );
/// assert_eq!(doc.sections.len(), 1);
/// assert_eq!(doc.sections[0].entries[0].1, "FL01|#Group1");
/// assert_eq!(doc.sections[0].entries.len(), 2);
/// assert_eq!(doc.skipped[0].line, 3);
/// ```
#[must_use]
pub fn parse_kv_sections_from_str(content: &str) -> IniDocument {
    let mut sections = Vec::new();
    let mut skipped = Vec::new();
    let mut current = KvSection {
        header: String::new(),
        entries: Vec::new(),
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }

        if let Some(header) = parse_raw_header(trimmed) {
            let finished = std::mem::replace(
                &mut current,
                KvSection {
                    header,
                    entries: Vec::new(),
                },
            );
            if finished.is_root() && finished.entries.is_empty() {
                continue;
            }
            sections.push(finished);
        } else if let Some((key, value)) = parse_kv_line(trimmed) {
            current.entries.push((key, value));
        } else {
            skipped.push(SkippedLine {
                line: line_num + 1,
                text: trimmed.to_string(),
            });
        }
    }

    if !(current.is_root() && current.entries.is_empty()) {
        sections.push(current);
    }

    IniDocument { sections, skipped }
}

/// Entries of the root section, or an empty list.
#[must_use]
pub fn root_entries(sections: Vec<KvSection>) -> Vec<(String, String)> {
    sections
        .into_iter()
        .find(KvSection::is_root)
        .map(|s| s.entries)
        .unwrap_or_default()
}

/// Parse a `[header]` line preserving original case.
fn parse_raw_header(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Parse a `key = value` line.
fn parse_kv_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_entries() {
        let content = "alias = Food|FoodList\ngroup = Fruit|Apple,Pear\n";
        let sections = parse_kv_sections_from_str(content).sections;
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_root());
        assert_eq!(
            sections[0].entries,
            vec![
                ("alias".to_string(), "Food|FoodList".to_string()),
                ("group".to_string(), "Fruit|Apple,Pear".to_string()),
            ]
        );
    }

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let content = "formlist = A|1\nformlist = B|2\nformlist = C|3\n";
        let entries = root_entries(parse_kv_sections_from_str(content).sections);
        let values: Vec<&str> = entries.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["A|1", "B|2", "C|3"]);
    }

    #[test]
    fn hash_inside_value_is_data() {
        let content = "formlist = FL01|0x123, #Group1\n";
        let entries = root_entries(parse_kv_sections_from_str(content).sections);
        assert_eq!(entries[0].1, "FL01|0x123, #Group1");
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let content = "; header comment\n\n# another\nplant = Seed|Plant\n";
        let entries = root_entries(parse_kv_sections_from_str(content).sections);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn named_sections_are_separate_from_root() {
        let content = "alias = A|B\n[Extra]\nkey = value\n";
        let sections = parse_kv_sections_from_str(content).sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].header, "Extra");
        assert_eq!(root_entries(sections).len(), 1);
    }

    #[test]
    fn header_first_has_no_root() {
        let content = "[Only]\nkey = value\n";
        let sections = parse_kv_sections_from_str(content).sections;
        assert_eq!(sections.len(), 1);
        assert!(root_entries(sections).is_empty());
    }

    #[test]
    fn value_with_equals_kept_whole() {
        let content = "key = a=b\n";
        let entries = root_entries(parse_kv_sections_from_str(content).sections);
        assert_eq!(entries[0].1, "a=b");
    }

    #[test]
    fn bom_is_skipped() {
        let content = "\u{feff}alias = A|B\n";
        let entries = root_entries(parse_kv_sections_from_str(content).sections);
        assert_eq!(entries[0].0, "alias");
    }

    #[test]
    fn line_without_equals_is_skipped() {
        let doc = parse_kv_sections_from_str(
            "formlist = FL01|Apple\nthis line has no equals sign\nformlist = FL01|Bread\n",
        );
        let values: Vec<String> = root_entries(doc.sections).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["FL01|Apple", "FL01|Bread"]);
        assert_eq!(
            doc.skipped,
            vec![SkippedLine {
                line: 2,
                text: "this line has no equals sign".to_string(),
            }]
        );
    }

    #[test]
    fn empty_key_is_skipped() {
        let doc = parse_kv_sections_from_str(" = value\nalias = A|B\n");
        assert_eq!(doc.skipped.len(), 1);
        assert_eq!(doc.skipped[0].line, 1);
        assert_eq!(root_entries(doc.sections).len(), 1);
    }

    #[test]
    fn empty_file_returns_empty() {
        let doc = parse_kv_sections_from_str("");
        assert!(doc.sections.is_empty());
        assert!(doc.skipped.is_empty());
    }

    #[test]
    fn invalid_utf8_is_syntax_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.ini");
        std::fs::write(&path, b"alias = A|B\nbtoys = \xff\xfe\n").unwrap();
        let err = parse_kv_sections(&path).unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidSyntax { line: 2, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = parse_kv_sections(&tmp.path().join("missing.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
