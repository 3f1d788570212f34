//! Domain-specific error types for the form list engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Engine modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! - [`ConfigError`]: unreadable sources, INI syntax, catalogues
//! - [`EntryError`]: a single rejected config entry
//!
//! Entry errors never abort a run. The parser reports them through
//! [`ParseOutcome::Invalid`] and the loader moves on to the next entry.

use thiserror::Error;

/// Structural errors: the whole source is skipped.
///
/// Only files that cannot be read as text end up here. A malformed line
/// inside a readable file is an [`EntryError::MalformedLine`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The INI file contains a syntax error that prevents parsing.
    #[error("Invalid INI syntax in {file} at line {line}: {message}")]
    InvalidSyntax {
        /// File name or path of the offending source.
        file: String,
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A record catalogue refers to something it does not define.
    #[error("Invalid catalogue: {0}")]
    Catalogue(String),
}

/// Reasons a single entry is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// Wrong number of `|` separated sections.
    #[error("Wrong {kind} format. Expected {expected} sections, got {got}.")]
    Format {
        /// Entry kind keyword (e.g. `"alias"`).
        kind: &'static str,
        /// Human-readable accepted section counts (e.g. `"2 or 3"`).
        expected: &'static str,
        /// Number of sections actually present.
        got: usize,
    },

    /// A named reference could not be resolved.
    #[error("{what} {name} not found")]
    ReferenceNotFound {
        /// What kind of thing was looked up (e.g. `"FormList"`, `"Alias"`).
        what: &'static str,
        /// The reference as written in the config.
        name: String,
    },

    /// A declaration reused an existing name; the first one is kept.
    #[error("{what} {name} already exists")]
    Duplicate {
        /// Declaration kind (e.g. `"Alias"`).
        what: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// A name does not satisfy its lexical rules.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Which rule was broken.
        reason: &'static str,
    },

    /// A filter expression contains a malformed token.
    #[error("Invalid filter expression '{0}'")]
    InvalidFilter(String),

    /// A declaration resolved to nothing usable.
    #[error("{what} {name} is empty")]
    Empty {
        /// Declaration kind.
        what: &'static str,
        /// Name of the declaration.
        name: String,
    },

    /// The entry key is not one of the known keywords.
    #[error("Unknown key {0}!")]
    UnknownKey(String),

    /// A config line that is not a `key = value` pair.
    #[error("Line {line} is not a key = value pair: {text}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// The line as written.
        text: String,
    },
}

/// Result of parsing one config entry.
///
/// Filtered-out entries are not errors: they were explicitly excluded by a
/// filter that evaluated to false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The entry was accepted.
    Valid,
    /// The entry was rejected.
    Invalid(EntryError),
    /// A trailing filter excluded the entry.
    FilteredOut,
}

impl ParseOutcome {
    /// Returns `true` for [`ParseOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<EntryError> for ParseOutcome {
    fn from(err: EntryError) -> Self {
        Self::Invalid(err)
    }
}
