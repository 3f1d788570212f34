//! Plugin-presence filter expressions.
//!
//! An expression is a comma-separated list of alternatives. Each alternative
//! is a conjunction of terms, every term a plugin name prefixed with `+`
//! (must be loaded) or `-` (must not be loaded). Terms are joined with `&`,
//! or simply written back to back after a plugin extension:
//!
//! ```text
//! +Dawnguard.esm&-Hearthfires.esm, +Dragonborn.esm
//! +Dawnguard.esm-Hearthfires.esm, +Dragonborn.esm
//! ```
//!
//! Both lines above mean the same thing.
use std::collections::BTreeMap;

use crate::error::EntryError;
use crate::store::PluginOracle;

/// Separates alternatives.
pub const OR_SEPARATOR: char = ',';

/// Separates terms within an alternative.
pub const AND_SEPARATOR: char = '&';

/// Marks a reference to a named filter.
pub const NAMED_PREFIX: char = '#';

const PLUGIN_EXTENSIONS: [&str; 3] = [".esp", ".esm", ".esl"];

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// At least one alternative holds.
    Valid,
    /// Well formed, but no alternative holds.
    Unmet,
    /// A term is empty or has no `+`/`-` sign.
    Invalid,
}

impl Verdict {
    /// Map a cached boolean back to a verdict.
    #[must_use]
    pub const fn from_bool(met: bool) -> Self {
        if met { Self::Valid } else { Self::Unmet }
    }
}

/// Lower-case `expression` and drop whitespace around separators.
///
/// # Examples
///
/// ```
/// use flm_engine::engine::filter::normalize;
///
/// assert_eq!(normalize(" +A.esp & -B.esp , +C.esp "), "+a.esp&-b.esp,+c.esp");
/// ```
#[must_use]
pub fn normalize(expression: &str) -> String {
    expression
        .split(OR_SEPARATOR)
        .map(|alt| {
            alt.split(AND_SEPARATOR)
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("&")
        })
        .collect::<Vec<_>>()
        .join(",")
        .to_lowercase()
}

/// Split one alternative into its signed terms.
///
/// Terms are cut at `&` and after every plugin extension that is directly
/// followed by another term.
#[must_use]
pub fn split_terms(alternative: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    for part in alternative.split(AND_SEPARATOR) {
        let mut rest = part;
        while let Some(cut) = next_cut(rest) {
            let (term, tail) = rest.split_at(cut);
            terms.push(term);
            rest = tail;
        }
        terms.push(rest);
    }
    terms
}

/// Byte offset just past the first extension that is followed by a sign.
fn next_cut(s: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    PLUGIN_EXTENSIONS
        .iter()
        .filter_map(|ext| {
            lower
                .match_indices(ext)
                .map(|(i, _)| i + ext.len())
                .find(|&end| lower.get(end..).is_some_and(|t| t.starts_with(['+', '-'])))
        })
        .min()
}

/// Evaluate a raw expression against `oracle`.
///
/// Every term is checked for a sign before any plugin is looked up, so an
/// expression with one malformed term is [`Verdict::Invalid`] no matter
/// which alternatives would hold.
#[must_use]
pub fn evaluate(expression: &str, oracle: &dyn PluginOracle) -> Verdict {
    let normalized = normalize(expression);
    let alternatives: Vec<Vec<(bool, &str)>> = normalized
        .split(OR_SEPARATOR)
        .map(|alt| {
            split_terms(alt)
                .into_iter()
                .map(signed_term)
                .collect::<Option<Vec<_>>>()
        })
        .collect::<Option<_>>()
        .unwrap_or_default();
    if alternatives.is_empty() {
        return Verdict::Invalid;
    }
    let met = alternatives.iter().any(|terms| {
        terms
            .iter()
            .all(|&(required, plugin)| oracle.is_loaded(plugin) == required)
    });
    Verdict::from_bool(met)
}

/// Parse `+name`/`-name` into `(must_be_loaded, name)`.
fn signed_term(term: &str) -> Option<(bool, &str)> {
    let (required, plugin) = if let Some(p) = term.strip_prefix('+') {
        (true, p)
    } else if let Some(p) = term.strip_prefix('-') {
        (false, p)
    } else {
        return None;
    };
    (!plugin.is_empty()).then_some((required, plugin))
}

/// Named filters and their cached verdicts.
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    verdicts: BTreeMap<String, bool>,
}

impl FilterTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the verdict for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Duplicate`] if `name` is already declared; the
    /// first verdict is kept.
    pub fn declare(&mut self, name: &str, met: bool) -> Result<(), EntryError> {
        let key = name.to_lowercase();
        if self.verdicts.contains_key(&key) {
            return Err(EntryError::Duplicate {
                what: "Filter",
                name: name.to_string(),
            });
        }
        self.verdicts.insert(key, met);
        Ok(())
    }

    /// Cached verdict of a named filter, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.verdicts.get(&name.to_lowercase()).copied()
    }

    /// Number of declared filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Whether no filter is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Evaluate an entry's filter section: `#name` or an inline expression.
    ///
    /// An unknown name is [`Verdict::Invalid`].
    #[must_use]
    pub fn evaluate_section(&self, section: &str, oracle: &dyn PluginOracle) -> Verdict {
        match section.strip_prefix(NAMED_PREFIX) {
            Some(name) => self.get(name).map_or(Verdict::Invalid, Verdict::from_bool),
            None => evaluate(section, oracle),
        }
    }
}
