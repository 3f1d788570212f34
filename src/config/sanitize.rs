//! Normalization of raw config values before parsing.
//!
//! Two ordered rule tables are applied. Whole-value rules remove whitespace
//! around separators. Token rules then run on every `|`/`,` delimited token:
//! they strip redundant zero padding from hex ids and rewrite ids in the
//! `0x02xxxxxx` and `0x04xxxxxx` ranges to explicit `~Dawnguard.esm` and
//! `~Dragonborn.esm` references, compensating for a load order some setups
//! get wrong. A leading `-`, `+`, `*` or `#` marker is kept in front of the
//! rewritten id.
use regex::Regex;

const SEPARATORS: [char; 2] = ['|', ','];

/// Whole-value rules, applied in order.
const VALUE_RULES: [(&str, &str); 2] = [(r"\s*\|\s*", "|"), (r"\s*,\s*", ",")];

/// Per-token rules, applied in order.
const TOKEN_RULES: [(&str, &str); 3] = [
    (r"^(?i)([-+*#]?)0x00+([0-9a-f]+)", "${1}0x$2"),
    (r"^(?i)([-+*#]?)0x0*2([0-9a-f]{6})$", "${1}0x$2~Dawnguard.esm"),
    (r"^(?i)([-+*#]?)0x0*4([0-9a-f]{6})$", "${1}0x$2~Dragonborn.esm"),
];

/// Compiled sanitization rules.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    value_rules: Vec<(Regex, &'static str)>,
    token_rules: Vec<(Regex, &'static str)>,
}

impl Sanitizer {
    /// Compile the rule tables.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            value_rules: compile(&VALUE_RULES)?,
            token_rules: compile(&TOKEN_RULES)?,
        })
    }

    /// Normalize one raw config value.
    ///
    /// # Examples
    ///
    /// ```
    /// use flm_engine::config::sanitize::Sanitizer;
    ///
    /// let s = Sanitizer::new().unwrap();
    /// assert_eq!(s.sanitize(" FL01 | 0x00012EB7 , Apple "), "FL01|0x12EB7,Apple");
    /// assert_eq!(s.sanitize("0x02000801"), "0x000801~Dawnguard.esm");
    /// ```
    #[must_use]
    pub fn sanitize(&self, raw: &str) -> String {
        let mut value = raw.trim().to_string();
        for (re, replacement) in &self.value_rules {
            value = re.replace_all(&value, *replacement).into_owned();
        }

        let mut out = String::with_capacity(value.len());
        for piece in value.split_inclusive(SEPARATORS) {
            let token = piece.trim_end_matches(SEPARATORS);
            out.push_str(&self.sanitize_token(token));
            out.push_str(piece.strip_prefix(token).unwrap_or_default());
        }
        out
    }

    fn sanitize_token(&self, token: &str) -> String {
        let mut token = token.to_string();
        for (re, replacement) in &self.token_rules {
            token = re.replace(&token, *replacement).into_owned();
        }
        token
    }
}

fn compile(rules: &[(&str, &'static str)]) -> Result<Vec<(Regex, &'static str)>, regex::Error> {
    rules
        .iter()
        .map(|&(pattern, replacement)| Ok((Regex::new(pattern)?, replacement)))
        .collect()
}
