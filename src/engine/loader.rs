//! Running every config source through the parser in pass order.
//!
//! Passes span all sources: every `filter` entry of every file is parsed
//! before any `collection` entry, collections are populated once, then
//! aliases and groups are parsed, and only then the remaining entries in
//! file order. A later file can therefore declare what an earlier file
//! uses.
use std::sync::Arc;

use serde::Serialize;

use super::entry::{EntryKind, Pass};
use super::stats::Counter;
use super::{Engine, Host};
use crate::config::ConfigSource;
use crate::error::{ConfigError, EntryError, ParseOutcome};
use crate::logging::indented;

/// Per-source entry tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    /// Source display name.
    pub name: String,
    /// Number of entries in the source, malformed lines included.
    pub entries: usize,
    /// Accepted entries.
    pub valid: usize,
    /// Rejected entries.
    pub invalid: usize,
    /// Entries excluded by a filter.
    pub filtered_out: usize,
}

impl Engine {
    /// Parse every source into the engine's tables and buckets.
    ///
    /// Sources that failed to load count as invalid configs and are
    /// skipped. Parsing never stops at a bad entry.
    pub fn find_all(&mut self, sources: &[Result<ConfigSource, ConfigError>], host: &Host<'_>) {
        let log = Arc::clone(&self.log);
        if self.debug {
            log.stage("DEBUG MODE ENABLED");
        }
        log.stage("Looking for configs");
        if sources.is_empty() {
            log.warn("Configs not found!");
            log.stage("");
            return;
        }
        log.info(&format!("Found {} configs.", sources.len()));

        let mut valid = Vec::new();
        for source in sources {
            match source {
                Ok(source) => {
                    self.stats.incr(Counter::ConfigsValid);
                    valid.push(source);
                }
                Err(err) => {
                    self.stats.incr(Counter::ConfigsInvalid);
                    log.error(&err.to_string());
                }
            }
        }
        self.reports = valid
            .iter()
            .map(|s| SourceReport {
                name: s.name.clone(),
                entries: s.entries.len() + s.skipped.len(),
                ..SourceReport::default()
            })
            .collect();
        for (idx, source) in valid.iter().enumerate() {
            for skipped in &source.skipped {
                let err = EntryError::MalformedLine {
                    line: skipped.line,
                    text: skipped.text.clone(),
                };
                self.tally(idx, err.into());
            }
        }

        for kind in [EntryKind::Filter, EntryKind::Collection] {
            self.run_kind(&valid, kind, host);
        }
        self.collections.populate_all(host.store);
        for kind in [EntryKind::Alias, EntryKind::Group] {
            self.run_kind(&valid, kind, host);
        }
        for (idx, source) in valid.iter().enumerate() {
            for (key, value) in &source.entries {
                match EntryKind::from_key(key) {
                    Some(kind) if kind.pass() == Pass::Entries => {
                        self.process(idx, kind, value, host);
                    }
                    Some(_) => {}
                    None => self.tally(idx, EntryError::UnknownKey(key.clone()).into()),
                }
            }
        }

        self.log_reports();
    }

    /// Parse every `kind` entry of every source.
    fn run_kind(&mut self, sources: &[&ConfigSource], kind: EntryKind, host: &Host<'_>) {
        for (idx, source) in sources.iter().enumerate() {
            for (key, value) in &source.entries {
                if EntryKind::from_key(key) == Some(kind) {
                    self.process(idx, kind, value, host);
                }
            }
        }
    }

    fn process(&mut self, idx: usize, kind: EntryKind, value: &str, host: &Host<'_>) {
        let log = Arc::clone(&self.log);
        if self.debug {
            log.info(&format!("Processing entry: {value}."));
        }
        let outcome = {
            let _indent = self.debug.then(|| indented(log.as_ref()));
            self.parse_entry(kind, value, host)
        };
        self.tally(idx, outcome);
    }

    fn tally(&mut self, idx: usize, outcome: ParseOutcome) {
        let Some(report) = self.reports.get_mut(idx) else {
            return;
        };
        match outcome {
            ParseOutcome::Valid => {
                self.stats.incr(Counter::EntriesValid);
                report.valid += 1;
            }
            ParseOutcome::FilteredOut => {
                self.stats.incr(Counter::EntriesFilteredOut);
                report.filtered_out += 1;
            }
            ParseOutcome::Invalid(err) => {
                self.stats.incr(Counter::EntriesInvalid);
                report.invalid += 1;
                self.log.error(&format!("{}: {err}", report.name));
            }
        }
    }

    fn log_reports(&self) {
        let log = self.log.as_ref();
        {
            let _indent = indented(log);
            for report in &self.reports {
                log.info(&format!("Processing {}...", report.name));
                let _inner = indented(log);
                if report.entries == 0 {
                    log.info("Config file is empty.");
                } else {
                    log.info(&format!(
                        "Finished, {} valid entries found, {} invalid, {} filtered out.",
                        report.valid, report.invalid, report.filtered_out
                    ));
                }
            }
        }
        let s = &self.stats;
        log.info(&format!(
            "Reading configs complete, {} valid configs found, {} invalid. {} valid entries found, {} invalid, {} filtered out.",
            s.get(Counter::ConfigsValid),
            s.get(Counter::ConfigsInvalid),
            s.get(Counter::EntriesValid),
            s.get(Counter::EntriesInvalid),
            s.get(Counter::EntriesFilteredOut),
        ));
        log.stage("");
    }
}
