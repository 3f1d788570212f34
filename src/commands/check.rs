//! Command: parse every config and report, without merging.
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::Session;
use crate::cli::{CheckOpts, GlobalOpts};
use crate::engine::loader::SourceReport;
use crate::engine::stats::{Counter, Stats};
use crate::logging::Log;

/// Machine-readable result of a check.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    /// Every statistics counter by name.
    pub stats: &'a Stats,
    /// Per-file entry tallies.
    pub configs: &'a [SourceReport],
    /// Events registered by `modevent` entries.
    pub mod_events: Vec<&'a str>,
}

impl<'a> CheckReport<'a> {
    /// Collect the report from a parsed session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        let engine = &session.engine;
        Self {
            stats: engine.stats(),
            configs: engine.reports(),
            mod_events: engine.mod_events().names().collect(),
        }
    }

    /// Invalid configs plus invalid entries.
    #[must_use]
    pub fn problems(&self) -> usize {
        self.stats.get(Counter::ConfigsInvalid) + self.stats.get(Counter::EntriesInvalid)
    }
}

/// Run the check command.
///
/// # Errors
///
/// Returns an error if the session cannot be set up, or with `--strict` if
/// any config or entry was rejected.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Arc<dyn Log>) -> Result<()> {
    let session = Session::init(global, Arc::clone(log))?;
    session.engine.log_summary();

    let report = CheckReport::new(&session);
    if opts.json {
        let json = serde_json::to_string_pretty(&report).context("serializing check report")?;
        println!("{json}");
    }

    let problems = report.problems();
    if opts.strict && problems > 0 {
        anyhow::bail!("{problems} invalid config(s) or entries");
    }
    Ok(())
}
