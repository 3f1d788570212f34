//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::engine::OperatingMode;

/// Top-level CLI entry point for the form list engine.
#[derive(Parser, Debug)]
#[command(
    name = "flm",
    about = "Merge form list configs into a record catalogue",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Data directory holding `*_FLM.ini` files and the `FLM/` folder
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Record catalogue to resolve against (default: <data>/flm-catalogue.toml)
    #[arg(long, global = true)]
    pub catalogue: Option<PathBuf>,

    /// Engine settings file (default: flm.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse every config and report statistics without merging
    Check(CheckOpts),
    /// Parse every config and merge the results into the catalogue lists
    Sync(SyncOpts),
    /// Merge the payload registered for a mod event
    Event(EventOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Check(_) => "check",
            Self::Sync(_) => "sync",
            Self::Event(_) => "event",
            Self::Version => "version",
        }
    }
}

/// Options for the `check` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckOpts {
    /// Print counters and per-file reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail when any config or entry is invalid
    #[arg(long)]
    pub strict: bool,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Replay the merge afterwards as if a game was started or loaded
    #[arg(long, value_enum)]
    pub replay: Option<Replay>,
}

/// Lifecycle event to replay after the initial merge.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
    /// A new game was started
    NewGame,
    /// A saved game was loaded
    LoadGame,
}

impl From<Replay> for OperatingMode {
    fn from(replay: Replay) -> Self {
        match replay {
            Replay::NewGame => Self::NewGame,
            Replay::LoadGame => Self::LoadGame,
        }
    }
}

/// Options for the `event` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct EventOpts {
    /// Event name as registered by `modevent` entries
    pub name: String,
}
