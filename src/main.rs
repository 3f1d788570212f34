//! `flm` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use flm_engine::cli::{Cli, Command};
use flm_engine::commands;
use flm_engine::logging::{self, Log, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log: Arc<dyn Log> = Arc::new(Logger::new(command));

    match &args.command {
        Command::Check(opts) => commands::check::run(&args.global, opts, &log),
        Command::Sync(opts) => commands::sync::run(&args.global, opts, &log),
        Command::Event(opts) => commands::event::run(&args.global, opts, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
