//! Form list aggregation engine.
//!
//! Reads `key = value` entries from INI config files, resolves the record
//! references, filters and keyword collections they name, and merges the
//! results into target form lists without duplicates. Merging is
//! idempotent, so it can be replayed whenever a game is started or loaded.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]** discovers, reads and sanitizes config files
//! - **[`store`]** is the record database seam, with an in-memory catalogue
//! - **[`engine`]** parses entries, builds the tables and merges
//! - **[`commands`]** orchestrates the `check`, `sync` and `event` subcommands
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod store;
