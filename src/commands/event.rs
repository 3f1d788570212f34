//! Command: merge the payload of one mod event.
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{EventOpts, GlobalOpts};
use crate::engine::events::LogNotifier;
use crate::logging::Log;

/// Run the event command.
///
/// The regular merge runs first so the event sees the same lists it would
/// in game.
///
/// # Errors
///
/// Returns an error if the session cannot be set up or no `modevent` entry
/// registered the event.
pub fn run(global: &GlobalOpts, opts: &EventOpts, log: &Arc<dyn Log>) -> Result<()> {
    let mut session = Session::init(global, Arc::clone(log))?;
    session.add_all();

    let notifier = LogNotifier::new(Arc::clone(log));
    if !session
        .engine
        .handle_mod_event(&opts.name, &mut session.store, &notifier)
    {
        anyhow::bail!("no modevent entry registers {}", opts.name);
    }
    Ok(())
}
