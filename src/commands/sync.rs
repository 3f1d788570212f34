//! Command: parse every config and merge into the catalogue lists.
use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalOpts, SyncOpts};
use crate::engine::events::LogNotifier;
use crate::engine::merge::Target;
use crate::logging::{Log, indented};
use crate::store::RecordStore as _;

/// Run the sync command.
///
/// Merges once in initialize mode, signals completion, and optionally
/// replays the merge as a new game or game load would.
///
/// # Errors
///
/// Returns an error if the session cannot be set up.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Arc<dyn Log>) -> Result<()> {
    let mut session = Session::init(global, Arc::clone(log))?;
    session.add_all();
    session.engine.send_done(&LogNotifier::new(Arc::clone(log)));

    if let Some(replay) = opts.replay {
        session.engine.set_mode(replay.into());
        session.add_all();
    }

    log_target_sizes(&session, log.as_ref());
    Ok(())
}

fn log_target_sizes(session: &Session, log: &dyn Log) {
    log.debug("target lists:");
    let _indent = indented(log);
    for target in Target::ALL {
        if let Some(list) = session.engine.target_list(target) {
            log.debug(&format!(
                "{}: {} records",
                target.editor_id(&session.settings.targets),
                session.store.list_members(list).len()
            ));
        }
    }
}
