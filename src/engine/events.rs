//! Mod-event payloads and outgoing notifications.
//!
//! `modevent` entries are parsed like `formlist` entries but held back. When
//! another mod raises the named event, the payload is merged and an
//! `<name>OK` event reports how many records were added.
use std::collections::BTreeMap;
use std::sync::Arc;

use super::merge::{FormLists, Tally, append_to};
use crate::logging::Log;
use crate::store::FormRef;

/// Sent once the initial merge has finished.
pub const DONE_EVENT: &str = "FLM_Done";

/// Appended to an event name to form its reply.
pub const REPLY_SUFFIX: &str = "OK";

/// Outgoing event channel to the host.
#[cfg_attr(test, mockall::automock)]
pub trait EventNotifier {
    /// Raise `event` with a string and a numeric argument.
    fn send(&self, event: &str, str_arg: &str, num_arg: f32);
}

/// Payloads registered by `modevent` entries.
#[derive(Debug, Clone, Default)]
pub struct ModEvents {
    payloads: BTreeMap<String, FormLists>,
}

impl ModEvents {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `forms` for every list in `destinations` under `event`.
    pub fn register(&mut self, event: &str, destinations: &[FormRef], forms: &[FormRef]) {
        append_to(
            self.payloads.entry(event.to_string()).or_default(),
            destinations,
            forms,
        );
    }

    /// Payload of `event`, if any entry registered it.
    #[must_use]
    pub fn get(&self, event: &str) -> Option<&FormLists> {
        self.payloads.get(event)
    }

    /// Registered event names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.payloads.keys().map(String::as_str)
    }

    /// Number of distinct events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Whether no event is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Reply event name and string argument for a merged payload.
///
/// # Examples
///
/// ```
/// use flm_engine::engine::events::reply;
/// use flm_engine::engine::merge::Tally;
///
/// let (name, arg) = reply("MyEvent", Tally { added: 3, duplicates: 1 });
/// assert_eq!(name, "MyEventOK");
/// assert_eq!(arg, "MyEvent|3|1");
/// ```
#[must_use]
pub fn reply(event: &str, tally: Tally) -> (String, String) {
    (
        format!("{event}{REPLY_SUFFIX}"),
        format!("{event}|{}|{}", tally.added, tally.duplicates),
    )
}

/// Numeric event argument for a count.
#[must_use]
pub fn count_arg(count: usize) -> f32 {
    u16::try_from(count).map_or(f32::from(u16::MAX), f32::from)
}

/// Notifier that only logs what would be sent.
///
/// Used outside the game, where nothing listens for events.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    log: Arc<dyn Log>,
}

impl LogNotifier {
    /// Log sent events through `log`.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self { log }
    }
}

impl EventNotifier for LogNotifier {
    fn send(&self, event: &str, str_arg: &str, num_arg: f32) {
        self.log.info(&format!(
            "Sent event: {event}, strArg: {str_arg}, numArg: {num_arg}."
        ));
    }
}
