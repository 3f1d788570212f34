//! Mod events, form lists, pairs and plain lists.
use super::{fields, format_error};
use crate::engine::entry::EntryKind;
use crate::engine::merge::{Buckets, FormPair, append_to};
use crate::engine::stats::Counter;
use crate::engine::{Engine, Host, OperatingMode};
use crate::error::{EntryError, ParseOutcome};
use crate::store::{FormRef, FormType};

/// Picks the bucket an entry kind accumulates into.
pub(super) type Select<T> = fn(&mut Buckets) -> &mut Vec<T>;

/// Types a planter seed is expected to have.
const SEED_TYPES: [FormType; 3] = [FormType::Ingredient, FormType::AlchemyItem, FormType::Activator];

/// Types a planted result is expected to have.
const PLANT_TYPES: [FormType; 5] = [
    FormType::Flora,
    FormType::Tree,
    FormType::Activator,
    FormType::Misc,
    FormType::Container,
];

impl Engine {
    /// `modevent = event|destination|items`
    ///
    /// Every rejection also bumps the invalid mod event counter.
    pub(super) fn parse_mod_event(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let result = self.register_mod_event(value, host);
        if result.is_err() {
            self.stats.incr(Counter::ModEventsInvalid);
        }
        result
    }

    fn register_mod_event(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let (event, destination, forms) = match fields(value).as_slice() {
            &[event, destination, forms] => (event, destination, forms),
            other => return Err(format_error(EntryKind::ModEvent, "3", other.len())),
        };
        if event.is_empty() {
            return Err(EntryError::InvalidName {
                name: String::new(),
                reason: "the event name is empty",
            });
        }
        if !event.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EntryError::InvalidName {
                name: event.to_string(),
                reason: "the event name can only contain letters",
            });
        }

        let resolver = host.resolver();
        let lists = self.destinations(destination, &resolver);
        let expansion = self.expand_items(forms, &resolver);
        let lists = lists?;

        self.stats.add(Counter::Forms, expansion.forms.len());
        self.stats.add(Counter::FormsMissing, expansion.missing);
        if expansion.forms.is_empty() {
            return Err(EntryError::Empty {
                what: "Mod Event",
                name: event.to_string(),
            });
        }

        for list in &lists {
            self.detail(&format!(
                "Mod Event: {event} => found FormList {}, {} Forms, {} missing Forms.",
                host.store.describe(list.id),
                expansion.forms.len(),
                expansion.missing
            ));
        }
        self.mod_events.register(event, &lists, &expansion.forms);
        self.stats.incr(Counter::ModEvents);
        Ok(ParseOutcome::Valid)
    }

    /// `formlist = destination|items[|filter]`
    ///
    /// Missing items are dropped and counted; only a missing destination
    /// rejects the entry.
    pub(super) fn parse_form_list(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let (destination, forms, filter) = match fields(value).as_slice() {
            &[destination, forms] => (destination, forms, None),
            &[destination, forms, filter] => (destination, forms, Some(filter)),
            other => return Err(format_error(EntryKind::FormList, "2 or 3", other.len())),
        };
        if !self.passes_filter(filter, host.plugins)? {
            return Ok(ParseOutcome::FilteredOut);
        }

        let resolver = host.resolver();
        let lists = self.destinations(destination, &resolver);
        let expansion = self.expand_items(forms, &resolver);
        let lists = lists?;

        self.stats.add(Counter::Forms, expansion.forms.len());
        self.stats.add(Counter::FormsMissing, expansion.missing);
        for list in &lists {
            self.detail(&format!(
                "Found FormList {}, {} Forms, {} missing Forms.",
                host.store.describe(list.id),
                expansion.forms.len(),
                expansion.missing
            ));
        }
        append_to(&mut self.buckets.form_lists, &lists, &expansion.forms);
        Ok(ParseOutcome::Valid)
    }

    /// `first|second[|filter]` for plants and the recipe/result kinds.
    ///
    /// Both halves must resolve. Plant halves of an unexpected type only
    /// produce a warning.
    pub(super) fn parse_pair(
        &mut self,
        kind: EntryKind,
        value: &str,
        host: &Host<'_>,
        select: Select<FormPair>,
    ) -> Result<ParseOutcome, EntryError> {
        let (first, second, filter) = match fields(value).as_slice() {
            &[first, second] => (first, second, None),
            &[first, second, filter] => (first, second, Some(filter)),
            other => return Err(format_error(kind, "2 or 3", other.len())),
        };
        if !self.passes_filter(filter, host.plugins)? {
            return Ok(ParseOutcome::FilteredOut);
        }

        let names = if kind == EntryKind::Plant {
            ("Seed", "Plant")
        } else {
            ("Recipe", "Result")
        };
        let resolver = host.resolver();
        let halves = [(names.0, first), (names.1, second)].map(|(what, reference)| {
            let found = resolver.find_form(reference);
            if found.is_none() {
                self.stats.incr(Counter::FormsMissing);
                self.log
                    .error(&format!("Unable to find {what}: {reference}."));
            }
            found.ok_or_else(|| EntryError::ReferenceNotFound {
                what,
                name: reference.to_string(),
            })
        });
        let [first_form, second_form] = halves;
        let pair = (first_form?, second_form?);

        if kind == EntryKind::Plant && self.mode == OperatingMode::Initialize {
            self.warn_unexpected_type(first, pair.0, &SEED_TYPES);
            self.warn_unexpected_type(second, pair.1, &PLANT_TYPES);
        }
        if self.mode == OperatingMode::Initialize {
            self.detail(&format!(
                "Found {} {}, {} {}.",
                names.0,
                host.store.describe(pair.0.id),
                names.1,
                host.store.describe(pair.1.id)
            ));
        }

        self.stats.add(Counter::Forms, 2);
        select(&mut self.buckets).push(pair);
        Ok(ParseOutcome::Valid)
    }

    /// `items[|filter]` for toys and hair colors.
    pub(super) fn parse_list(
        &mut self,
        kind: EntryKind,
        value: &str,
        host: &Host<'_>,
        select: Select<FormRef>,
    ) -> Result<ParseOutcome, EntryError> {
        let (forms, filter) = match fields(value).as_slice() {
            &[forms] => (forms, None),
            &[forms, filter] => (forms, Some(filter)),
            other => return Err(format_error(kind, "1 or 2", other.len())),
        };
        if !self.passes_filter(filter, host.plugins)? {
            return Ok(ParseOutcome::FilteredOut);
        }

        let expansion = self.expand_items(forms, &host.resolver());
        if self.mode == OperatingMode::Initialize {
            self.detail(&format!(
                "{}: found {} Forms, {} missing Forms.",
                kind.label(),
                expansion.forms.len(),
                expansion.missing
            ));
        }
        self.stats.add(Counter::Forms, expansion.forms.len());
        self.stats.add(Counter::FormsMissing, expansion.missing);
        select(&mut self.buckets).extend(expansion.forms);
        Ok(ParseOutcome::Valid)
    }

    fn warn_unexpected_type(&self, reference: &str, form: FormRef, expected: &[FormType]) {
        if expected.contains(&form.form_type) {
            return;
        }
        let names: Vec<String> = expected.iter().map(|t| format!("{t:?}")).collect();
        if let Some((last, rest)) = names.split_last() {
            self.log.warn(&format!(
                "{reference} type {:?} is not {} or {last}.",
                form.form_type,
                rest.join(", ")
            ));
        }
    }
}
