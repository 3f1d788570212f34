//! Entry parsing, one method per entry kind.
//!
//! Fields are separated by `|` and lists by `,`. Each parse method either
//! accumulates into the engine's tables and buckets or returns the
//! [`EntryError`] that rejected the entry. Missing references inside an
//! otherwise usable entry are counted and logged here; the rejection itself
//! is logged once by the loader.
mod declarations;
mod entries;

use super::entry::EntryKind;
use super::filter::Verdict;
use super::resolver::Resolver;
use super::stats::Counter;
use super::{Engine, Host};
use crate::error::{EntryError, ParseOutcome};
use crate::store::{FormRef, PluginOracle};

/// Separates the fields of an entry.
pub const FIELD_SEPARATOR: char = '|';

/// Separates the items of a list field.
pub const ITEM_SEPARATOR: char = ',';

/// Expands a group, a collection or an alias.
pub const NAMED_PREFIX: char = '#';

/// Expands every current member of a form list.
pub const LIST_PREFIX: char = '*';

/// Split an entry value into its fields.
#[must_use]
pub fn fields(value: &str) -> Vec<&str> {
    value.split(FIELD_SEPARATOR).collect()
}

/// Items of a list field, skipping empty ones.
pub fn items(field: &str) -> impl Iterator<Item = &str> {
    field.split(ITEM_SEPARATOR).filter(|t| !t.is_empty())
}

const fn format_error(kind: EntryKind, expected: &'static str, got: usize) -> EntryError {
    EntryError::Format {
        kind: kind.label(),
        expected,
        got,
    }
}

/// Records produced by expanding an item list.
#[derive(Debug, Default)]
struct Expansion {
    forms: Vec<FormRef>,
    missing: usize,
}

impl Engine {
    /// Parse one entry of `kind` and accumulate its result.
    ///
    /// Never fails: a rejected entry comes back as
    /// [`ParseOutcome::Invalid`].
    pub fn parse_entry(&mut self, kind: EntryKind, value: &str, host: &Host<'_>) -> ParseOutcome {
        let result = match kind {
            EntryKind::Filter => self.parse_filter(value, host.plugins),
            EntryKind::Collection => self.parse_collection(value, host),
            EntryKind::Alias => self.parse_alias(value, host),
            EntryKind::Group => self.parse_group(value, host),
            EntryKind::ModEvent => self.parse_mod_event(value, host),
            EntryKind::FormList => self.parse_form_list(value, host),
            EntryKind::Plant => self.parse_pair(kind, value, host, |b| &mut b.plants),
            EntryKind::AtronachForge => {
                self.parse_pair(kind, value, host, |b| &mut b.atronach_forge)
            }
            EntryKind::AtronachForgeSigil => {
                self.parse_pair(kind, value, host, |b| &mut b.atronach_forge_sigil)
            }
            EntryKind::SpiderCrafting => {
                self.parse_pair(kind, value, host, |b| &mut b.spider_crafting)
            }
            EntryKind::BoyToys => self.parse_list(kind, value, host, |b| &mut b.boy_toys),
            EntryKind::GirlToys => self.parse_list(kind, value, host, |b| &mut b.girl_toys),
            EntryKind::HairColors => self.parse_list(kind, value, host, |b| &mut b.hair_colors),
        };
        result.unwrap_or_else(ParseOutcome::Invalid)
    }

    /// Log `msg` only in debug mode.
    fn detail(&self, msg: &str) {
        if self.debug {
            self.log.info(msg);
        }
    }

    /// Evaluate an entry's optional trailing filter.
    ///
    /// `Ok(false)` means the entry is filtered out.
    fn passes_filter(
        &mut self,
        section: Option<&str>,
        plugins: &dyn PluginOracle,
    ) -> Result<bool, EntryError> {
        let Some(section) = section else {
            return Ok(true);
        };
        match self.filters.evaluate_section(section, plugins) {
            Verdict::Valid => {
                self.detail(&format!("Filter \"{section}\" is valid."));
                Ok(true)
            }
            Verdict::Unmet => {
                self.detail(&format!(
                    "Filter \"{section}\" does not have valid conditions."
                ));
                Ok(false)
            }
            Verdict::Invalid => {
                self.stats.incr(Counter::FiltersNotFound);
                self.log
                    .warn(&format!("Filter \"{section}\" was omitted because it is invalid."));
                Err(EntryError::InvalidFilter(section.to_string()))
            }
        }
    }

    /// Resolve a destination field: `#alias` or a single form list.
    fn destinations(
        &mut self,
        field: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Vec<FormRef>, EntryError> {
        if let Some(alias) = field.strip_prefix(NAMED_PREFIX) {
            return self.aliases.get(alias).cloned().ok_or_else(|| {
                self.stats.incr(Counter::AliasesNotFound);
                EntryError::ReferenceNotFound {
                    what: "Alias",
                    name: alias.to_string(),
                }
            });
        }
        resolver
            .find_list(field)
            .map(|list| vec![list])
            .ok_or_else(|| {
                self.stats.incr(Counter::FormListsMissing);
                EntryError::ReferenceNotFound {
                    what: "FormList",
                    name: field.to_string(),
                }
            })
    }

    /// Expand an item list field into records.
    ///
    /// `#name` expands a group, or failing that a collection. `*list`
    /// copies the current members of a form list. Anything else is a
    /// single record reference. Unresolved plain and `*` items count as
    /// missing; an unknown `#name` bumps both the group and collection
    /// not-found counters instead.
    fn expand_items(&mut self, field: &str, resolver: &Resolver<'_>) -> Expansion {
        let mut out = Expansion::default();
        for item in items(field) {
            if let Some(name) = item.strip_prefix(NAMED_PREFIX) {
                let named = self
                    .groups
                    .get(name)
                    .map(Vec::as_slice)
                    .or_else(|| self.collections.get(name));
                match named {
                    Some(forms) => out.forms.extend_from_slice(forms),
                    None => {
                        self.stats.incr(Counter::GroupsNotFound);
                        self.stats.incr(Counter::CollectionsNotFound);
                        self.log
                            .error(&format!("Unknown Group or Collection: {name}."));
                    }
                }
            } else if let Some(list) = item.strip_prefix(LIST_PREFIX) {
                match resolver.find_list(list) {
                    Some(list) => out
                        .forms
                        .extend(resolver.store().list_members(list.id)),
                    None => {
                        out.missing += 1;
                        self.log.error(&format!("Unable to find FormList: {list}."));
                    }
                }
            } else {
                match resolver.find_form(item) {
                    Some(form) => out.forms.push(form),
                    None => {
                        out.missing += 1;
                        self.log.error(&format!("Unable to find Form: {item}."));
                    }
                }
            }
        }
        out
    }
}
