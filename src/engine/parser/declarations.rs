//! Filters, collections, aliases and groups.
use super::{fields, format_error, items};
use crate::engine::collection::CollectionDecl;
use crate::engine::entry::EntryKind;
use crate::engine::filter::{Verdict, evaluate};
use crate::engine::stats::Counter;
use crate::engine::{Engine, Host};
use crate::error::{EntryError, ParseOutcome};
use crate::store::PluginOracle;

impl Engine {
    /// `filter = name|expression`
    pub(super) fn parse_filter(
        &mut self,
        value: &str,
        plugins: &dyn PluginOracle,
    ) -> Result<ParseOutcome, EntryError> {
        let (name, expression) = match fields(value).as_slice() {
            &[name, expression] => (name, expression),
            other => return Err(format_error(EntryKind::Filter, "2", other.len())),
        };

        if self.filters.get(name).is_some() {
            self.stats.incr(Counter::FiltersDuplicate);
            return Err(EntryError::Duplicate {
                what: "Filter",
                name: name.to_string(),
            });
        }

        let met = match evaluate(expression, plugins) {
            Verdict::Valid => true,
            Verdict::Unmet => false,
            Verdict::Invalid => {
                self.stats.incr(Counter::FiltersNotFound);
                return Err(EntryError::InvalidFilter(expression.to_string()));
            }
        };
        self.filters.declare(name, met)?;
        self.detail(&format!("Filter \"{name}\" added with status {met}."));
        Ok(ParseOutcome::Valid)
    }

    /// `collection = name|category|keywords[|filter]`
    pub(super) fn parse_collection(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let (name, category, keywords, filter) = match fields(value).as_slice() {
            &[name, category, keywords] => (name, category, keywords, None),
            &[name, category, keywords, filter] => (name, category, keywords, Some(filter)),
            other => return Err(format_error(EntryKind::Collection, "3 or 4", other.len())),
        };
        if !self.passes_filter(filter, host.plugins)? {
            return Ok(ParseOutcome::FilteredOut);
        }

        if self.collections.contains(name) || self.groups.contains_key(name) {
            self.stats.incr(Counter::CollectionsDuplicate);
            return Err(EntryError::Duplicate {
                what: "Collection",
                name: name.to_string(),
            });
        }

        let decl = CollectionDecl::parse(name, category, keywords, &host.resolver())
            .inspect_err(|_| self.stats.incr(Counter::CollectionsNotFound))?;
        self.detail(&format!(
            "Collection \"{name}\" declared over {category} with {} keywords.",
            decl.include.len() + decl.exclude.len()
        ));
        self.collections.declare(decl)?;
        Ok(ParseOutcome::Valid)
    }

    /// `alias = name|lists`
    pub(super) fn parse_alias(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let (name, lists) = match fields(value).as_slice() {
            &[name, lists] => (name, lists),
            other => return Err(format_error(EntryKind::Alias, "2", other.len())),
        };
        if name.is_empty() {
            return Err(EntryError::InvalidName {
                name: String::new(),
                reason: "the alias name is empty",
            });
        }
        if self.aliases.contains_key(name) {
            self.stats.incr(Counter::AliasesDuplicate);
            return Err(EntryError::Duplicate {
                what: "Alias",
                name: name.to_string(),
            });
        }

        let resolver = host.resolver();
        let mut found = Vec::new();
        let mut missing = 0;
        for reference in items(lists) {
            match resolver.find_list(reference) {
                Some(list) => found.push(list),
                None => {
                    missing += 1;
                    self.log
                        .error(&format!("Unable to find FormList: {reference} for Alias."));
                }
            }
        }
        if found.is_empty() {
            return Err(EntryError::Empty {
                what: "Alias",
                name: name.to_string(),
            });
        }

        self.detail(&format!(
            "FormLists Alias \"{name}\" added with {} FormLists, {missing} missing FormLists.",
            found.len()
        ));
        self.aliases.insert(name.to_string(), found);
        Ok(ParseOutcome::Valid)
    }

    /// `group = name|items`
    pub(super) fn parse_group(
        &mut self,
        value: &str,
        host: &Host<'_>,
    ) -> Result<ParseOutcome, EntryError> {
        let (name, forms) = match fields(value).as_slice() {
            &[name, forms] => (name, forms),
            other => return Err(format_error(EntryKind::Group, "2", other.len())),
        };
        if name.is_empty() {
            return Err(EntryError::InvalidName {
                name: String::new(),
                reason: "the group name is empty",
            });
        }
        if self.groups.contains_key(name) || self.collections.contains(name) {
            self.stats.incr(Counter::GroupsDuplicate);
            return Err(EntryError::Duplicate {
                what: "Group",
                name: name.to_string(),
            });
        }

        let expansion = self.expand_items(forms, &host.resolver());
        if expansion.forms.is_empty() {
            return Err(EntryError::Empty {
                what: "Group",
                name: name.to_string(),
            });
        }

        self.detail(&format!(
            "Forms Group \"{name}\" added with {} Forms, {} missing Forms.",
            expansion.forms.len(),
            expansion.missing
        ));
        self.groups.insert(name.to_string(), expansion.forms);
        Ok(ParseOutcome::Valid)
    }
}
