//! Keyword-derived collections.
//!
//! Collections are declared first and populated later: [`Collections::populate_all`]
//! walks every record of each declared category once and tests it against
//! all declarations of that category.
use std::collections::{BTreeMap, BTreeSet};

use super::resolver::Resolver;
use crate::error::EntryError;
use crate::store::{FormId, FormRef, FormType, RecordStore};

/// Prefix marking an excluded keyword.
pub const EXCLUDE_PREFIX: char = '-';

/// A declared collection before population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDecl {
    /// Name, as written.
    pub name: String,
    /// Category scanned during population.
    pub form_type: FormType,
    /// Keywords a record must all carry.
    pub include: Vec<FormId>,
    /// Keywords a record must not carry.
    pub exclude: Vec<FormId>,
}

impl CollectionDecl {
    /// Build a declaration from its config sections.
    ///
    /// `keywords` is a comma-separated list; entries prefixed with `-` are
    /// exclusions. Every keyword must resolve to a keyword record.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ReferenceNotFound`] for an unknown category or
    /// keyword, and [`EntryError::Empty`] when no keyword is given.
    pub fn parse(
        name: &str,
        category: &str,
        keywords: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Self, EntryError> {
        let form_type =
            FormType::from_category(category).ok_or_else(|| EntryError::ReferenceNotFound {
                what: "Category",
                name: category.to_string(),
            })?;

        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for token in keywords.split(',').filter(|t| !t.is_empty()) {
            let (target, reference) = match token.strip_prefix(EXCLUDE_PREFIX) {
                Some(rest) => (&mut exclude, rest),
                None => (&mut include, token),
            };
            let keyword = resolver
                .find_form(reference)
                .filter(|f| f.form_type == FormType::Keyword)
                .ok_or_else(|| EntryError::ReferenceNotFound {
                    what: "Keyword",
                    name: reference.to_string(),
                })?;
            target.push(keyword.id);
        }

        if include.is_empty() && exclude.is_empty() {
            return Err(EntryError::Empty {
                what: "Collection",
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            form_type,
            include,
            exclude,
        })
    }

    /// Whether `form` carries every included and no excluded keyword.
    #[must_use]
    pub fn matches(&self, store: &dyn RecordStore, form: FormId) -> bool {
        self.include.iter().all(|&k| store.has_keyword(form, k))
            && !self.exclude.iter().any(|&k| store.has_keyword(form, k))
    }
}

/// Declared collections and their populated members.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    decls: Vec<CollectionDecl>,
    members: BTreeMap<String, Vec<FormRef>>,
}

impl Collections {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a collection named `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.decls.iter().any(|d| d.name == name)
    }

    /// Add a declaration.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Duplicate`] if the name is already declared.
    pub fn declare(&mut self, decl: CollectionDecl) -> Result<(), EntryError> {
        if self.contains(&decl.name) {
            return Err(EntryError::Duplicate {
                what: "Collection",
                name: decl.name,
            });
        }
        self.decls.push(decl);
        Ok(())
    }

    /// Members of a populated collection.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[FormRef]> {
        self.members.get(name).map(Vec::as_slice)
    }

    /// Every declaration, in declaration order.
    #[must_use]
    pub fn declarations(&self) -> &[CollectionDecl] {
        &self.decls
    }

    /// Number of declared collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Fill every declared collection from `store`.
    ///
    /// Each category is scanned once. Member lists are rebuilt from empty, so
    /// calling this again with the same declarations gives the same result.
    pub fn populate_all(&mut self, store: &dyn RecordStore) {
        self.members = self
            .decls
            .iter()
            .map(|d| (d.name.clone(), Vec::new()))
            .collect();

        let categories: BTreeSet<FormType> = self.decls.iter().map(|d| d.form_type).collect();
        for category in categories {
            let decls: Vec<&CollectionDecl> = self
                .decls
                .iter()
                .filter(|d| d.form_type == category)
                .collect();
            for form in store.forms_of_type(category) {
                for decl in &decls {
                    if decl.matches(store, form.id)
                        && let Some(list) = self.members.get_mut(&decl.name)
                    {
                        list.push(form);
                    }
                }
            }
        }
    }
}
