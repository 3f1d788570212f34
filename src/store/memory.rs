//! In-memory record store loadable from a TOML catalogue.
//!
//! Used by the CLI to validate configs outside the game and by tests as a
//! deterministic stand-in for the real record database.
//!
//! ```toml
//! plugins = ["Skyrim.esm", "HearthFires.esm"]
//!
//! [[forms]]
//! id = 0x0004B0BA
//! editor_id = "FoodApple"
//! name = "Apple"
//! type = "alchemyitem"
//! plugin = "Skyrim.esm"
//! keywords = ["VendorItemFood"]
//! ```
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use super::{FormId, FormRef, FormType, LOCAL_ID_MASK, PluginOracle, RecordStore};
use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Catalogue {
    #[serde(default)]
    plugins: Vec<String>,
    #[serde(default)]
    forms: Vec<CatalogueForm>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueForm {
    id: FormId,
    editor_id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    form_type: FormType,
    plugin: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    /// Initial members, for form lists only.
    #[serde(default)]
    members: Vec<String>,
}

#[derive(Debug, Clone)]
struct Record {
    form: FormRef,
    editor_id: String,
    name: Option<String>,
}

/// [`RecordStore`] and [`PluginOracle`] backed by plain collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    plugins: BTreeSet<String>,
    records: Vec<Record>,
    by_id: HashMap<FormId, usize>,
    by_editor_id: HashMap<String, usize>,
    by_local: HashMap<(String, u32), usize>,
    keywords: HashMap<FormId, HashSet<FormId>>,
    lists: HashMap<FormId, Vec<FormRef>>,
}

impl MemoryStore {
    /// Create an empty store with no plugins loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalogue file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be read, is not valid
    /// TOML, or references keywords or list members it does not define.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("catalogue not found: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalogue {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading catalogue {}", path.display()))
    }

    /// Build a store from catalogue TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Catalogue`] on malformed TOML, duplicate ids or
    /// editor ids, and unresolvable keyword or member references.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let catalogue: Catalogue =
            toml::from_str(content).map_err(|e| ConfigError::Catalogue(e.to_string()))?;
        Self::from_catalogue(catalogue)
    }

    fn from_catalogue(catalogue: Catalogue) -> Result<Self, ConfigError> {
        let mut store = Self::new();
        for plugin in &catalogue.plugins {
            store.add_plugin(plugin);
        }

        for form in &catalogue.forms {
            if store.by_id.contains_key(&form.id) {
                return Err(ConfigError::Catalogue(format!(
                    "duplicate form id {}",
                    form.id
                )));
            }
            if store
                .by_editor_id
                .contains_key(&form.editor_id.to_lowercase())
            {
                return Err(ConfigError::Catalogue(format!(
                    "duplicate editor id {}",
                    form.editor_id
                )));
            }
            store.insert(
                form.id.0,
                &form.editor_id,
                form.form_type,
                form.plugin.as_deref(),
            );
            if let Some(name) = &form.name {
                store.set_name(form.id, name);
            }
        }

        for form in &catalogue.forms {
            for keyword in &form.keywords {
                let kw = store
                    .catalogue_ref(keyword)
                    .filter(|k| k.form_type == FormType::Keyword)
                    .ok_or_else(|| {
                        ConfigError::Catalogue(format!(
                            "{} refers to unknown keyword {keyword}",
                            form.editor_id
                        ))
                    })?;
                store.tag(form.id, kw.id);
            }
            if form.members.is_empty() {
                continue;
            }
            if form.form_type != FormType::FormList {
                return Err(ConfigError::Catalogue(format!(
                    "{} has members but is not a form list",
                    form.editor_id
                )));
            }
            for member in &form.members {
                let m = store.catalogue_ref(member).ok_or_else(|| {
                    ConfigError::Catalogue(format!(
                        "{} refers to unknown member {member}",
                        form.editor_id
                    ))
                })?;
                store.list_add(form.id, m);
            }
        }

        Ok(store)
    }

    /// Mark a plugin as loaded.
    pub fn add_plugin(&mut self, plugin: &str) {
        self.plugins.insert(plugin.to_lowercase());
    }

    /// Register a record and return its handle.
    ///
    /// Form lists start out empty.
    pub fn insert(
        &mut self,
        id: u32,
        editor_id: &str,
        form_type: FormType,
        plugin: Option<&str>,
    ) -> FormRef {
        let form = FormRef {
            id: FormId(id),
            form_type,
        };
        let idx = self.records.len();
        self.records.push(Record {
            form,
            editor_id: editor_id.to_string(),
            name: None,
        });
        self.by_id.insert(form.id, idx);
        self.by_editor_id.insert(editor_id.to_lowercase(), idx);
        if let Some(plugin) = plugin {
            self.by_local
                .insert((plugin.to_lowercase(), id & LOCAL_ID_MASK), idx);
        }
        if form_type == FormType::FormList {
            self.lists.entry(form.id).or_default();
        }
        form
    }

    /// Set the in-game display name of a record.
    pub fn set_name(&mut self, id: FormId, name: &str) {
        if let Some(&idx) = self.by_id.get(&id)
            && let Some(record) = self.records.get_mut(idx)
        {
            record.name = Some(name.to_string());
        }
    }

    /// Attach `keyword` to `form`.
    pub fn tag(&mut self, form: FormId, keyword: FormId) {
        self.keywords.entry(form).or_default().insert(keyword);
    }

    fn catalogue_ref(&self, reference: &str) -> Option<FormRef> {
        reference.strip_prefix("0x").map_or_else(
            || self.lookup_editor_id(reference),
            |hex| {
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(|id| self.lookup_id(FormId(id)))
            },
        )
    }

    fn record(&self, id: FormId) -> Option<&Record> {
        self.by_id.get(&id).and_then(|&idx| self.records.get(idx))
    }
}

impl RecordStore for MemoryStore {
    fn lookup_editor_id(&self, editor_id: &str) -> Option<FormRef> {
        self.by_editor_id
            .get(&editor_id.to_lowercase())
            .and_then(|&idx| self.records.get(idx))
            .map(|r| r.form)
    }

    fn lookup_id(&self, id: FormId) -> Option<FormRef> {
        self.record(id).map(|r| r.form)
    }

    fn lookup_local(&self, plugin: &str, local_id: u32) -> Option<FormRef> {
        self.by_local
            .get(&(plugin.to_lowercase(), local_id & LOCAL_ID_MASK))
            .and_then(|&idx| self.records.get(idx))
            .map(|r| r.form)
    }

    fn describe(&self, id: FormId) -> String {
        match self.record(id) {
            Some(Record {
                editor_id,
                name: Some(name),
                ..
            }) => format!("{editor_id} \"{name}\" [{id}]"),
            Some(Record { editor_id, .. }) => format!("{editor_id} [{id}]"),
            None => format!("[{id}]"),
        }
    }

    fn forms_of_type(&self, form_type: FormType) -> Vec<FormRef> {
        self.records
            .iter()
            .filter(|r| r.form.form_type == form_type)
            .map(|r| r.form)
            .collect()
    }

    fn has_keyword(&self, form: FormId, keyword: FormId) -> bool {
        self.keywords
            .get(&form)
            .is_some_and(|set| set.contains(&keyword))
    }

    fn list_members(&self, list: FormId) -> Vec<FormRef> {
        self.lists.get(&list).cloned().unwrap_or_default()
    }

    fn list_has(&self, list: FormId, form: FormId) -> bool {
        self.lists
            .get(&list)
            .is_some_and(|members| members.iter().any(|m| m.id == form))
    }

    fn list_add(&mut self, list: FormId, form: FormRef) {
        self.lists.entry(list).or_default().push(form);
    }
}

impl PluginOracle for MemoryStore {
    fn is_loaded(&self, plugin: &str) -> bool {
        self.plugins.contains(&plugin.to_lowercase())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const CATALOGUE: &str = r#"
plugins = ["Skyrim.esm", "Dawnguard.esm"]

[[forms]]
id = 0x0008F95A
editor_id = "VendorItemFood"
type = "keyword"

[[forms]]
id = 0x00064B3F
editor_id = "FoodApple"
name = "Red Apple"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemFood"]

[[forms]]
id = 0x02000801
editor_id = "DLC1Thing"
type = "misc"
plugin = "Dawnguard.esm"

[[forms]]
id = 0x00000100
editor_id = "FoodList"
type = "formlist"
members = ["FoodApple", "0x02000801"]
"#;

    fn store() -> MemoryStore {
        MemoryStore::from_toml_str(CATALOGUE).expect("catalogue should load")
    }

    #[test]
    fn editor_id_lookup_is_case_insensitive() {
        let s = store();
        let apple = s.lookup_editor_id("foodapple").expect("apple");
        assert_eq!(apple.id, FormId(0x0006_4B3F));
        assert_eq!(apple.form_type, FormType::AlchemyItem);
    }

    #[test]
    fn local_lookup_uses_plugin_and_low_bits() {
        let s = store();
        let thing = s.lookup_local("dawnguard.esm", 0x801).expect("thing");
        assert_eq!(thing.id, FormId(0x0200_0801));
        assert!(s.lookup_local("Skyrim.esm", 0x801).is_none());
    }

    #[test]
    fn keywords_and_members_resolve() {
        let s = store();
        assert!(s.has_keyword(FormId(0x0006_4B3F), FormId(0x0008_F95A)));
        let members = s.list_members(FormId(0x100));
        assert_eq!(members.len(), 2);
        assert!(s.list_has(FormId(0x100), FormId(0x0200_0801)));
    }

    #[test]
    fn plugins_are_case_insensitive() {
        let s = store();
        assert!(s.is_loaded("dawnguard.esm"));
        assert!(s.is_loaded("SKYRIM.ESM"));
        assert!(!s.is_loaded("Dragonborn.esm"));
    }

    #[test]
    fn describe_includes_display_name() {
        let s = store();
        assert_eq!(
            s.describe(FormId(0x0006_4B3F)),
            "FoodApple \"Red Apple\" [00064B3F]"
        );
        assert_eq!(s.describe(FormId(0x0200_0801)), "DLC1Thing [02000801]");
        assert_eq!(s.describe(FormId(0xDEAD)), "[0000DEAD]");
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = MemoryStore::from_toml_str(
            "[[forms]]\nid = 1\neditor_id = \"A\"\ntype = \"armor\"\nkeywords = [\"Nope\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown keyword Nope"));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = MemoryStore::from_toml_str(
            "[[forms]]\nid = 1\neditor_id = \"A\"\ntype = \"armor\"\n\n[[forms]]\nid = 1\neditor_id = \"B\"\ntype = \"armor\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate form id"));
    }

    #[test]
    fn members_on_non_list_are_rejected() {
        let err = MemoryStore::from_toml_str(
            "[[forms]]\nid = 1\neditor_id = \"A\"\ntype = \"armor\"\nmembers = [\"A\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a form list"));
    }

    #[test]
    fn load_missing_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(MemoryStore::load(&tmp.path().join("nope.toml")).is_err());
    }

    #[test]
    fn forms_of_type_keeps_insertion_order() {
        let mut s = MemoryStore::new();
        s.insert(3, "C", FormType::Armor, None);
        s.insert(1, "A", FormType::Armor, None);
        s.insert(2, "B", FormType::Weapon, None);
        let ids: Vec<u32> = s
            .forms_of_type(FormType::Armor)
            .iter()
            .map(|f| f.id.0)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
