//! Textual references to record handles.
//!
//! Three grammars are tried in order:
//!
//! 1. `localId~Plugin.esp` looks the local id up inside the named plugin.
//!    A ten-character id (`0x` plus eight digits) has its load-order byte
//!    dropped first, so `0x02000801~Dawnguard.esm` and `0x000801~Dawnguard.esm`
//!    are the same reference.
//! 2. Anything containing `0x` is a fully-qualified id.
//! 3. Everything else is an editor id.
use std::fmt;

use crate::store::{FormId, FormRef, FormRemapper, LOCAL_ID_MASK, RecordStore};

/// Separates a local id from its plugin name.
pub const PLUGIN_SEPARATOR: char = '~';

/// Marks a hexadecimal id.
pub const HEX_PREFIX: &str = "0x";

/// Resolves references against a [`RecordStore`].
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a dyn RecordStore,
    remapper: Option<&'a dyn FormRemapper>,
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &"<dyn RecordStore>")
            .field("remapper", &self.remapper.map(|_| "<dyn FormRemapper>"))
            .finish()
    }
}

impl<'a> Resolver<'a> {
    /// Resolve directly against `store`.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            remapper: None,
        }
    }

    /// Rewrite plugin-scoped references through `remapper` before lookup.
    #[must_use]
    pub const fn with_remapper(mut self, remapper: &'a dyn FormRemapper) -> Self {
        self.remapper = Some(remapper);
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &'a dyn RecordStore {
        self.store
    }

    /// Resolve `reference` to any record.
    ///
    /// Returns `None` when nothing matches or the id is not valid hex.
    #[must_use]
    pub fn find_form(&self, reference: &str) -> Option<FormRef> {
        if let Some((local, plugin)) = reference.split_once(PLUGIN_SEPARATOR) {
            let local_id = parse_local_id(local)?;
            return match self.remapper.and_then(|r| r.remap(plugin, local_id)) {
                Some((plugin, local_id)) => self.store.lookup_local(&plugin, local_id),
                None => self.store.lookup_local(plugin, local_id),
            };
        }
        if reference.contains(HEX_PREFIX) {
            return parse_hex(reference).and_then(|id| self.store.lookup_id(FormId(id)));
        }
        self.store.lookup_editor_id(reference)
    }

    /// Resolve `reference` to a form list.
    ///
    /// Records of any other type resolve to `None`.
    #[must_use]
    pub fn find_list(&self, reference: &str) -> Option<FormRef> {
        self.find_form(reference).filter(|f| f.is_list())
    }
}

/// Parse the local-id half of a `localId~Plugin` reference.
///
/// A ten character id, with or without the `0x` prefix, carries a load-order
/// byte at positions 2 and 3, which is dropped before parsing.
///
/// # Examples
///
/// ```
/// use flm_engine::engine::resolver::parse_local_id;
///
/// assert_eq!(parse_local_id("0x000801"), Some(0x801));
/// assert_eq!(parse_local_id("0x02000801"), Some(0x801));
/// assert_eq!(parse_local_id("0002000801"), Some(0x801));
/// assert_eq!(parse_local_id("801"), Some(0x801));
/// assert_eq!(parse_local_id("zz"), None);
/// ```
#[must_use]
pub fn parse_local_id(raw: &str) -> Option<u32> {
    let trimmed = if raw.len() == 10 {
        format!("{}{}", raw.get(..2)?, raw.get(4..)?)
    } else {
        raw.to_string()
    };
    parse_hex(&trimmed).map(|id| id & LOCAL_ID_MASK)
}

fn parse_hex(raw: &str) -> Option<u32> {
    let digits = raw
        .strip_prefix(HEX_PREFIX)
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::store::{FormType, MemoryStore, MockFormRemapper};
    use mockall::predicate::eq;

    fn store() -> MemoryStore {
        let mut s = MemoryStore::new();
        s.insert(0x0001_2EB7, "Apple", FormType::Ingredient, Some("Skyrim.esm"));
        s.insert(0x0200_0801, "DLC1Thing", FormType::Misc, Some("Dawnguard.esm"));
        s.insert(0x0000_0100, "FoodList", FormType::FormList, Some("Skyrim.esm"));
        // An editor id that looks like a plugin-qualified reference.
        s.insert(0x0000_0200, "0x000801~Dawnguard.esm", FormType::Misc, None);
        s
    }

    #[test]
    fn editor_id_lookup() {
        let s = store();
        let r = Resolver::new(&s);
        assert_eq!(r.find_form("Apple").unwrap().id, FormId(0x0001_2EB7));
        assert!(r.find_form("Pear").is_none());
    }

    #[test]
    fn global_hex_lookup() {
        let s = store();
        let r = Resolver::new(&s);
        assert_eq!(r.find_form("0x12EB7").unwrap().id, FormId(0x0001_2EB7));
        assert!(r.find_form("0xZZ").is_none());
    }

    #[test]
    fn plugin_scoped_lookup_wins_over_editor_id() {
        let s = store();
        let r = Resolver::new(&s);
        let found = r.find_form("0x000801~Dawnguard.esm").unwrap();
        assert_eq!(found.id, FormId(0x0200_0801));
    }

    #[test]
    fn ten_character_local_id_drops_load_order_byte() {
        let s = store();
        let r = Resolver::new(&s);
        assert_eq!(
            r.find_form("0x02000801~Dawnguard.esm").unwrap().id,
            FormId(0x0200_0801)
        );
        assert_eq!(
            r.find_form("0xFF000801~Dawnguard.esm").unwrap().id,
            FormId(0x0200_0801)
        );
    }

    #[test]
    fn ten_character_local_id_without_prefix() {
        let s = store();
        let r = Resolver::new(&s);
        assert_eq!(
            r.find_form("0002000801~Dawnguard.esm").unwrap().id,
            FormId(0x0200_0801)
        );
        assert_eq!(parse_local_id("FF02000801"), Some(0x801));
    }

    #[test]
    fn plugin_scoped_lookup_in_wrong_plugin_fails() {
        let s = store();
        let r = Resolver::new(&s);
        assert!(r.find_form("0x000801~Skyrim.esm").is_none());
    }

    #[test]
    fn find_list_rejects_other_types() {
        let s = store();
        let r = Resolver::new(&s);
        assert!(r.find_list("FoodList").is_some());
        assert!(r.find_list("Apple").is_none());
    }

    #[test]
    fn remapper_rewrites_plugin_references() {
        let s = store();
        let mut remapper = MockFormRemapper::new();
        remapper
            .expect_remap()
            .with(eq("Merged.esp"), eq(0x123))
            .returning(|_, _| Some(("Dawnguard.esm".to_string(), 0x801)));
        let r = Resolver::new(&s).with_remapper(&remapper);
        assert_eq!(
            r.find_form("0x123~Merged.esp").unwrap().id,
            FormId(0x0200_0801)
        );
    }

    #[test]
    fn remapper_returning_none_keeps_reference() {
        let s = store();
        let mut remapper = MockFormRemapper::new();
        remapper.expect_remap().returning(|_, _| None);
        let r = Resolver::new(&s).with_remapper(&remapper);
        assert!(r.find_form("0x000801~Dawnguard.esm").is_some());
    }

    #[test]
    fn local_id_parsing() {
        assert_eq!(parse_local_id("0x12EB7"), Some(0x1_2EB7));
        assert_eq!(parse_local_id("0x"), None);
        assert_eq!(parse_local_id(""), None);
    }
}
