//! Record store abstractions.
//!
//! The engine never owns records. It holds lightweight [`FormRef`] handles and
//! asks an injected [`RecordStore`] for everything else: name lookups, keyword
//! membership, and reads and appends on form lists. Plugin presence is a
//! separate capability ([`PluginOracle`]) used only by filters.
pub mod memory;

use std::fmt;

use serde::Deserialize;

pub use memory::MemoryStore;

/// Fully-qualified form identifier (load-order byte plus local id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub u32);

impl FormId {
    /// The plugin-relative part of the id (lower 24 bits).
    #[must_use]
    pub const fn local(self) -> u32 {
        self.0 & LOCAL_ID_MASK
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Mask selecting the plugin-relative part of a form id.
pub const LOCAL_ID_MASK: u32 = 0x00FF_FFFF;

/// Record category.
///
/// The first twenty variants are the categories a keyword collection may be
/// declared over; the rest exist so stores can describe every record the
/// engine touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// Wearable armor.
    Armor,
    /// Weapon.
    Weapon,
    /// Arrows and bolts.
    Ammo,
    /// Magic effect.
    MagicEffect,
    /// Potions and food.
    AlchemyItem,
    /// Scroll.
    Scroll,
    /// Location.
    Location,
    /// Alchemy ingredient.
    Ingredient,
    /// Book.
    Book,
    /// Miscellaneous item.
    Misc,
    /// Key.
    Key,
    /// Soul gem.
    SoulGem,
    /// Activator.
    Activator,
    /// Harvestable flora.
    Flora,
    /// Furniture.
    Furniture,
    /// Playable or non-playable race.
    Race,
    /// Talking activator.
    TalkingActivator,
    /// Enchantment.
    Enchantment,
    /// Actor base.
    Npc,
    /// Spell.
    Spell,
    /// Keyword record.
    Keyword,
    /// Form list.
    FormList,
    /// Harvestable tree.
    Tree,
    /// Container.
    Container,
    /// Anything else.
    Other,
}

impl FormType {
    /// Categories accepted by `collection` declarations, in config spelling.
    pub const COLLECTABLE: [(&'static str, Self); 20] = [
        ("armor", Self::Armor),
        ("weapon", Self::Weapon),
        ("ammo", Self::Ammo),
        ("magiceffect", Self::MagicEffect),
        ("alchemyitem", Self::AlchemyItem),
        ("scroll", Self::Scroll),
        ("location", Self::Location),
        ("ingredient", Self::Ingredient),
        ("book", Self::Book),
        ("misc", Self::Misc),
        ("key", Self::Key),
        ("soulgem", Self::SoulGem),
        ("activator", Self::Activator),
        ("flora", Self::Flora),
        ("furniture", Self::Furniture),
        ("race", Self::Race),
        ("talkingactivator", Self::TalkingActivator),
        ("enchantment", Self::Enchantment),
        ("npc", Self::Npc),
        ("spell", Self::Spell),
    ];

    /// Look up a collectable category by its case-insensitive config name.
    ///
    /// # Examples
    ///
    /// ```
    /// use flm_engine::store::FormType;
    ///
    /// assert_eq!(FormType::from_category("Armor"), Some(FormType::Armor));
    /// assert_eq!(FormType::from_category("keyword"), None);
    /// ```
    #[must_use]
    pub fn from_category(name: &str) -> Option<Self> {
        Self::COLLECTABLE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, t)| t)
    }
}

/// Opaque handle to a record owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormRef {
    /// Fully-qualified id.
    pub id: FormId,
    /// Record category.
    pub form_type: FormType,
}

impl FormRef {
    /// Whether the record is a form list.
    #[must_use]
    pub fn is_list(self) -> bool {
        self.form_type == FormType::FormList
    }
}

/// External record database.
///
/// Lookups return `None` instead of failing; callers decide which counter a
/// miss affects. Form lists are mutated in place through [`list_add`](Self::list_add).
pub trait RecordStore {
    /// Find a record by its editor id.
    fn lookup_editor_id(&self, editor_id: &str) -> Option<FormRef>;

    /// Find a record by fully-qualified id.
    fn lookup_id(&self, id: FormId) -> Option<FormRef>;

    /// Find a record by plugin-relative id within `plugin`.
    fn lookup_local(&self, plugin: &str, local_id: u32) -> Option<FormRef>;

    /// Human-readable description used in log lines.
    fn describe(&self, id: FormId) -> String;

    /// Every record of one category, in a stable order.
    fn forms_of_type(&self, form_type: FormType) -> Vec<FormRef>;

    /// Whether `form` carries `keyword`.
    fn has_keyword(&self, form: FormId, keyword: FormId) -> bool;

    /// Current members of a form list.
    fn list_members(&self, list: FormId) -> Vec<FormRef>;

    /// Whether a form list already contains `form`.
    fn list_has(&self, list: FormId, form: FormId) -> bool;

    /// Append `form` to a form list.
    fn list_add(&mut self, list: FormId, form: FormRef);
}

/// Answers whether a plugin is installed and active.
#[cfg_attr(test, mockall::automock)]
pub trait PluginOracle {
    /// `plugin` is compared case-insensitively.
    fn is_loaded(&self, plugin: &str) -> bool;
}

/// Rewrites plugin-scoped references for merged or mirrored plugins.
#[cfg_attr(test, mockall::automock)]
pub trait FormRemapper {
    /// Return the replacement `(plugin, local_id)`, or `None` to keep the input.
    fn remap(&self, plugin: &str, local_id: u32) -> Option<(String, u32)>;
}
