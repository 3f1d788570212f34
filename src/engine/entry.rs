//! Config entry kinds and the pass each one runs in.
use std::fmt;

/// Loader pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pass {
    /// Filters, then collections, then collection population.
    Declarations,
    /// Aliases, then groups.
    Names,
    /// Every other entry kind.
    Entries,
}

/// One recognised config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `alias = name|lists`
    Alias,
    /// `group = name|items`
    Group,
    /// `collection = name|category|keywords[|filter]`
    Collection,
    /// `filter = name|expression`
    Filter,
    /// `modevent = event|destination|items`
    ModEvent,
    /// `formlist = destination|items[|filter]`
    FormList,
    /// `plant = seed|plant[|filter]`
    Plant,
    /// `btoys = items[|filter]`
    BoyToys,
    /// `gtoys = items[|filter]`
    GirlToys,
    /// `haircolors = items[|filter]`
    HairColors,
    /// `atronachforge = recipe|result[|filter]`
    AtronachForge,
    /// `atronachforgesigil = recipe|result[|filter]`
    AtronachForgeSigil,
    /// `dragonbornspidercrafting = recipe|result[|filter]`
    SpiderCrafting,
}

impl EntryKind {
    /// Every kind, in the order they are dispatched within their pass.
    pub const ALL: [Self; 13] = [
        Self::Filter,
        Self::Collection,
        Self::Alias,
        Self::Group,
        Self::ModEvent,
        Self::FormList,
        Self::Plant,
        Self::BoyToys,
        Self::GirlToys,
        Self::HairColors,
        Self::AtronachForge,
        Self::AtronachForgeSigil,
        Self::SpiderCrafting,
    ];

    /// Config key, lowercase.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::Group => "group",
            Self::Collection => "collection",
            Self::Filter => "filter",
            Self::ModEvent => "modevent",
            Self::FormList => "formlist",
            Self::Plant => "plant",
            Self::BoyToys => "btoys",
            Self::GirlToys => "gtoys",
            Self::HairColors => "haircolors",
            Self::AtronachForge => "atronachforge",
            Self::AtronachForgeSigil => "atronachforgesigil",
            Self::SpiderCrafting => "dragonbornspidercrafting",
        }
    }

    /// Name used in log messages and errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alias => "Alias",
            Self::Group => "Group",
            Self::Collection => "Collection",
            Self::Filter => "Filter",
            Self::ModEvent => "Mod Event",
            Self::FormList => "FormList",
            Self::Plant => "Plant",
            Self::BoyToys => "Boy's Toys",
            Self::GirlToys => "Girl's Toys",
            Self::HairColors => "Hair Colors",
            Self::AtronachForge => "Atronach Forge",
            Self::AtronachForgeSigil => "Atronach Forge with Sigil Stone",
            Self::SpiderCrafting => "Dragonborn Spider Crafting",
        }
    }

    /// Parse a config key, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use flm_engine::engine::entry::EntryKind;
    ///
    /// assert_eq!(EntryKind::from_key("FormList"), Some(EntryKind::FormList));
    /// assert_eq!(EntryKind::from_key("fromlist"), None);
    /// ```
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.keyword().eq_ignore_ascii_case(key.trim()))
    }

    /// The loader pass this kind is parsed in.
    #[must_use]
    pub const fn pass(self) -> Pass {
        match self {
            Self::Filter | Self::Collection => Pass::Declarations,
            Self::Alias | Self::Group => Pass::Names,
            _ => Pass::Entries,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_round_trips() {
        for kind in EntryKind::ALL {
            assert_eq!(EntryKind::from_key(kind.keyword()), Some(kind));
            assert_eq!(
                EntryKind::from_key(&kind.keyword().to_uppercase()),
                Some(kind)
            );
        }
    }

    #[test]
    fn passes_follow_declaration_order() {
        assert_eq!(EntryKind::Filter.pass(), Pass::Declarations);
        assert_eq!(EntryKind::Collection.pass(), Pass::Declarations);
        assert_eq!(EntryKind::Alias.pass(), Pass::Names);
        assert_eq!(EntryKind::Group.pass(), Pass::Names);
        assert_eq!(EntryKind::FormList.pass(), Pass::Entries);
        assert_eq!(EntryKind::ModEvent.pass(), Pass::Entries);
        assert!(Pass::Declarations < Pass::Names && Pass::Names < Pass::Entries);
    }

    #[test]
    fn filter_runs_before_collection_within_pass() {
        let order: Vec<_> = EntryKind::ALL
            .iter()
            .filter(|k| k.pass() == Pass::Declarations)
            .collect();
        assert_eq!(order, vec![&EntryKind::Filter, &EntryKind::Collection]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(EntryKind::from_key(""), None);
        assert_eq!(EntryKind::from_key("toys"), None);
    }
}
