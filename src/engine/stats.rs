//! Statistics counters and the summary renderer.
use std::fmt;

use serde::ser::{Serialize, SerializeMap as _, Serializer};

use super::OperatingMode;
use crate::logging::header_line;

macro_rules! counters {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// Named statistics counter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Counter {
            $(
                #[doc = concat!("`", $key, "`")]
                $variant,
            )+
        }

        impl Counter {
            /// Every counter, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable snake_case key used in machine-readable output.
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }
    };
}

counters! {
    ConfigsValid => "configs_valid",
    ConfigsInvalid => "configs_invalid",
    EntriesValid => "entries_valid",
    EntriesInvalid => "entries_invalid",
    EntriesFilteredOut => "entries_filtered_out",
    AliasesDuplicate => "aliases_duplicate",
    AliasesNotFound => "aliases_not_found",
    GroupsDuplicate => "groups_duplicate",
    GroupsNotFound => "groups_not_found",
    CollectionsDuplicate => "collections_duplicate",
    CollectionsNotFound => "collections_not_found",
    FiltersDuplicate => "filters_duplicate",
    FiltersNotFound => "filters_not_found",
    FormListsMissing => "form_lists_missing",
    Forms => "forms",
    FormsMissing => "forms_missing",
    FormsAdded => "forms_added",
    FormsDuplicate => "forms_duplicate",
    PlantsAdded => "plants_added",
    PlantsDuplicate => "plants_duplicate",
    BoyToysAdded => "boy_toys_added",
    BoyToysDuplicate => "boy_toys_duplicate",
    GirlToysAdded => "girl_toys_added",
    GirlToysDuplicate => "girl_toys_duplicate",
    HairColorsAdded => "hair_colors_added",
    HairColorsDuplicate => "hair_colors_duplicate",
    AtronachForgeAdded => "atronach_forge_added",
    AtronachForgeDuplicate => "atronach_forge_duplicate",
    AtronachSigilAdded => "atronach_sigil_added",
    AtronachSigilDuplicate => "atronach_sigil_duplicate",
    SpiderCraftingAdded => "spider_crafting_added",
    SpiderCraftingDuplicate => "spider_crafting_duplicate",
    ModEvents => "mod_events",
    ModEventsInvalid => "mod_events_invalid",
}

/// `(added, duplicate)` counter pairs written by the merge step.
pub const MERGE_COUNTERS: [(Counter, Counter); 8] = [
    (Counter::FormsAdded, Counter::FormsDuplicate),
    (Counter::PlantsAdded, Counter::PlantsDuplicate),
    (Counter::BoyToysAdded, Counter::BoyToysDuplicate),
    (Counter::GirlToysAdded, Counter::GirlToysDuplicate),
    (Counter::HairColorsAdded, Counter::HairColorsDuplicate),
    (Counter::AtronachForgeAdded, Counter::AtronachForgeDuplicate),
    (Counter::AtronachSigilAdded, Counter::AtronachSigilDuplicate),
    (Counter::SpiderCraftingAdded, Counter::SpiderCraftingDuplicate),
];

/// Flat table of counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    counts: Vec<usize>,
}

impl Stats {
    /// All counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: vec![0; Counter::ALL.len()],
        }
    }

    /// Current value of `counter`.
    #[must_use]
    pub fn get(&self, counter: Counter) -> usize {
        self.counts.get(counter as usize).copied().unwrap_or(0)
    }

    /// Add one to `counter`.
    pub fn incr(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    /// Add `n` to `counter`.
    pub fn add(&mut self, counter: Counter, n: usize) {
        if let Some(slot) = self.counts.get_mut(counter as usize) {
            *slot += n;
        }
    }

    /// Zero every added/duplicate counter before a merge pass.
    pub fn reset_merge(&mut self) {
        for (added, duplicate) in MERGE_COUNTERS {
            for c in [added, duplicate] {
                if let Some(slot) = self.counts.get_mut(c as usize) {
                    *slot = 0;
                }
            }
        }
    }

    /// Total records added across all merge targets.
    #[must_use]
    pub fn total_added(&self) -> usize {
        MERGE_COUNTERS.iter().map(|&(a, _)| self.get(a)).sum()
    }

    /// Total duplicates skipped across all merge targets.
    #[must_use]
    pub fn total_duplicates(&self) -> usize {
        MERGE_COUNTERS.iter().map(|&(_, d)| self.get(d)).sum()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Counter::ALL.len()))?;
        for &counter in Counter::ALL {
            map.serialize_entry(counter.key(), &self.get(counter))?;
        }
        map.end()
    }
}

/// Sizes of the declaration tables, reported alongside the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSizes {
    /// Destination lists with pending records.
    pub form_lists: usize,
    /// Declared aliases.
    pub aliases: usize,
    /// Declared groups.
    pub groups: usize,
    /// Declared collections.
    pub collections: usize,
    /// Declared filters.
    pub filters: usize,
}

/// One rendered summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLine {
    /// A dashed section header.
    Header(String),
    /// A plain text line.
    Text(String),
}

/// End-of-run report for one operating mode.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    stats: &'a Stats,
    sizes: TableSizes,
    mode: OperatingMode,
}

impl<'a> Summary<'a> {
    /// Prepare a summary of `stats`.
    #[must_use]
    pub const fn new(stats: &'a Stats, sizes: TableSizes, mode: OperatingMode) -> Self {
        Self { stats, sizes, mode }
    }

    /// Render the report line by line.
    ///
    /// Initialize mode includes the parsing statistics; the replay modes only
    /// show a mode banner, the merge results and a grand total.
    #[must_use]
    pub fn lines(&self) -> Vec<SummaryLine> {
        use Counter as C;
        let s = self.stats;
        let z = &self.sizes;
        let mut out = Vec::new();
        let total_dup = s.total_duplicates();

        match self.mode {
            OperatingMode::Initialize => {
                out.push(SummaryLine::Header("SUMMARY".to_string()));
                out.push(SummaryLine::Text(format!(
                    "{} valid configs, {} invalid. {} total entries, {} valid, {} invalid, {} filtered out.",
                    s.get(C::ConfigsValid),
                    s.get(C::ConfigsInvalid),
                    s.get(C::EntriesValid) + s.get(C::EntriesInvalid),
                    s.get(C::EntriesValid),
                    s.get(C::EntriesInvalid),
                    s.get(C::EntriesFilteredOut),
                )));
                out.push(SummaryLine::Text(format!(
                    "{} form lists, {} valid, {} missing. {} total forms, {} unique, {} missing, {} duplicates.",
                    z.form_lists + s.get(C::FormListsMissing),
                    z.form_lists,
                    s.get(C::FormListsMissing),
                    s.get(C::Forms) + s.get(C::FormsMissing),
                    s.get(C::Forms).saturating_sub(total_dup),
                    s.get(C::FormsMissing),
                    total_dup,
                )));
                out.push(SummaryLine::Text(format!(
                    "{} aliases added, {} duplicates, {} not existing.",
                    z.aliases,
                    s.get(C::AliasesDuplicate),
                    s.get(C::AliasesNotFound),
                )));
                for (what, size, dup, missing) in [
                    ("groups", z.groups, C::GroupsDuplicate, C::GroupsNotFound),
                    (
                        "collections",
                        z.collections,
                        C::CollectionsDuplicate,
                        C::CollectionsNotFound,
                    ),
                    ("filters", z.filters, C::FiltersDuplicate, C::FiltersNotFound),
                ] {
                    out.push(SummaryLine::Text(format!(
                        "{size} {what} added, {} duplicates, {} not existing/invalid.",
                        s.get(dup),
                        s.get(missing),
                    )));
                }
                out.push(SummaryLine::Text(format!(
                    "{} new mod events added, skipped {} invalid.",
                    s.get(C::ModEvents),
                    s.get(C::ModEventsInvalid),
                )));
            }
            OperatingMode::NewGame | OperatingMode::LoadGame => {
                out.push(SummaryLine::Header(String::new()));
                out.push(SummaryLine::Header(self.mode.banner().to_string()));
            }
        }

        for (label, added, dup) in [
            ("plants", C::PlantsAdded, C::PlantsDuplicate),
            ("Boy's Toys", C::BoyToysAdded, C::BoyToysDuplicate),
            ("Girl's Toys", C::GirlToysAdded, C::GirlToysDuplicate),
            ("Hair Colors", C::HairColorsAdded, C::HairColorsDuplicate),
            (
                "Atronach Forge recipes",
                C::AtronachForgeAdded,
                C::AtronachForgeDuplicate,
            ),
            (
                "Atronach Forge recipes with Sigil Stone",
                C::AtronachSigilAdded,
                C::AtronachSigilDuplicate,
            ),
            (
                "Dragonborn Spider Crafting recipes",
                C::SpiderCraftingAdded,
                C::SpiderCraftingDuplicate,
            ),
        ] {
            out.push(SummaryLine::Text(format!(
                "{} new {label} added, skipped {} duplicates.",
                s.get(added),
                s.get(dup),
            )));
        }
        out.push(SummaryLine::Text(format!(
            "{} new forms added to {} form lists, skipped {} duplicates.",
            s.get(C::FormsAdded),
            z.form_lists,
            s.get(C::FormsDuplicate),
        )));

        if self.mode != OperatingMode::Initialize {
            out.push(SummaryLine::Text(format!(
                "Total {} new forms added, skipped {total_dup} duplicates.",
                s.total_added(),
            )));
        }
        out.push(SummaryLine::Header(String::new()));
        out
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            match line {
                SummaryLine::Header(title) => writeln!(f, "{}", header_line(&title))?,
                SummaryLine::Text(text) => writeln!(f, "{text}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = Stats::new();
        assert!(Counter::ALL.iter().all(|&c| stats.get(c) == 0));
    }

    #[test]
    fn default_stats_are_usable() {
        let mut stats = Stats::default();
        stats.incr(Counter::ModEvents);
        assert_eq!(stats.get(Counter::ModEvents), 1);
    }

    #[test]
    fn reset_merge_keeps_parse_counters() {
        let mut stats = Stats::new();
        stats.add(Counter::EntriesValid, 5);
        stats.add(Counter::FormsAdded, 3);
        stats.add(Counter::PlantsDuplicate, 2);
        stats.reset_merge();
        assert_eq!(stats.get(Counter::EntriesValid), 5);
        assert_eq!(stats.get(Counter::FormsAdded), 0);
        assert_eq!(stats.get(Counter::PlantsDuplicate), 0);
    }

    #[test]
    fn totals_sum_every_merge_target() {
        let mut stats = Stats::new();
        stats.add(Counter::FormsAdded, 2);
        stats.add(Counter::HairColorsAdded, 1);
        stats.add(Counter::SpiderCraftingDuplicate, 4);
        assert_eq!(stats.total_added(), 3);
        assert_eq!(stats.total_duplicates(), 4);
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<&str> = Counter::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Counter::ALL.len());
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut stats = Stats::new();
        stats.add(Counter::Forms, 4);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["forms"], 4);
        assert_eq!(json["configs_valid"], 0);
    }

    #[test]
    fn load_game_summary() {
        let mut stats = Stats::new();
        stats.add(Counter::FormsAdded, 2);
        stats.add(Counter::FormsDuplicate, 1);
        stats.add(Counter::PlantsAdded, 1);
        let sizes = TableSizes {
            form_lists: 1,
            ..TableSizes::default()
        };
        let rendered = Summary::new(&stats, sizes, OperatingMode::LoadGame).to_string();
        insta::assert_snapshot!(rendered, @r"
        -----------------------------------------------
        -----GAME LOADED - SYNCHRONIZES FORM LISTS-----
        1 new plants added, skipped 0 duplicates.
        0 new Boy's Toys added, skipped 0 duplicates.
        0 new Girl's Toys added, skipped 0 duplicates.
        0 new Hair Colors added, skipped 0 duplicates.
        0 new Atronach Forge recipes added, skipped 0 duplicates.
        0 new Atronach Forge recipes with Sigil Stone added, skipped 0 duplicates.
        0 new Dragonborn Spider Crafting recipes added, skipped 0 duplicates.
        2 new forms added to 1 form lists, skipped 1 duplicates.
        Total 3 new forms added, skipped 1 duplicates.
        -----------------------------------------------
        ");
    }

    #[test]
    fn initialize_summary_reports_parsing() {
        let mut stats = Stats::new();
        stats.add(Counter::ConfigsValid, 2);
        stats.add(Counter::EntriesValid, 7);
        stats.add(Counter::EntriesInvalid, 1);
        stats.add(Counter::EntriesFilteredOut, 2);
        let lines = Summary::new(&stats, TableSizes::default(), OperatingMode::Initialize).lines();
        assert_eq!(lines[0], SummaryLine::Header("SUMMARY".to_string()));
        assert_eq!(
            lines[1],
            SummaryLine::Text(
                "2 valid configs, 0 invalid. 8 total entries, 7 valid, 1 invalid, 2 filtered out."
                    .to_string()
            )
        );
        assert!(
            !lines
                .iter()
                .any(|l| matches!(l, SummaryLine::Text(t) if t.starts_with("Total"))),
            "initialize mode has no grand total line"
        );
    }
}
