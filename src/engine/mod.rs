//! The form list engine.
//!
//! An [`Engine`] owns every table built from the configs (aliases, groups,
//! collections, filters), the accumulated buckets, the mod-event payloads
//! and the statistics. The host drives it through a short lifecycle:
//!
//! 1. [`Engine::find_lists`] locates the fixed target lists.
//! 2. [`Engine::find_all`] parses every config source.
//! 3. [`Engine::add_all`] merges the buckets into the store.
//! 4. On every new game or game load, [`Engine::set_mode`] and
//!    [`Engine::add_all`] again, which only adds what went missing.
pub mod collection;
pub mod entry;
pub mod events;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod parser;
pub mod resolver;
pub mod stats;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::settings::TargetEditorIds;
use crate::logging::Log;
use crate::store::{FormId, FormRef, FormRemapper, PluginOracle, RecordStore};
use collection::Collections;
use events::{DONE_EVENT, EventNotifier, ModEvents};
use filter::FilterTable;
use loader::SourceReport;
use merge::{Buckets, MergeStyle, Merger, Tally, Target};
use resolver::Resolver;
use stats::{Counter, Stats, Summary, SummaryLine, TableSizes};

/// Which lifecycle event the engine is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// First load: verbose logs and the full summary.
    #[default]
    Initialize,
    /// A new game was started.
    NewGame,
    /// A saved game was loaded.
    LoadGame,
}

impl OperatingMode {
    /// Whether per-record and per-section logging is suppressed.
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        !matches!(self, Self::Initialize)
    }

    /// Header shown above a replay summary.
    #[must_use]
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Initialize => "SUMMARY",
            Self::NewGame => "NEW GAME - SYNCHRONIZES FORM LISTS",
            Self::LoadGame => "GAME LOADED - SYNCHRONIZES FORM LISTS",
        }
    }
}

/// Read-only collaborators needed while parsing.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    /// Record database.
    pub store: &'a dyn RecordStore,
    /// Installed plugin list.
    pub plugins: &'a dyn PluginOracle,
    /// Optional rewrite of plugin-scoped references.
    pub remapper: Option<&'a dyn FormRemapper>,
}

impl fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("store", &"<dyn RecordStore>")
            .field("plugins", &"<dyn PluginOracle>")
            .field("remapper", &self.remapper.map(|_| "<dyn FormRemapper>"))
            .finish()
    }
}

impl<'a> Host<'a> {
    /// Bundle a store and a plugin oracle.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore, plugins: &'a dyn PluginOracle) -> Self {
        Self {
            store,
            plugins,
            remapper: None,
        }
    }

    /// Route plugin-scoped references through `remapper`.
    #[must_use]
    pub const fn with_remapper(mut self, remapper: &'a dyn FormRemapper) -> Self {
        self.remapper = Some(remapper);
        self
    }

    /// Resolver over this host's store.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'a> {
        let resolver = Resolver::new(self.store);
        match self.remapper {
            Some(remapper) => resolver.with_remapper(remapper),
            None => resolver,
        }
    }
}

/// Config-driven form list aggregator.
pub struct Engine {
    mode: OperatingMode,
    debug: bool,
    targets: TargetEditorIds,
    lists: BTreeMap<Target, FormId>,
    aliases: BTreeMap<String, Vec<FormRef>>,
    groups: BTreeMap<String, Vec<FormRef>>,
    collections: Collections,
    filters: FilterTable,
    buckets: Buckets,
    mod_events: ModEvents,
    stats: Stats,
    reports: Vec<SourceReport>,
    log: Arc<dyn Log>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.mode)
            .field("debug", &self.debug)
            .field("lists", &self.lists)
            .field("aliases", &self.aliases.len())
            .field("groups", &self.groups.len())
            .field("collections", &self.collections.len())
            .field("filters", &self.filters.len())
            .field("mod_events", &self.mod_events.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine in [`OperatingMode::Initialize`] with default
    /// target list editor ids.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self {
            mode: OperatingMode::Initialize,
            debug: false,
            targets: TargetEditorIds::default(),
            lists: BTreeMap::new(),
            aliases: BTreeMap::new(),
            groups: BTreeMap::new(),
            collections: Collections::new(),
            filters: FilterTable::new(),
            buckets: Buckets::default(),
            mod_events: ModEvents::new(),
            stats: Stats::new(),
            reports: Vec::new(),
            log,
        }
    }

    /// Use `targets` instead of the default target list editor ids.
    #[must_use]
    pub fn with_targets(mut self, targets: TargetEditorIds) -> Self {
        self.targets = targets;
        self
    }

    /// Start with debug output on or off.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Current operating mode.
    #[must_use]
    pub const fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Switch the operating mode before a replay merge.
    pub const fn set_mode(&mut self, mode: OperatingMode) {
        self.mode = mode;
    }

    /// Whether debug output is on.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Turn debug output on or off.
    pub const fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Per-source tallies from the last [`find_all`](Self::find_all).
    #[must_use]
    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    /// Accumulated buckets.
    #[must_use]
    pub const fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// Registered mod events.
    #[must_use]
    pub const fn mod_events(&self) -> &ModEvents {
        &self.mod_events
    }

    /// Lists of a declared alias.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&[FormRef]> {
        self.aliases.get(name).map(Vec::as_slice)
    }

    /// Records of a declared group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&[FormRef]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Declared collections.
    #[must_use]
    pub const fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Declared filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Located target list, if it exists in the store.
    #[must_use]
    pub fn target_list(&self, target: Target) -> Option<FormId> {
        self.lists.get(&target).copied()
    }

    /// Sizes of the declaration tables.
    #[must_use]
    pub fn table_sizes(&self) -> TableSizes {
        TableSizes {
            form_lists: self.buckets.form_lists.len(),
            aliases: self.aliases.len(),
            groups: self.groups.len(),
            collections: self.collections.len(),
            filters: self.filters.len(),
        }
    }

    /// Summary of the current counters for the current mode.
    #[must_use]
    pub fn summary(&self) -> Summary<'_> {
        Summary::new(&self.stats, self.table_sizes(), self.mode)
    }

    /// Locate every fixed target list by editor id.
    ///
    /// Missing lists are logged; their buckets are skipped at merge time.
    pub fn find_lists(&mut self, store: &dyn RecordStore) {
        self.lists.clear();
        for target in Target::ALL {
            let editor_id = target.editor_id(&self.targets);
            match store.lookup_editor_id(editor_id).filter(|f| f.is_list()) {
                Some(list) => {
                    self.lists.insert(target, list.id);
                }
                None => self
                    .log
                    .error(&format!("Unable to find list: {editor_id}.")),
            }
        }
    }

    /// Merge every bucket into `store` and log the summary.
    ///
    /// Safe to call repeatedly: records already present are counted as
    /// duplicates and left alone.
    pub fn add_all(&mut self, store: &mut dyn RecordStore) {
        self.stats.reset_merge();
        let style = MergeStyle::for_mode(self.mode, self.debug);
        let log = Arc::clone(&self.log);
        let mut merger = Merger::new(store, log.as_ref(), style);
        let b = &self.buckets;
        let lists = &self.lists;
        let stats = &mut self.stats;
        let pair = |first: Target, second: Target| {
            lists.get(&first).copied().zip(lists.get(&second).copied())
        };

        if let Some(targets) = pair(Target::Seeds, Target::Plants) {
            let tally = merger.merge_pairs("PLANTS", ("Seed", "Plant"), targets, &b.plants);
            record(stats, Counter::PlantsAdded, Counter::PlantsDuplicate, tally);
        }
        for (header, what, target, forms, added, duplicate) in [
            (
                "BOY'S TOYS",
                "Boy's Toy",
                Target::BoyToys,
                &b.boy_toys,
                Counter::BoyToysAdded,
                Counter::BoyToysDuplicate,
            ),
            (
                "GIRL'S TOYS",
                "Girl's Toy",
                Target::GirlToys,
                &b.girl_toys,
                Counter::GirlToysAdded,
                Counter::GirlToysDuplicate,
            ),
            (
                "HAIR COLORS",
                "Hair Color",
                Target::HairColors,
                &b.hair_colors,
                Counter::HairColorsAdded,
                Counter::HairColorsDuplicate,
            ),
        ] {
            if let Some(&list) = lists.get(&target) {
                let tally = merger.merge_list(header, what, list, forms);
                record(stats, added, duplicate, tally);
            }
        }
        for (header, (first, second), pairs, added, duplicate) in [
            (
                "ATRONACH FORGE",
                (Target::ForgeRecipes, Target::ForgeResults),
                &b.atronach_forge,
                Counter::AtronachForgeAdded,
                Counter::AtronachForgeDuplicate,
            ),
            (
                "ATRONACH FORGE WITH SIGIL STONE",
                (Target::SigilRecipes, Target::SigilResults),
                &b.atronach_forge_sigil,
                Counter::AtronachSigilAdded,
                Counter::AtronachSigilDuplicate,
            ),
            (
                "DRAGONBORN SPIDER CRAFTING",
                (Target::SpiderRecipes, Target::SpiderResults),
                &b.spider_crafting,
                Counter::SpiderCraftingAdded,
                Counter::SpiderCraftingDuplicate,
            ),
        ] {
            if let Some(targets) = pair(first, second) {
                let tally = merger.merge_pairs(header, ("Recipe", "Result"), targets, pairs);
                record(stats, added, duplicate, tally);
            }
        }

        let tally = merger.merge_form_lists(&b.form_lists);
        record(stats, Counter::FormsAdded, Counter::FormsDuplicate, tally);

        self.log_summary();
    }

    /// Merge the payload registered for `event` and reply with
    /// `<event>OK`.
    ///
    /// Returns `false`, doing nothing, when no entry registered `event`.
    pub fn handle_mod_event(
        &self,
        event: &str,
        store: &mut dyn RecordStore,
        notifier: &dyn EventNotifier,
    ) -> bool {
        let Some(payload) = self.mod_events.get(event) else {
            return false;
        };
        self.log.info(&format!("Got event: {event}."));
        let style = MergeStyle::for_mode(OperatingMode::Initialize, self.debug);
        let tally = Merger::new(store, self.log.as_ref(), style).merge_form_lists(payload);
        let (reply, arg) = events::reply(event, tally);
        notifier.send(&reply, &arg, events::count_arg(tally.added));
        self.log.info(&format!("Sent event: {reply}."));
        true
    }

    /// Tell listeners that the initial merge is complete.
    pub fn send_done(&self, notifier: &dyn EventNotifier) {
        let stats = &self.stats;
        let arg = format!("{}|{}", stats.total_added(), stats.total_duplicates());
        notifier.send(DONE_EVENT, &arg, events::count_arg(stats.total_added()));
        self.log.info(&format!("Sent event: {DONE_EVENT}."));
    }

    /// Log the summary for the current mode.
    pub fn log_summary(&self) {
        for line in self.summary().lines() {
            match line {
                SummaryLine::Header(title) => self.log.stage(&title),
                SummaryLine::Text(text) => self.log.info(&text),
            }
        }
    }
}

fn record(stats: &mut Stats, added: Counter, duplicate: Counter, tally: Tally) {
    stats.add(added, tally.added);
    stats.add(duplicate, tally.duplicates);
}
