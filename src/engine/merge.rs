//! Committing accumulated records into form lists.
//!
//! Every append is preceded by a membership check against the destination,
//! so a merge can be replayed any number of times: records already present
//! are counted as duplicates and skipped.
use std::collections::BTreeMap;

use super::OperatingMode;
use crate::config::settings::TargetEditorIds;
use crate::logging::{Log, indented};
use crate::store::{FormId, FormRef, RecordStore};

/// Pending records keyed by destination list.
pub type FormLists = BTreeMap<FormId, Vec<FormRef>>;

/// A record pair that must be appended together.
pub type FormPair = (FormRef, FormRef);

/// One of the fixed lists the simplified entry kinds merge into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// Seeds accepted by planters.
    Seeds,
    /// Plants grown from the seeds.
    Plants,
    /// Gifts for adopted boys.
    BoyToys,
    /// Gifts for adopted girls.
    GirlToys,
    /// Hair colors.
    HairColors,
    /// Atronach Forge recipes.
    ForgeRecipes,
    /// Atronach Forge results.
    ForgeResults,
    /// Atronach Forge sigil recipes.
    SigilRecipes,
    /// Atronach Forge sigil results.
    SigilResults,
    /// Spider crafting recipes.
    SpiderRecipes,
    /// Spider crafting results.
    SpiderResults,
}

impl Target {
    /// Every target, in lookup order.
    pub const ALL: [Self; 11] = [
        Self::Seeds,
        Self::Plants,
        Self::BoyToys,
        Self::GirlToys,
        Self::HairColors,
        Self::ForgeRecipes,
        Self::ForgeResults,
        Self::SigilRecipes,
        Self::SigilResults,
        Self::SpiderRecipes,
        Self::SpiderResults,
    ];

    /// Editor id of this target in `ids`.
    #[must_use]
    pub fn editor_id(self, ids: &TargetEditorIds) -> &str {
        match self {
            Self::Seeds => &ids.seeds,
            Self::Plants => &ids.plants,
            Self::BoyToys => &ids.boy_toys,
            Self::GirlToys => &ids.girl_toys,
            Self::HairColors => &ids.hair_colors,
            Self::ForgeRecipes => &ids.forge_recipes,
            Self::ForgeResults => &ids.forge_results,
            Self::SigilRecipes => &ids.sigil_recipes,
            Self::SigilResults => &ids.sigil_results,
            Self::SpiderRecipes => &ids.spider_recipes,
            Self::SpiderResults => &ids.spider_results,
        }
    }
}

/// Accumulated records waiting to be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    /// `formlist` entries, by destination.
    pub form_lists: FormLists,
    /// Seed and plant pairs.
    pub plants: Vec<FormPair>,
    /// Boy's toys.
    pub boy_toys: Vec<FormRef>,
    /// Girl's toys.
    pub girl_toys: Vec<FormRef>,
    /// Hair colors.
    pub hair_colors: Vec<FormRef>,
    /// Atronach Forge recipe and result pairs.
    pub atronach_forge: Vec<FormPair>,
    /// Atronach Forge sigil recipe and result pairs.
    pub atronach_forge_sigil: Vec<FormPair>,
    /// Spider crafting recipe and result pairs.
    pub spider_crafting: Vec<FormPair>,
}

/// Append `forms` to every list in `destinations` under `lists`.
pub fn append_to(lists: &mut FormLists, destinations: &[FormRef], forms: &[FormRef]) {
    for dest in destinations {
        lists.entry(dest.id).or_default().extend_from_slice(forms);
    }
}

/// Records added and duplicates skipped by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Records (or pairs) appended.
    pub added: usize,
    /// Records (or pairs) already present.
    pub duplicates: usize,
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.duplicates += rhs.duplicates;
    }
}

/// How much a merge logs.
#[derive(Debug, Clone, Copy)]
pub struct MergeStyle {
    /// Section headers and per-list totals.
    pub verbose: bool,
    /// Per-record added/duplicate lines.
    pub debug: bool,
}

impl MergeStyle {
    /// Style for a merge run in `mode`.
    #[must_use]
    pub const fn for_mode(mode: OperatingMode, debug: bool) -> Self {
        let verbose = !mode.is_quiet();
        Self {
            verbose,
            debug: verbose && debug,
        }
    }
}

/// Writes merge results into a [`RecordStore`].
pub struct Merger<'a> {
    store: &'a mut dyn RecordStore,
    log: &'a dyn Log,
    style: MergeStyle,
}

impl std::fmt::Debug for Merger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl<'a> Merger<'a> {
    /// Merge into `store`, logging through `log`.
    pub const fn new(store: &'a mut dyn RecordStore, log: &'a dyn Log, style: MergeStyle) -> Self {
        Self { store, log, style }
    }

    /// Add each record of `forms` to `list` unless it is already there.
    pub fn merge_list(&mut self, header: &str, what: &str, list: FormId, forms: &[FormRef]) -> Tally {
        if self.style.verbose {
            self.log.stage(header);
        }
        let mut tally = Tally::default();
        {
            let _indent = self.style.verbose.then(|| indented(self.log));
            for form in forms {
                self.add_one(what, list, *form, &mut tally);
            }
        }
        if self.style.verbose {
            self.log.info(&format!(
                "Total {} new {what} added, skipped {} duplicates.",
                tally.added, tally.duplicates
            ));
            self.log.stage("");
        }
        tally
    }

    /// Add each pair to `(first, second)`.
    ///
    /// A pair is one unit: if either half is already present nothing is
    /// appended and one duplicate is counted.
    pub fn merge_pairs(
        &mut self,
        header: &str,
        names: (&str, &str),
        lists: (FormId, FormId),
        pairs: &[FormPair],
    ) -> Tally {
        if self.style.verbose {
            self.log.stage(header);
        }
        let mut tally = Tally::default();
        {
            let _indent = self.style.verbose.then(|| indented(self.log));
            for &(first, second) in pairs {
                let present = [(names.0, lists.0, first), (names.1, lists.1, second)]
                    .into_iter()
                    .find(|&(_, list, form)| self.store.list_has(list, form.id));
                if let Some((what, _, form)) = present {
                    if self.style.debug {
                        self.log.warn(&format!(
                            "{what} {} already on the list!",
                            self.store.describe(form.id)
                        ));
                    }
                    tally.duplicates += 1;
                    continue;
                }
                self.store.list_add(lists.0, first);
                self.store.list_add(lists.1, second);
                tally.added += 1;
                if self.style.debug {
                    self.log.info(&format!(
                        "{}: {} and {}: {} added!",
                        names.0,
                        self.store.describe(first.id),
                        names.1,
                        self.store.describe(second.id)
                    ));
                }
            }
        }
        if self.style.verbose {
            self.log.info(&format!(
                "Total {} new {} added, skipped {} duplicates.",
                tally.added, names.1, tally.duplicates
            ));
            self.log.stage("");
        }
        tally
    }

    /// Merge every destination of `lists`.
    pub fn merge_form_lists(&mut self, lists: &FormLists) -> Tally {
        if self.style.verbose {
            self.log.stage("FORMLISTS");
        }
        let mut total = Tally::default();
        {
            let _outer = self.style.verbose.then(|| indented(self.log));
            for (&list, forms) in lists {
                if self.style.verbose {
                    self.log
                        .info(&format!("FormList {}", self.store.describe(list)));
                }
                let mut tally = Tally::default();
                {
                    let _inner = self.style.verbose.then(|| indented(self.log));
                    for form in forms {
                        self.add_one("Form", list, *form, &mut tally);
                    }
                    if self.style.verbose {
                        self.log.info(&format!(
                            "{} new Forms added, skipped {} duplicates.",
                            tally.added, tally.duplicates
                        ));
                    }
                }
                total += tally;
            }
        }
        if self.style.verbose {
            self.log.info(&format!(
                "Total {} new Forms added to {} FormLists, skipped {} duplicates.",
                total.added,
                lists.len(),
                total.duplicates
            ));
            self.log.stage("");
        }
        total
    }

    fn add_one(&mut self, what: &str, list: FormId, form: FormRef, tally: &mut Tally) {
        if self.store.list_has(list, form.id) {
            if self.style.debug {
                self.log.warn(&format!(
                    "{what} {} already on the list!",
                    self.store.describe(form.id)
                ));
            }
            tally.duplicates += 1;
            return;
        }
        self.store.list_add(list, form);
        tally.added += 1;
        if self.style.debug {
            self.log
                .info(&format!("{what}: {} added!", self.store.describe(form.id)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{BufferedLog, Level};
    use crate::store::{FormType, MemoryStore};

    const LOUD: MergeStyle = MergeStyle {
        verbose: true,
        debug: true,
    };
    const QUIET: MergeStyle = MergeStyle {
        verbose: false,
        debug: false,
    };

    struct Fixture {
        store: MemoryStore,
        list_a: FormId,
        list_b: FormId,
        forms: Vec<FormRef>,
    }

    fn fixture() -> Fixture {
        let mut store = MemoryStore::new();
        let list_a = store.insert(0x10, "ListA", FormType::FormList, None).id;
        let list_b = store.insert(0x11, "ListB", FormType::FormList, None).id;
        let forms = (0..4)
            .map(|i| store.insert(0x100 + i, &format!("Form{i}"), FormType::Misc, None))
            .collect();
        Fixture {
            store,
            list_a,
            list_b,
            forms,
        }
    }

    #[test]
    fn second_merge_adds_nothing() {
        let mut fx = fixture();
        let log = BufferedLog::new();
        let first =
            Merger::new(&mut fx.store, &log, QUIET).merge_list("", "Form", fx.list_a, &fx.forms);
        let before = fx.store.list_members(fx.list_a);
        let second =
            Merger::new(&mut fx.store, &log, QUIET).merge_list("", "Form", fx.list_a, &fx.forms);
        assert_eq!(first, Tally { added: 4, duplicates: 0 });
        assert_eq!(second, Tally { added: 0, duplicates: 4 });
        assert_eq!(fx.store.list_members(fx.list_a), before);
    }

    #[test]
    fn repeated_record_in_one_bucket_is_a_duplicate() {
        let mut fx = fixture();
        let log = BufferedLog::new();
        let forms = vec![fx.forms[0], fx.forms[0]];
        let tally =
            Merger::new(&mut fx.store, &log, QUIET).merge_list("", "Form", fx.list_a, &forms);
        assert_eq!(tally, Tally { added: 1, duplicates: 1 });
    }

    #[test]
    fn pair_with_present_first_half_adds_neither() {
        let mut fx = fixture();
        fx.store.list_add(fx.list_a, fx.forms[0]);
        let log = BufferedLog::new();
        let pairs = [(fx.forms[0], fx.forms[1])];
        let tally = Merger::new(&mut fx.store, &log, QUIET).merge_pairs(
            "",
            ("Recipe", "Result"),
            (fx.list_a, fx.list_b),
            &pairs,
        );
        assert_eq!(tally, Tally { added: 0, duplicates: 1 });
        assert!(fx.store.list_members(fx.list_b).is_empty());
        assert_eq!(fx.store.list_members(fx.list_a).len(), 1);
    }

    #[test]
    fn pair_with_present_second_half_adds_neither() {
        let mut fx = fixture();
        fx.store.list_add(fx.list_b, fx.forms[1]);
        let log = BufferedLog::new();
        let pairs = [(fx.forms[0], fx.forms[1])];
        let tally = Merger::new(&mut fx.store, &log, QUIET).merge_pairs(
            "",
            ("Recipe", "Result"),
            (fx.list_a, fx.list_b),
            &pairs,
        );
        assert_eq!(tally.duplicates, 1);
        assert!(fx.store.list_members(fx.list_a).is_empty());
    }

    #[test]
    fn new_pair_adds_both_halves() {
        let mut fx = fixture();
        let log = BufferedLog::new();
        let pairs = [(fx.forms[0], fx.forms[1]), (fx.forms[2], fx.forms[3])];
        let tally = Merger::new(&mut fx.store, &log, QUIET).merge_pairs(
            "",
            ("Seed", "Plant"),
            (fx.list_a, fx.list_b),
            &pairs,
        );
        assert_eq!(tally, Tally { added: 2, duplicates: 0 });
        assert_eq!(fx.store.list_members(fx.list_a), vec![fx.forms[0], fx.forms[2]]);
        assert_eq!(fx.store.list_members(fx.list_b), vec![fx.forms[1], fx.forms[3]]);
    }

    #[test]
    fn form_lists_merge_totals_across_destinations() {
        let mut fx = fixture();
        let mut lists = FormLists::new();
        append_to(
            &mut lists,
            &fx.store.forms_of_type(FormType::FormList),
            &fx.forms[..2],
        );
        let log = BufferedLog::new();
        let tally = Merger::new(&mut fx.store, &log, LOUD).merge_form_lists(&lists);
        assert_eq!(tally, Tally { added: 4, duplicates: 0 });
        assert!(log.contains(Level::Info, "Total 4 new Forms added to 2 FormLists"));
    }

    #[test]
    fn quiet_style_logs_nothing() {
        let mut fx = fixture();
        let log = BufferedLog::new();
        Merger::new(&mut fx.store, &log, QUIET).merge_list("X", "Form", fx.list_a, &fx.forms);
        Merger::new(&mut fx.store, &log, QUIET).merge_list("X", "Form", fx.list_a, &fx.forms);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn debug_style_logs_each_record() {
        let mut fx = fixture();
        let log = BufferedLog::new();
        let forms = vec![fx.forms[0], fx.forms[0]];
        Merger::new(&mut fx.store, &log, LOUD).merge_list("HAIR COLORS", "Hair Color", fx.list_a, &forms);
        assert!(log.contains(Level::Stage, "HAIR COLORS"));
        assert!(log.contains(Level::Info, "Hair Color: Form0 [00000100] added!"));
        assert!(log.contains(Level::Warn, "Hair Color Form0 [00000100] already on the list!"));
        assert!(log.contains(Level::Info, "Total 1 new Hair Color added, skipped 1 duplicates."));
    }

    #[test]
    fn style_follows_mode() {
        let init = MergeStyle::for_mode(OperatingMode::Initialize, true);
        assert!(init.verbose && init.debug);
        let replay = MergeStyle::for_mode(OperatingMode::LoadGame, true);
        assert!(!replay.verbose && !replay.debug);
    }

    #[test]
    fn every_target_has_a_default_editor_id() {
        let ids = TargetEditorIds::default();
        for target in Target::ALL {
            assert!(!target.editor_id(&ids).is_empty(), "{target:?}");
        }
    }
}
