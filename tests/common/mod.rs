// Shared helpers for integration tests.
//
// Provides a temporary data directory with a record catalogue and a fluent
// builder for config files, so each integration test can run the engine
// against an isolated environment.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use flm_engine::cli::GlobalOpts;
use flm_engine::commands::{CATALOGUE_FILE, Session};
use flm_engine::logging::BufferedLog;

/// Catalogue with every default target list, two plain lists and a few
/// records from Skyrim and Dawnguard.
///
/// Of the five alchemy items, three carry `VendorItemFood` and two
/// `VendorItemDrink`.
pub const CATALOGUE: &str = r#"
plugins = ["Skyrim.esm", "Dawnguard.esm"]

[[forms]]
id = 0x10
editor_id = "FL01"
type = "formlist"

[[forms]]
id = 0x11
editor_id = "FL02"
type = "formlist"

[[forms]]
id = 0x20
editor_id = "flPlanterPlantableItem"
type = "formlist"

[[forms]]
id = 0x21
editor_id = "flPlanterPlantedFlora"
type = "formlist"

[[forms]]
id = 0x22
editor_id = "BYOHRelationshipAdoptionPlayerGiftChildMale"
type = "formlist"

[[forms]]
id = 0x23
editor_id = "BYOHRelationshipAdoptionPlayerGiftChildFemale"
type = "formlist"

[[forms]]
id = 0x24
editor_id = "HairColorList"
type = "formlist"

[[forms]]
id = 0x25
editor_id = "AtrFrgAtronachForgeRecipeList"
type = "formlist"

[[forms]]
id = 0x26
editor_id = "AtrFrgAtronachForgeResultList"
type = "formlist"

[[forms]]
id = 0x27
editor_id = "AtrFrgSigilStoneRecipeList"
type = "formlist"

[[forms]]
id = 0x28
editor_id = "AtrFrgSigilStoneResultList"
type = "formlist"

[[forms]]
id = 0x29
editor_id = "DLC2ExpSpiderCraftingRecipesList"
type = "formlist"

[[forms]]
id = 0x2A
editor_id = "DLC2ExpSpiderCraftingResultsList"
type = "formlist"

[[forms]]
id = 0x900
editor_id = "VendorItemFood"
type = "keyword"

[[forms]]
id = 0x901
editor_id = "VendorItemWeapon"
type = "keyword"

[[forms]]
id = 0x902
editor_id = "VendorItemDrink"
type = "keyword"

[[forms]]
id = 0x123
editor_id = "FoodApple"
name = "Apple"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemFood"]

[[forms]]
id = 0x456
editor_id = "FoodCabbage"
name = "Cabbage"
type = "ingredient"
plugin = "Skyrim.esm"
keywords = ["VendorItemFood"]

[[forms]]
id = 0x457
editor_id = "FoodBread"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemFood"]

[[forms]]
id = 0x458
editor_id = "FoodCheese"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemFood"]

[[forms]]
id = 0x459
editor_id = "FoodMead"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemDrink"]

[[forms]]
id = 0x45A
editor_id = "FoodWine"
type = "alchemyitem"
plugin = "Skyrim.esm"
keywords = ["VendorItemDrink"]

[[forms]]
id = 0x789
editor_id = "IronSword"
type = "weapon"
plugin = "Skyrim.esm"
keywords = ["VendorItemWeapon"]

[[forms]]
id = 0x78A
editor_id = "IronDagger"
type = "weapon"
plugin = "Skyrim.esm"
keywords = ["VendorItemWeapon"]

[[forms]]
id = 0x500
editor_id = "AppleTree"
type = "tree"
plugin = "Skyrim.esm"

[[forms]]
id = 0x501
editor_id = "CabbagePlant"
type = "flora"
plugin = "Skyrim.esm"

[[forms]]
id = 0x02000801
editor_id = "DLC1Gem"
type = "misc"
plugin = "Dawnguard.esm"
"#;

/// An isolated data directory backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary data directory.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a data directory holding only the default catalogue.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join(CATALOGUE_FILE), CATALOGUE).expect("write catalogue");
        Self { root }
    }

    /// Path to the data directory.
    pub fn data_path(&self) -> &Path {
        self.root.path()
    }

    /// Global options pointing at this data directory and no settings file.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            data: Some(self.root.path().to_path_buf()),
            catalogue: None,
            settings: Some(self.root.path().join("flm.toml")),
        }
    }

    /// Parse every config in the directory.
    pub fn session(&self) -> (Session, Arc<BufferedLog>) {
        let log = Arc::new(BufferedLog::new());
        let session = Session::init(&self.global(), log.clone()).expect("init session");
        (session, log)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a context with the default catalogue.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `<data>/<filename>`.
    pub fn with_config(self, filename: &str, content: &str) -> Self {
        std::fs::write(self.ctx.root.path().join(filename), content).expect("write config");
        self
    }

    /// Write `content` to `<data>/FLM/<filename>`.
    pub fn with_folder_config(self, filename: &str, content: &str) -> Self {
        let dir = self.ctx.root.path().join("FLM");
        std::fs::create_dir_all(&dir).expect("create FLM dir");
        std::fs::write(dir.join(filename), content).expect("write config");
        self
    }

    /// Write `content` to `<data>/flm.toml`.
    pub fn with_settings(self, content: &str) -> Self {
        std::fs::write(self.ctx.root.path().join("flm.toml"), content).expect("write settings");
        self
    }

    /// Create the debug toggle file.
    pub fn with_debug_toggle(self) -> Self {
        std::fs::write(
            self.ctx.root.path().join("FormListManipulator_DEBUG.ini"),
            "",
        )
        .expect("write debug toggle");
        self
    }

    /// Replace the catalogue.
    pub fn with_catalogue(self, content: &str) -> Self {
        std::fs::write(self.ctx.root.path().join(CATALOGUE_FILE), content)
            .expect("write catalogue");
        self
    }

    /// Finalise and return the context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
