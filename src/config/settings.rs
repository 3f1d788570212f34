//! Engine settings loaded from `flm.toml`.
//!
//! ```toml
//! data_dir = "Data"
//! debug = true
//!
//! [targets]
//! hair_colors = "MyHairColorList"
//! ```
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use super::toml_loader::load_config;

/// Default settings file name.
pub const SETTINGS_FILE: &str = "flm.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Data directory to scan when none is given on the command line.
    pub data_dir: Option<PathBuf>,
    /// Force debug output on or off, overriding the toggle file.
    pub debug: Option<bool>,
    /// Editor ids of the fixed target lists.
    pub targets: TargetEditorIds,
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        load_config(path)
    }
}

/// Editor ids of the lists the simplified entry kinds merge into.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TargetEditorIds {
    /// Seeds accepted by planters.
    pub seeds: String,
    /// Plants grown from the seeds, index-aligned with `seeds`.
    pub plants: String,
    /// Gifts for adopted boys.
    pub boy_toys: String,
    /// Gifts for adopted girls.
    pub girl_toys: String,
    /// Hair colors offered to children.
    pub hair_colors: String,
    /// Atronach Forge recipes.
    pub forge_recipes: String,
    /// Atronach Forge results.
    pub forge_results: String,
    /// Atronach Forge recipes that need a sigil stone.
    pub sigil_recipes: String,
    /// Atronach Forge sigil stone results.
    pub sigil_results: String,
    /// Dragonborn spider crafting recipes.
    pub spider_recipes: String,
    /// Dragonborn spider crafting results.
    pub spider_results: String,
}

impl Default for TargetEditorIds {
    fn default() -> Self {
        Self {
            seeds: "flPlanterPlantableItem".to_string(),
            plants: "flPlanterPlantedFlora".to_string(),
            boy_toys: "BYOHRelationshipAdoptionPlayerGiftChildMale".to_string(),
            girl_toys: "BYOHRelationshipAdoptionPlayerGiftChildFemale".to_string(),
            hair_colors: "HairColorList".to_string(),
            forge_recipes: "AtrFrgAtronachForgeRecipeList".to_string(),
            forge_results: "AtrFrgAtronachForgeResultList".to_string(),
            sigil_recipes: "AtrFrgSigilStoneRecipeList".to_string(),
            sigil_results: "AtrFrgSigilStoneResultList".to_string(),
            spider_recipes: "DLC2ExpSpiderCraftingRecipesList".to_string(),
            spider_results: "DLC2ExpSpiderCraftingResultsList".to_string(),
        }
    }
}
