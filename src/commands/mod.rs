//! Subcommand orchestration.
pub mod check;
pub mod event;
pub mod sync;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::sanitize::Sanitizer;
use crate::config::settings::{SETTINGS_FILE, Settings};
use crate::engine::{Engine, Host};
use crate::logging::Log;
use crate::store::MemoryStore;

/// Catalogue file looked up in the data directory when `--catalogue` is not given.
pub const CATALOGUE_FILE: &str = "flm-catalogue.toml";

/// Shared state produced by the common command setup sequence.
///
/// Loads the settings, the record catalogue and every config source, then
/// runs the engine's parse phase so each command starts from a populated
/// [`Engine`].
#[derive(Debug)]
pub struct Session {
    /// Settings the session was built from.
    pub settings: Settings,
    /// Records the configs resolve against and merge into.
    pub store: MemoryStore,
    /// Discovered config sources.
    pub config: Config,
    /// Engine after `find_lists` and `find_all`.
    pub engine: Engine,
}

impl Session {
    /// Load settings, catalogue and configs, and parse every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings or the catalogue cannot be read or
    /// parsed. Broken config files are not errors; they are counted by the
    /// engine.
    pub fn init(global: &GlobalOpts, log: Arc<dyn Log>) -> Result<Self> {
        let settings_path = global
            .settings
            .clone()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        let settings = Settings::load(&settings_path)?;

        let data_dir = resolve_data_dir(global, &settings);
        let catalogue = global
            .catalogue
            .clone()
            .unwrap_or_else(|| data_dir.join(CATALOGUE_FILE));
        log.debug(&format!("data directory: {}", data_dir.display()));
        log.debug(&format!("catalogue: {}", catalogue.display()));

        let store = MemoryStore::load(&catalogue)?;
        let sanitizer = Sanitizer::new().context("failed to compile sanitization rules")?;
        let config = Config::load(&data_dir, &sanitizer);
        let debug = settings.debug.unwrap_or(config.debug);

        let mut engine = Engine::new(log)
            .with_targets(settings.targets.clone())
            .with_debug(debug);
        engine.find_lists(&store);
        engine.find_all(&config.sources, &Host::new(&store, &store));

        Ok(Self {
            settings,
            store,
            config,
            engine,
        })
    }

    /// Merge every bucket into the catalogue.
    pub fn add_all(&mut self) {
        self.engine.add_all(&mut self.store);
    }
}

/// Data directory from the command line, then the settings, then the
/// working directory.
#[must_use]
pub fn resolve_data_dir(global: &GlobalOpts, settings: &Settings) -> PathBuf {
    global
        .data
        .clone()
        .or_else(|| settings.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::stats::Counter;
    use crate::logging::{BufferedLog, Level};
    use std::fs;

    const CATALOGUE: &str = r#"
plugins = ["Skyrim.esm"]

[[forms]]
id = 0x10
editor_id = "HairColorList"
type = "formlist"

[[forms]]
id = 0x123
editor_id = "HairBlond"
type = "misc"
plugin = "Skyrim.esm"
"#;

    #[test]
    fn data_dir_precedence() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("FromSettings")),
            ..Settings::default()
        };
        let cli = GlobalOpts {
            data: Some(PathBuf::from("FromCli")),
            ..GlobalOpts::default()
        };
        assert_eq!(resolve_data_dir(&cli, &settings), PathBuf::from("FromCli"));
        assert_eq!(
            resolve_data_dir(&GlobalOpts::default(), &settings),
            PathBuf::from("FromSettings")
        );
        assert_eq!(
            resolve_data_dir(&GlobalOpts::default(), &Settings::default()),
            PathBuf::from(".")
        );
    }

    #[test]
    fn init_parses_configs_against_catalogue() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CATALOGUE_FILE), CATALOGUE).unwrap();
        fs::write(tmp.path().join("Hair_FLM.ini"), "haircolors = HairBlond\n").unwrap();
        let global = GlobalOpts {
            data: Some(tmp.path().to_path_buf()),
            settings: Some(tmp.path().join(SETTINGS_FILE)),
            ..GlobalOpts::default()
        };
        let log = Arc::new(BufferedLog::new());

        let mut session = Session::init(&global, log.clone()).unwrap();
        assert_eq!(session.engine.stats().get(Counter::EntriesValid), 1);
        assert_eq!(session.config.sources.len(), 1);
        session.add_all();
        assert_eq!(session.engine.stats().get(Counter::HairColorsAdded), 1);
        assert!(log.contains(Level::Error, "Unable to find list: flPlanterPlantableItem."));
    }

    #[test]
    fn missing_catalogue_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            data: Some(tmp.path().to_path_buf()),
            settings: Some(tmp.path().join(SETTINGS_FILE)),
            ..GlobalOpts::default()
        };
        let result = Session::init(&global, Arc::new(BufferedLog::new()));
        assert!(result.is_err());
    }
}
