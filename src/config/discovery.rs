//! Locating config files in a data directory.
//!
//! Two places are searched: `.ini` files directly in the data directory whose
//! name contains `_FLM`, and every `.ini` file in the `FLM/` subdirectory.
//! A `FormListManipulator_DEBUG.ini` file in the data directory, `FLM/`, or
//! `SKSE/Plugins/` switches on debug output.
use std::path::{Path, PathBuf};

/// File whose presence enables debug mode.
pub const DEBUG_TOGGLE: &str = "FormListManipulator_DEBUG.ini";

/// Subdirectory whose `.ini` files are all configs.
pub const CONFIG_DIR: &str = "FLM";

/// Marker a top-level `.ini` file name must contain.
pub const NAME_MARKER: &str = "_FLM";

/// Result of scanning a data directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Config files in processing order.
    pub files: Vec<PathBuf>,
    /// Whether a debug toggle file exists.
    pub debug: bool,
}

/// Scan `data_dir` for config files and the debug toggle.
///
/// Top-level files come first, then `FLM/` files; each group is sorted by
/// file name so runs are reproducible. Missing directories yield nothing.
#[must_use]
pub fn discover(data_dir: &Path) -> Discovery {
    let mut files = ini_files(data_dir, |name| name.contains(NAME_MARKER));
    files.extend(ini_files(&data_dir.join(CONFIG_DIR), |_| true));
    Discovery {
        files,
        debug: debug_toggle_present(data_dir),
    }
}

/// Whether any of the debug toggle locations holds the toggle file.
#[must_use]
pub fn debug_toggle_present(data_dir: &Path) -> bool {
    [
        data_dir.to_path_buf(),
        data_dir.join(CONFIG_DIR),
        data_dir.join("SKSE").join("Plugins"),
    ]
    .iter()
    .any(|dir| dir.join(DEBUG_TOGGLE).is_file())
}

fn ini_files(dir: &Path, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ini"))
        })
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name != DEBUG_TOGGLE && accept(name))
        })
        .collect();
    files.sort();
    files
}
