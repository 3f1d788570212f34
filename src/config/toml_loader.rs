//! TOML configuration file parsing.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes from empty TOML, so every field of `T` must
/// have a default.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return toml::from_str("").context("Failed to create empty config");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let s: Sample = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert!(s.name.is_empty());
    }

    #[test]
    fn invalid_toml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "name = [").unwrap();
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}
