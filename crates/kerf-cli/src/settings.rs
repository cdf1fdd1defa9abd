//! User settings
//!
//! Settings are stored in `{config_dir}/kerf/settings.json`. A missing or
//! unreadable default file means defaults; a file named with `--config` must
//! load.

use anyhow::{Context, Result};
use kerf_core::CompileOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Options passed to every compilation
    pub compile: CompileOptions,
    /// Where `build --all` writes files when `-o` is not given
    pub output_dir: Option<PathBuf>,
    /// Default `tracing` filter directive
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            output_dir: None,
            log_filter: "warn".to_string(),
        }
    }
}

/// Get the path to the settings file
fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kerf").join("settings.json"))
}

/// Load settings from `path`, or from the default location
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", path.display()));
    }

    let Some(path) = settings_path() else {
        return Ok(Settings::default());
    };
    Ok(fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str(&contents).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "compile": { "map_name": "scene" } }"#).unwrap();
        assert_eq!(settings.compile.map_name, "scene");
        assert!(settings.compile.boilerplate);
        assert_eq!(settings.log_filter, "warn");
        assert_eq!(settings.output_dir, None);
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Settings {
            output_dir: Some(PathBuf::from("shaders")),
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = Path::new("/nonexistent/kerf/settings.json");
        let err = load_settings(Some(missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read settings"));
    }
}
