// src/core/config_loader.rs

//! # Settings
//!
//! Driver-wide settings read from `settings.toml`. Every key is optional; a
//! missing file yields the defaults.
//!
//! ```toml
//! driver_name = "qcli"
//!
//! [html]
//! field_prefix = "pyqi_"
//! port = 8080
//! ```

use crate::{
    constants::{DEFAULT_FIELD_PREFIX, DEFAULT_PORT, DRIVER_NAME},
    core::paths::{self, PathError},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Executable name used in usage text and completion scripts.
    pub driver_name: String,
    pub html: HtmlSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    pub field_prefix: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            driver_name: DRIVER_NAME.to_string(),
            html: HtmlSettings::default(),
        }
    }
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Loads the settings from the default location, falling back to defaults
/// when the file does not exist.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let path = paths::get_settings_path()?;
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        log::debug!("No settings file at '{}', using defaults.", path.display());
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path).map_err(|e| SettingsError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.html.field_prefix, "pyqi_");
        assert_eq!(settings.html.port, 8080);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[html]\nport = 9000\n").unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.html.port, 9000);
        assert_eq!(settings.html.field_prefix, "pyqi_");
        assert_eq!(settings.driver_name, "qcli");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "driver_name = [").unwrap();
        assert!(matches!(
            load_settings_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
