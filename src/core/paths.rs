// src/core/paths.rs

use crate::constants::{CONFIG_DIR_NAME, SETTINGS_ENV_VAR, SETTINGS_FILENAME};
use std::{env, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
}

/// Returns the path to the qcli configuration directory (`~/.config/qcli`).
/// The directory is not created; nothing is ever written there.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or(PathError::ConfigDirNotFound)
}

/// Returns the settings file path. `$QCLI_CONFIG` wins over the config directory.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    match env::var_os(SETTINGS_ENV_VAR) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => get_config_dir().map(|dir| dir.join(SETTINGS_FILENAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_app_name() {
        if let Ok(dir) = get_config_dir() {
            assert!(dir.ends_with(CONFIG_DIR_NAME));
        }
    }
}
