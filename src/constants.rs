// src/constants.rs

/// Name of the driver executable, used in usage text and completion scripts.
pub const DRIVER_NAME: &str = "qcli";

/// The name of the settings directory (in ~/.config/).
pub const CONFIG_DIR_NAME: &str = "qcli";

/// The name of the settings file (in ~/.config/qcli/).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV_VAR: &str = "QCLI_CONFIG";

/// Prefix prepended to every HTML form field name.
pub const DEFAULT_FIELD_PREFIX: &str = "pyqi_";

/// Port used by `serve-html-interface` when none is given.
pub const DEFAULT_PORT: u16 = 8080;

/// File name used for HTML downloads with neither a lookup nor a default name.
pub const FALLBACK_DOWNLOAD_NAME: &str = "unnamed_qcli_output";

// --- CLI USAGE TEXT ---

pub const OPTIONAL_INPUT_LINE: &str = "[] indicates optional input (order unimportant)";
pub const REQUIRED_INPUT_LINE: &str = "{} indicates required input (order unimportant)";
pub const REQUIRED_OPTIONS_HEADING: &str = "REQUIRED options";
