use dirs::home_dir;
use std::{env, path::PathBuf};

/// Environment variable overriding the application directory.
pub const HOME_ENV: &str = "LEDGERWISE_HOME";

const DEFAULT_DIR_NAME: &str = ".ledgerwise";
const DATA_DIR: &str = "data";
const CONFIG_FILE: &str = "config.json";

/// Returns the application-specific directory, defaulting to `~/.ledgerwise`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the JSON collections.
pub fn data_dir() -> PathBuf {
    app_data_dir().join(DATA_DIR)
}

pub fn config_file() -> PathBuf {
    app_data_dir().join(CONFIG_FILE)
}
