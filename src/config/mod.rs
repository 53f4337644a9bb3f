//! Process-level configuration: which storage provider to use and where.

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::utils::paths;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// One JSON file per collection under the data directory.
    #[default]
    Json,
    /// Nothing survives the process.
    Memory,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Json => f.write_str("json"),
            StorageKind::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageKind,
    /// Overrides the default `<app dir>/data` location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Extra tracing directive, e.g. `ledgerwise=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    #[serde(default = "AppConfig::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            data_dir: None,
            log_filter: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl AppConfig {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::data_dir)
    }
}

/// Loads and saves [`AppConfig`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join("config.json")))
    }

    /// Manager for `<app dir>/config.json`.
    pub fn from_env() -> Self {
        Self::new(paths::config_file())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = AppConfig {
            storage: StorageKind::Memory,
            data_dir: Some(dir.path().join("elsewhere")),
            log_filter: Some("ledgerwise=debug".into()),
            ui_color_enabled: false,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.config_path()).exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.config_path(), r#"{"storage":"memory"}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.storage, StorageKind::Memory);
        assert!(loaded.ui_color_enabled);
    }
}
