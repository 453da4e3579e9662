//! Store configuration at `<home>/.workbook/config.yaml`.
//!
//! Every loader has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! A missing file yields the defaults; a present but malformed one is an
//! error with path and line context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use workbook_core::GroupPreset;

use crate::error::ConfigError;
use crate::persistence::{FilePersistence, MemoryPersistence, Persistence};

/// Which backend the store writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root for stored documents; `<home>/.workbook` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub persistence: PersistenceMode,
    /// Groups created by `initialize_workspace`, in order.
    pub seed_presets: Vec<GroupPreset>,
}

/// `<home>/.workbook/`
pub fn workbook_dir_at(home: &Path) -> PathBuf {
    home.join(".workbook")
}

/// `<home>/.workbook/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    workbook_dir_at(home).join("config.yaml")
}

impl StoreConfig {
    /// Load `<home>/.workbook/config.yaml`, falling back to defaults.
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let path = config_path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&home()?)
    }

    /// Effective data directory for `home`.
    pub fn data_dir_at(&self, home: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| workbook_dir_at(home))
    }

    /// Build the configured backend.
    pub fn persistence_at(&self, home: &Path) -> Arc<dyn Persistence> {
        match self.persistence {
            PersistenceMode::File => Arc::new(FilePersistence::new(self.data_dir_at(home))),
            PersistenceMode::Memory => Arc::new(MemoryPersistence::new()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(home: &Path, yaml: &str) {
        let path = config_path_at(home);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, yaml).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = StoreConfig::load_at(home.path()).expect("load");
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.data_dir_at(home.path()), home.path().join(".workbook"));
    }

    #[test]
    fn fields_are_parsed() {
        let home = TempDir::new().expect("tempdir");
        write_config(
            home.path(),
            "data_dir: /srv/workbook\npersistence: memory\nseed_presets: [personal, work]\n",
        );
        let config = StoreConfig::load_at(home.path()).expect("load");
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/workbook")));
        assert_eq!(config.persistence, PersistenceMode::Memory);
        assert_eq!(config.seed_presets, [GroupPreset::Personal, GroupPreset::Work]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let home = TempDir::new().expect("tempdir");
        write_config(home.path(), "seed_presets: [finance]\n");
        let config = StoreConfig::load_at(home.path()).expect("load");
        assert_eq!(config.persistence, PersistenceMode::File);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn unknown_key_is_a_parse_error_with_path() {
        let home = TempDir::new().expect("tempdir");
        write_config(home.path(), "colour: blue\n");
        let err = StoreConfig::load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn yaml_roundtrip() {
        let config = StoreConfig {
            data_dir: Some(PathBuf::from("/tmp/wb")),
            persistence: PersistenceMode::Memory,
            seed_presets: vec![GroupPreset::Study],
        };
        let yaml = config.to_yaml().expect("to_yaml");
        let back: StoreConfig = serde_yaml::from_str(&yaml).expect("from_yaml");
        assert_eq!(back, config);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
