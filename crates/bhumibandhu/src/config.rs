//! Configuration management for bhumibandhu.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::DEFAULT_SLOT_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bhumibandhu";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "records.db";

/// Default directory name for exports and downloaded documents.
const DOWNLOADS_DIR_NAME: &str = "downloads";

/// Upper bound for displayed decimal places.
const MAX_DECIMALS: usize = 10;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BHUMIBANDHU_`, nested keys
///    separated by `__`)
/// 2. TOML config file at `~/.config/bhumibandhu/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Record store behaviour.
    pub records: RecordsConfig,
    /// Document retrieval configuration.
    pub documents: DocumentsConfig,
    /// Output formatting.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/bhumibandhu/records.db`
    pub database_path: Option<PathBuf>,
    /// Name of the slot holding the record collection.
    pub slot_key: String,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Write the seed records when the slot is absent or empty.
    pub seed_on_empty: bool,
    /// Refuse records whose land id is already present.
    pub reject_duplicate_ids: bool,
    /// Regex new land ids must match, if set.
    pub land_id_pattern: Option<String>,
}

/// Document retrieval configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Directory that root-relative document links resolve under.
    pub root: Option<PathBuf>,
    /// Where exports and fetched documents are written.
    /// Defaults to `~/.local/share/bhumibandhu/downloads`
    pub download_dir: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for converted areas.
    pub decimals: usize,
    /// Number of records shown in the dashboard's recent list.
    pub recent_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            seed_on_empty: true,
            reject_duplicate_ids: false,
            land_id_pattern: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            recent_limit: 5,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("BHUMIBANDHU_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "slot_key must not be empty".to_string(),
            });
        }

        if let Some(pattern) = &self.records.land_id_pattern {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("invalid regex pattern: {pattern}"),
                });
            }
        }

        if self.display.decimals > MAX_DECIMALS {
            return Err(Error::ConfigValidation {
                message: format!(
                    "decimals ({}) must be at most {MAX_DECIMALS}",
                    self.display.decimals
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the download directory, resolving defaults if not set.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.documents
            .download_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DOWNLOADS_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.slot_key, "bhumibandhu_land_records");
        assert!(config.records.seed_on_empty);
        assert!(!config.records.reject_duplicate_ids);
        assert!(config.records.land_id_pattern.is_none());
        assert_eq!(config.display.decimals, 2);
        assert_eq!(config.display.recent_limit, 5);
    }

    #[test]
    fn test_default_documents_config() {
        let documents = DocumentsConfig::default();
        assert!(documents.root.is_none());
        assert!(documents.download_dir.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot_key() {
        let mut config = Config::default();
        config.storage.slot_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("slot_key"));
    }

    #[test]
    fn test_validate_invalid_regex() {
        let mut config = Config::default();
        config.records.land_id_pattern = Some("[invalid".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid regex"));
    }

    #[test]
    fn test_validate_valid_regex() {
        let mut config = Config::default();
        config.records.land_id_pattern = Some(r"^ULP\d{12}$".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_too_many_decimals() {
        let mut config = Config::default();
        config.display.decimals = 11;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("decimals"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("records.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_download_dir_default() {
        let path = Config::default().download_dir();
        assert!(path.to_string_lossy().contains("downloads"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("bhumibandhu"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
slot_key = "district_records"

[records]
reject_duplicate_ids = true

[display]
decimals = 4
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.slot_key, "district_records");
        assert!(config.records.reject_duplicate_ids);
        assert!(config.records.seed_on_empty);
        assert_eq!(config.display.decimals, 4);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[records]\nland_id_pattern = \"(unclosed\"\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_records_config_deserialize() {
        let json = r#"{"seed_on_empty": false}"#;
        let records: RecordsConfig = serde_json::from_str(json).unwrap();
        assert!(!records.seed_on_empty);
        assert!(!records.reject_duplicate_ids);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("slot_key"));
        assert!(json.contains("seed_on_empty"));
    }
}
