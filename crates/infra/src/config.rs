//! Configuration loading and representation.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

pub const DATA_DIR_ENV: &str = "WORKWEAR_DATA_DIR";
pub const LOW_STOCK_ENV: &str = "WORKWEAR_LOW_STOCK_THRESHOLD";

pub const INVENTORY_FILE: &str = "inventory.csv";
pub const ISSUANCE_FILE: &str = "issuance_log.csv";
pub const VOCABULARY_FILE: &str = "vocabulary.csv";

/// Table names used by older data directories. Read only when the current
/// name is absent; saves always use the current names.
pub const LEGACY_INVENTORY_FILE: &str = "raktar_adatok.csv";
pub const LEGACY_ISSUANCE_FILE: &str = "kiadas_naplo.csv";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Where the tables live and how stock is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub low_stock_threshold: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl TrackerConfig {
    /// Read `WORKWEAR_DATA_DIR` and `WORKWEAR_LOW_STOCK_THRESHOLD`, falling
    /// back to the current directory and a threshold of 5.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(value) = lookup(LOW_STOCK_ENV).filter(|v| !v.trim().is_empty()) {
            config.low_stock_threshold =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: LOW_STOCK_ENV,
                        value: value.clone(),
                    })?;
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, low_stock_threshold: Option<u32>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(threshold) = low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(INVENTORY_FILE)
    }

    pub fn issuance_path(&self) -> PathBuf {
        self.data_dir.join(ISSUANCE_FILE)
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.data_dir.join(VOCABULARY_FILE)
    }

    pub fn legacy_inventory_path(&self) -> PathBuf {
        self.data_dir.join(LEGACY_INVENTORY_FILE)
    }

    pub fn legacy_issuance_path(&self) -> PathBuf {
        self.data_dir.join(LEGACY_ISSUANCE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.inventory_path(), PathBuf::from("./inventory.csv"));
    }

    #[test]
    fn environment_sets_dir_and_threshold() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/srv/workwear"),
            (LOW_STOCK_ENV, "10"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir(), Path::new("/srv/workwear"));
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(
            config.issuance_path(),
            PathBuf::from("/srv/workwear/issuance_log.csv")
        );
    }

    #[test]
    fn bad_threshold_is_reported() {
        let err = TrackerConfig::from_lookup(lookup(&[(LOW_STOCK_ENV, "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: LOW_STOCK_ENV,
                value: "five".to_string()
            }
        );
    }

    #[test]
    fn overrides_win_over_environment() {
        let config = TrackerConfig::from_lookup(lookup(&[(LOW_STOCK_ENV, "10")]))
            .unwrap()
            .with_overrides(Some(PathBuf::from("data")), Some(2));
        assert_eq!(config.data_dir(), Path::new("data"));
        assert_eq!(config.low_stock_threshold, 2);
        assert_eq!(config.vocabulary_path(), PathBuf::from("data/vocabulary.csv"));
    }
}
