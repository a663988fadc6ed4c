//! Configuration Module
//! Infrastructure settings only; the views themselves are fixed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read from the working directory when present.
pub const CONFIG_FILE: &str = "retail_pulse.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// The retail CSV extract loaded at startup.
    pub data_path: PathBuf,
    /// Symbol shown in front of monetary values.
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/online_retail_II.csv"),
            currency_symbol: "€".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// A missing file means defaults; a malformed file logs a warning and
    /// also falls back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("no/such/config.json"));
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.data_path, PathBuf::from("data/online_retail_II.csv"));
    }

    #[test]
    fn reads_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retail_pulse.json");
        std::fs::write(&path, r#"{"currency_symbol": "£"}"#).unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.currency_symbol, "£");
        // Unspecified fields keep their defaults.
        assert_eq!(config.data_path, PathBuf::from("data/online_retail_II.csv"));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retail_pulse.json");
        std::fs::write(&path, "{not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.currency_symbol, "€");
    }
}
