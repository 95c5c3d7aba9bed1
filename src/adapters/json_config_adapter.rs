//! JSON file configuration adapter.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::config::AppConfig;
use crate::domain::config_validation::validate_config;
use crate::domain::error::FxlabError;
use crate::ports::config_port::ConfigPort;

pub struct JsonConfigAdapter {
    path: PathBuf,
}

impl JsonConfigAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse without touching the disk when the file is missing.
    pub fn read(&self) -> Result<AppConfig, FxlabError> {
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| FxlabError::ConfigParse {
            file: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Merge a JSON patch into the stored configuration, save it, and return
    /// the reloaded result. A patch that fails validation leaves the file as is.
    pub fn update(&self, patch: &Value) -> Result<AppConfig, FxlabError> {
        let merged = self.load()?.merged(patch)?;
        validate_config(&merged)?;
        self.save(&merged)?;
        self.load()
    }
}

impl ConfigPort for JsonConfigAdapter {
    fn load(&self) -> Result<AppConfig, FxlabError> {
        if !self.path.exists() {
            let config = AppConfig::default();
            match self.save(&config) {
                Ok(()) => info!(path = %self.path.display(), "wrote default config"),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "could not write default config")
                }
            }
            return Ok(config);
        }
        self.read()
    }

    fn save(&self, config: &AppConfig) -> Result<(), FxlabError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let adapter = JsonConfigAdapter::new(&path);

        let config = adapter.load().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(adapter.read().unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let file = create_temp_config(r#"{"trade_amount": 250.0, "risk_level": "LOW"}"#);
        let config = JsonConfigAdapter::new(file.path()).load().unwrap();
        assert!((config.trade_amount - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.risk_level, "LOW");
        assert!((config.initial_balance - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = create_temp_config("{ not json");
        let err = JsonConfigAdapter::new(file.path()).load().unwrap_err();
        assert!(matches!(err, FxlabError::ConfigParse { .. }));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cfg.json");
        let adapter = JsonConfigAdapter::new(&path);
        adapter.save(&AppConfig::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn update_merges_and_persists() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonConfigAdapter::new(dir.path().join("config.json"));

        let updated = adapter
            .update(&json!({"max_positions": 2, "trading_pairs": ["EUR/USD"]}))
            .unwrap();
        assert_eq!(updated.max_positions, 2);

        let reloaded = JsonConfigAdapter::new(adapter.path()).load().unwrap();
        assert_eq!(reloaded.trading_pairs, vec!["EUR/USD".to_string()]);
        assert_eq!(reloaded.indicators.sma_period, 20);
    }

    #[test]
    fn invalid_update_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonConfigAdapter::new(dir.path().join("config.json"));
        adapter.load().unwrap();

        let err = adapter.update(&json!({"trade_amount": -1.0})).unwrap_err();
        assert!(matches!(err, FxlabError::ConfigInvalid { .. }));
        assert_eq!(adapter.read().unwrap(), AppConfig::default());

        let err = adapter.update(&json!({"trade_amount": "lots"})).unwrap_err();
        assert!(matches!(err, FxlabError::Json(_)));
    }
}
