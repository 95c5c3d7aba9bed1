//! JSON file store for bot registry records.
//!
//! Layout: `{"bots": {"<id>": <BotInfo>, ...}}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::bot::BotInfo;
use crate::domain::error::FxlabError;
use crate::ports::registry_port::RegistryPort;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    bots: BTreeMap<String, BotInfo>,
}

pub struct JsonRegistryAdapter {
    path: PathBuf,
}

impl JsonRegistryAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RegistryPort for JsonRegistryAdapter {
    fn load(&self) -> Result<Vec<BotInfo>, FxlabError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let file: RegistryFile = serde_json::from_str(&content)?;
        let mut records: Vec<BotInfo> = file.bots.into_values().collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    fn save(&self, records: &[BotInfo]) -> Result<(), FxlabError> {
        let file = RegistryFile {
            bots: records
                .iter()
                .map(|r| (r.id.to_string(), r.clone()))
                .collect(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}
