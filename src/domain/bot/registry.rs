//! Bot type registry and live instance store.

use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Bot, BotConfig, BotMeta};
use crate::domain::error::FxlabError;
use crate::ports::registry_port::RegistryPort;

/// Builds a bot around existing metadata.
pub type BotBuilder = fn(BotMeta) -> Box<dyn Bot>;

#[derive(Clone, Copy)]
struct BotType {
    type_name: &'static str,
    build: BotBuilder,
}

pub struct BotRegistry {
    types: BTreeMap<String, BotType>,
    bots: Vec<Box<dyn Bot>>,
    store: Option<Box<dyn RegistryPort>>,
}

impl BotRegistry {
    /// Registry persisted through `store` on every change.
    pub fn new(store: Box<dyn RegistryPort>) -> Self {
        Self {
            types: BTreeMap::new(),
            bots: Vec::new(),
            store: Some(store),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            types: BTreeMap::new(),
            bots: Vec::new(),
            store: None,
        }
    }

    /// Register a constructor under `key`. `type_name` prefixes default bot
    /// names.
    pub fn register_bot_type(&mut self, key: &str, type_name: &'static str, build: BotBuilder) {
        self.types
            .insert(key.to_string(), BotType { type_name, build });
    }

    pub fn list_bot_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn has_bot_type(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn create_bot(
        &mut self,
        bot_type: &str,
        name: Option<&str>,
        config: BotConfig,
    ) -> Result<Uuid, FxlabError> {
        let kind = self
            .types
            .get(bot_type)
            .copied()
            .ok_or_else(|| FxlabError::UnknownBotType(bot_type.to_string()))?;

        let bot = (kind.build)(BotMeta::new(bot_type, kind.type_name, name, config));
        let id = bot.id();
        debug!(bot = %bot.name(), %id, bot_type, "bot created");
        self.bots.push(bot);
        self.persist();
        Ok(id)
    }

    pub fn get_bot(&self, id: &str) -> Option<&dyn Bot> {
        let id = Uuid::parse_str(id).ok()?;
        self.bots.iter().find(|b| b.id() == id).map(|b| b.as_ref())
    }

    pub fn get_bot_mut(&mut self, id: Uuid) -> Option<&mut Box<dyn Bot>> {
        self.bots.iter_mut().find(|b| b.id() == id)
    }

    pub fn get_bot_by_name(&self, name: &str) -> Option<&dyn Bot> {
        self.bots
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    pub fn list_bots(&self) -> &[Box<dyn Bot>] {
        &self.bots
    }

    pub fn list_bots_mut(&mut self) -> &mut [Box<dyn Bot>] {
        &mut self.bots
    }

    pub fn get_bots_by_type(&self, bot_type: &str) -> Vec<&dyn Bot> {
        self.bots
            .iter()
            .filter(|b| b.meta().bot_type == bot_type)
            .map(|b| b.as_ref() as &dyn Bot)
            .collect()
    }

    pub fn remove_bot(&mut self, id: Uuid) -> bool {
        let before = self.bots.len();
        self.bots.retain(|b| b.id() != id);
        let removed = self.bots.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Write every bot's metadata to the store. Failures are logged only.
    pub fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let records: Vec<_> = self.bots.iter().map(|b| b.info()).collect();
        if let Err(e) = store.save(&records) {
            warn!(error = %e, "could not save bot registry");
        }
    }

    /// Re-create stored bots. Records of unregistered types are skipped.
    /// Returns how many bots were restored.
    pub fn restore(&mut self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };
        let records = match store.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "could not load bot registry");
                return 0;
            }
        };

        let mut restored = 0;
        for record in records {
            let Some(kind) = self.types.get(&record.bot_type).copied() else {
                warn!(
                    bot = %record.name,
                    bot_type = %record.bot_type,
                    "skipping bot of unknown type"
                );
                continue;
            };
            if self.bots.iter().any(|b| b.id() == record.id) {
                continue;
            }
            self.bots.push((kind.build)(BotMeta::from(record)));
            restored += 1;
        }
        debug!(restored, "bot registry loaded");
        restored
    }
}
