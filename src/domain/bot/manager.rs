//! Bot lifecycle orchestration over a [`BotRegistry`].

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::interactive::{self, InteractiveBot};
use super::problem_solver::{self, ProblemSolverBot};
use super::registry::BotRegistry;
use super::task_automation::{self, TaskAutomationBot};
use super::{BotConfig, BotInfo, BotInput};
use crate::domain::error::FxlabError;
use crate::ports::registry_port::RegistryPort;

pub const PROBLEM_SOLVER: &str = "problem-solver";
pub const TASK_AUTOMATION: &str = "task-automation";
pub const INTERACTIVE: &str = "interactive";

pub struct BotManager {
    registry: BotRegistry,
}

impl BotManager {
    /// Manager backed by `store`; previously stored bots are restored.
    pub fn new(store: Box<dyn RegistryPort>) -> Self {
        Self::with_registry(BotRegistry::new(store))
    }

    pub fn in_memory() -> Self {
        Self::with_registry(BotRegistry::in_memory())
    }

    fn with_registry(mut registry: BotRegistry) -> Self {
        registry.register_bot_type(
            PROBLEM_SOLVER,
            problem_solver::TYPE_NAME,
            ProblemSolverBot::boxed,
        );
        registry.register_bot_type(
            TASK_AUTOMATION,
            task_automation::TYPE_NAME,
            TaskAutomationBot::boxed,
        );
        registry.register_bot_type(INTERACTIVE, interactive::TYPE_NAME, InteractiveBot::boxed);
        registry.restore();
        Self { registry }
    }

    /// Create and activate a bot. Returns its id.
    pub fn create_bot(
        &mut self,
        bot_type: &str,
        name: Option<&str>,
        config: BotConfig,
    ) -> Result<Uuid, FxlabError> {
        let id = self.registry.create_bot(bot_type, name, config)?;
        if let Some(bot) = self.registry.get_bot_mut(id) {
            bot.activate();
        }
        self.registry.persist();
        info!(%id, bot_type, "bot created");
        Ok(id)
    }

    /// Resolve an id or, failing that, a name.
    fn resolve(&self, identifier: &str) -> Option<Uuid> {
        self.registry
            .get_bot(identifier)
            .or_else(|| self.registry.get_bot_by_name(identifier))
            .map(|b| b.id())
    }

    pub fn get_bot(&self, identifier: &str) -> Option<BotInfo> {
        self.resolve(identifier)
            .and_then(|id| self.registry.get_bot(&id.to_string()))
            .map(|b| b.info())
    }

    pub fn run_bot(&mut self, identifier: &str, input: BotInput) -> Result<Value, FxlabError> {
        let id = self
            .resolve(identifier)
            .ok_or_else(|| FxlabError::BotNotFound(identifier.to_string()))?;
        let bot = self
            .registry
            .get_bot_mut(id)
            .ok_or_else(|| FxlabError::BotNotFound(identifier.to_string()))?;
        let result = bot.run(input);
        self.registry.persist();
        result
    }

    pub fn list_bots(&self) -> Vec<BotInfo> {
        self.registry.list_bots().iter().map(|b| b.info()).collect()
    }

    /// First bot of `bot_type` (matching `name` when given), creating one
    /// if none exists.
    pub fn get_or_create_bot(
        &mut self,
        bot_type: &str,
        name: Option<&str>,
    ) -> Result<Uuid, FxlabError> {
        if !self.registry.has_bot_type(bot_type) {
            return Err(FxlabError::UnknownBotType(bot_type.to_string()));
        }
        let existing = self
            .registry
            .get_bots_by_type(bot_type)
            .into_iter()
            .find(|b| name.is_none_or(|n| b.name() == n))
            .map(|b| b.id());
        match existing {
            Some(id) => Ok(id),
            None => self.create_bot(bot_type, name, BotConfig::new()),
        }
    }

    fn set_active(&mut self, identifier: &str, active: bool) -> bool {
        let Some(id) = self.resolve(identifier) else {
            return false;
        };
        let Some(bot) = self.registry.get_bot_mut(id) else {
            return false;
        };
        if active {
            bot.activate();
        } else {
            bot.deactivate();
        }
        self.registry.persist();
        true
    }

    pub fn activate_bot(&mut self, identifier: &str) -> bool {
        self.set_active(identifier, true)
    }

    pub fn deactivate_bot(&mut self, identifier: &str) -> bool {
        self.set_active(identifier, false)
    }

    pub fn remove_bot(&mut self, identifier: &str) -> bool {
        match self.resolve(identifier) {
            Some(id) => self.registry.remove_bot(id),
            None => false,
        }
    }

    pub fn bot_types(&self) -> Vec<String> {
        self.registry.list_bot_types()
    }

    /// Deactivate every bot.
    pub fn shutdown(&mut self) {
        for bot in self.registry.list_bots_mut() {
            bot.deactivate();
        }
        self.registry.persist();
        info!("bot manager shutdown complete");
    }
}
