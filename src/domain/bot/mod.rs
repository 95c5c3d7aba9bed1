//! Generic bot framework.
//!
//! Every bot carries [`BotMeta`] and implements [`Bot::execute`]; the
//! provided [`Bot::run`] enforces activation and tracks executions.

pub mod interactive;
pub mod manager;
pub mod problem_solver;
pub mod registry;
pub mod task_automation;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::error::FxlabError;

pub type BotConfig = Map<String, Value>;

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Input handed to a bot run.
#[derive(Debug, Clone, PartialEq)]
pub enum BotInput {
    Text(String),
    Json(Value),
}

impl BotInput {
    /// Interpret command-line text: a JSON object or array becomes structured
    /// input, anything else is passed through as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str(trimmed) {
                return BotInput::Json(value);
            }
        }
        BotInput::Text(raw.to_string())
    }
}

impl From<&str> for BotInput {
    fn from(text: &str) -> Self {
        BotInput::Text(text.to_string())
    }
}

impl From<Value> for BotInput {
    fn from(value: Value) -> Self {
        BotInput::Json(value)
    }
}

/// Serialisable summary of a bot; also the persisted registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInfo {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub bot_type: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub execution_count: u64,
    pub last_execution: Option<NaiveDateTime>,
    #[serde(default)]
    pub config: BotConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotMeta {
    pub id: Uuid,
    pub name: String,
    /// Registry key of the bot's type, e.g. `problem-solver`.
    pub bot_type: String,
    pub config: BotConfig,
    pub created_at: NaiveDateTime,
    pub active: bool,
    pub execution_count: u64,
    pub last_execution: Option<NaiveDateTime>,
}

impl BotMeta {
    /// Fresh, inactive metadata. Without a name the bot is called
    /// `<type_name>_<first 8 chars of id>`.
    pub fn new(bot_type: &str, type_name: &str, name: Option<&str>, config: BotConfig) -> Self {
        let id = Uuid::new_v4();
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => format!("{}_{}", type_name, &id.simple().to_string()[..8]),
        };
        BotMeta {
            id,
            name,
            bot_type: bot_type.to_string(),
            config,
            created_at: now(),
            active: false,
            execution_count: 0,
            last_execution: None,
        }
    }

    pub fn info(&self) -> BotInfo {
        BotInfo {
            id: self.id,
            name: self.name.clone(),
            bot_type: self.bot_type.clone(),
            active: self.active,
            created_at: self.created_at,
            execution_count: self.execution_count,
            last_execution: self.last_execution,
            config: self.config.clone(),
        }
    }
}

impl From<BotInfo> for BotMeta {
    fn from(info: BotInfo) -> Self {
        BotMeta {
            id: info.id,
            name: info.name,
            bot_type: info.bot_type,
            config: info.config,
            created_at: info.created_at,
            active: info.active,
            execution_count: info.execution_count,
            last_execution: info.last_execution,
        }
    }
}

pub trait Bot {
    fn meta(&self) -> &BotMeta;

    fn meta_mut(&mut self) -> &mut BotMeta;

    /// The bot's behaviour. Called only through [`Bot::run`].
    fn execute(&mut self, input: BotInput) -> Result<Value, FxlabError>;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn activate(&mut self) {
        self.meta_mut().active = true;
    }

    fn deactivate(&mut self) {
        self.meta_mut().active = false;
    }

    fn is_active(&self) -> bool {
        self.meta().active
    }

    fn info(&self) -> BotInfo {
        self.meta().info()
    }

    /// Merge `config` into the bot's configuration, replacing existing keys.
    fn update_config(&mut self, config: BotConfig) {
        self.meta_mut().config.extend(config);
    }

    fn run(&mut self, input: BotInput) -> Result<Value, FxlabError> {
        if !self.is_active() {
            return Err(FxlabError::BotInactive {
                name: self.name().to_string(),
            });
        }

        let meta = self.meta_mut();
        meta.execution_count += 1;
        meta.last_execution = Some(now());
        debug!(bot = %meta.name, executions = meta.execution_count, "running bot");

        self.execute(input).map_err(|e| match e {
            FxlabError::Execution { .. } => e,
            other => FxlabError::Execution {
                reason: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo {
        meta: BotMeta,
    }

    impl Bot for Echo {
        fn meta(&self) -> &BotMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut BotMeta {
            &mut self.meta
        }

        fn execute(&mut self, input: BotInput) -> Result<Value, FxlabError> {
            match input {
                BotInput::Text(t) if t == "fail" => Err(FxlabError::InvalidInput {
                    bot: self.meta.name.clone(),
                    reason: "asked to fail".into(),
                }),
                BotInput::Text(t) => Ok(json!(t)),
                BotInput::Json(v) => Ok(v),
            }
        }
    }

    fn echo(name: Option<&str>) -> Echo {
        Echo {
            meta: BotMeta::new("echo", "EchoBot", name, BotConfig::new()),
        }
    }

    #[test]
    fn default_name_uses_type_and_id_prefix() {
        let bot = echo(None);
        let prefix = &bot.id().simple().to_string()[..8];
        assert_eq!(bot.name(), format!("EchoBot_{prefix}"));
        assert!(!bot.is_active());
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let bot = echo(Some("  "));
        assert!(bot.name().starts_with("EchoBot_"));
    }

    #[test]
    fn run_requires_activation() {
        let mut bot = echo(Some("quiet"));
        let err = bot.run("hi".into()).unwrap_err();
        assert_eq!(err.to_string(), "Bot quiet is not active");
        assert_eq!(bot.meta().execution_count, 0);
    }

    #[test]
    fn run_tracks_executions() {
        let mut bot = echo(None);
        bot.activate();
        assert_eq!(bot.run("hi".into()).unwrap(), json!("hi"));
        bot.run(BotInput::Json(json!({"a": 1}))).unwrap();
        assert_eq!(bot.meta().execution_count, 2);
        assert!(bot.meta().last_execution.is_some());
    }

    #[test]
    fn run_wraps_failures() {
        let mut bot = echo(Some("e"));
        bot.activate();
        let err = bot.run("fail".into()).unwrap_err();
        assert!(matches!(err, FxlabError::Execution { .. }));
        assert!(err.to_string().starts_with("Bot execution failed: "));
        assert_eq!(bot.meta().execution_count, 1);
    }

    #[test]
    fn update_config_merges() {
        let mut bot = echo(None);
        bot.update_config(json!({"a": 1, "b": 2}).as_object().unwrap().clone());
        bot.update_config(json!({"b": 3}).as_object().unwrap().clone());
        assert_eq!(bot.info().config["a"], 1);
        assert_eq!(bot.info().config["b"], 3);
    }

    #[test]
    fn info_round_trips_into_meta() {
        let mut bot = echo(Some("keeper"));
        bot.activate();
        let info = bot.info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "echo");
        let back: BotInfo = serde_json::from_value(json).unwrap();
        assert_eq!(BotMeta::from(back), bot.meta);
    }

    #[test]
    fn input_parse_detects_json() {
        assert_eq!(
            BotInput::parse(r#"{"action": "get_context"}"#),
            BotInput::Json(json!({"action": "get_context"}))
        );
        assert_eq!(BotInput::parse("status"), BotInput::Text("status".into()));
        assert_eq!(BotInput::parse("{oops"), BotInput::Text("{oops".into()));
    }
}
