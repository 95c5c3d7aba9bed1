//! Command-dispatching conversational bot.
//!
//! Text input is `<command> [args...]`; JSON input is a structured
//! `{"action": .., "data": {..}}` request. Every interaction is kept in the
//! conversation history.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Bot, BotInput, BotMeta};
use crate::domain::error::FxlabError;

pub const TYPE_NAME: &str = "InteractiveBot";

const DEFAULT_HISTORY: usize = 5;
const MAX_HISTORY: usize = 20;
const HISTORY_ENTRY_WIDTH: usize = 50;
const CONTEXT_VALUE_WIDTH: usize = 100;

const HELP_TEXT: &str = "Interactive Bot Help:
- help: Show this help message
- commands: List all available commands
- status: Show bot status and info
- history: Show conversation history
- clear: Clear conversation history
- reset: Reset bot context
- context: Show current context

You can also use structured JSON input for advanced interactions.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub response: String,
    pub action: String,
    pub context: Map<String, Value>,
    pub suggestions: Vec<String>,
}

impl Reply {
    pub fn new(response: impl Into<String>, action: &str, suggestions: &[&str]) -> Self {
        Reply {
            response: response.into(),
            action: action.to_string(),
            context: Map::new(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub timestamp: NaiveDateTime,
    pub user_input: String,
    pub bot_response: Reply,
}

/// Custom command handler: receives the arguments and the current context.
pub type CommandHandler = Box<dyn Fn(&[String], &Map<String, Value>) -> Reply>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Help,
    Commands,
    Status,
    History,
    Clear,
    Reset,
    Context,
}

enum Command {
    Builtin(Builtin),
    Custom(CommandHandler),
}

pub struct InteractiveBot {
    meta: BotMeta,
    commands: Vec<(String, Command)>,
    context: Map<String, Value>,
    history: Vec<Interaction>,
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width - 3).collect();
    format!("{kept}...")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl InteractiveBot {
    pub fn new(meta: BotMeta) -> Self {
        let mut bot = Self {
            meta,
            commands: Vec::new(),
            context: Map::new(),
            history: Vec::new(),
        };
        for (name, builtin) in [
            ("help", Builtin::Help),
            ("commands", Builtin::Commands),
            ("status", Builtin::Status),
            ("history", Builtin::History),
            ("clear", Builtin::Clear),
            ("reset", Builtin::Reset),
            ("context", Builtin::Context),
        ] {
            bot.insert_command(name, Command::Builtin(builtin));
        }
        bot
    }

    pub fn boxed(meta: BotMeta) -> Box<dyn Bot> {
        Box::new(Self::new(meta))
    }

    fn insert_command(&mut self, name: &str, command: Command) {
        let name = name.to_lowercase();
        match self.commands.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = command,
            None => self.commands.push((name, command)),
        }
    }

    /// Register (or replace) a command. Names are case-insensitive.
    pub fn register_command(&mut self, name: &str, handler: CommandHandler) {
        self.insert_command(name, Command::Custom(handler));
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn history(&self) -> &[Interaction] {
        &self.history
    }

    pub fn interact(&mut self, input: BotInput) -> Reply {
        let (user_input, mut reply) = match input {
            BotInput::Text(text) => {
                let text = text.trim().to_string();
                let reply = self.process_text(&text);
                (text, reply)
            }
            BotInput::Json(value) => {
                let reply = self.process_json(&value);
                (value.to_string(), reply)
            }
        };
        reply.context = self.context.clone();

        self.history.push(Interaction {
            timestamp: self.meta.last_execution.unwrap_or(self.meta.created_at),
            user_input,
            bot_response: reply.clone(),
        });
        reply
    }

    fn process_text(&mut self, text: &str) -> Reply {
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return empty_input();
        };
        let command = first.to_lowercase();
        let args: Vec<String> = words.map(String::from).collect();

        let builtin = match self.commands.iter().find(|(n, _)| *n == command) {
            Some((_, Command::Custom(handler))) => return handler(&args, &self.context),
            Some((_, Command::Builtin(b))) => *b,
            None => return self.unknown_command(&command),
        };
        self.run_builtin(builtin, &args)
    }

    fn unknown_command(&self, command: &str) -> Reply {
        let similar: Vec<&str> = self
            .commands
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| n.contains(command) || command.contains(n))
            .collect();

        let mut response = format!("I don't recognize the command '{command}'.");
        let mut suggestions = vec!["help", "commands"];
        if similar.is_empty() {
            response.push_str(" Type 'help' to see available commands.");
        } else {
            response.push_str(&format!(" Did you mean: {}?", similar.join(", ")));
            suggestions.extend(similar);
        }
        Reply::new(response, "unknown_command", &suggestions)
    }

    fn run_builtin(&mut self, builtin: Builtin, args: &[String]) -> Reply {
        match builtin {
            Builtin::Help => Reply::new(HELP_TEXT, "help_shown", &["commands", "status"]),
            Builtin::Commands => {
                let names = self.command_names();
                let mut suggestions = vec!["help"];
                suggestions.extend(names.iter().take(3));
                Reply::new(
                    format!("Available commands: {}", names.join(", ")),
                    "commands_listed",
                    &suggestions,
                )
            }
            Builtin::Status => {
                let id = self.meta.id.simple().to_string();
                let lines = [
                    format!("bot_name: {}", self.meta.name),
                    format!("bot_id: {}", &id[..8]),
                    format!("active: {}", self.meta.active),
                    format!("conversations: {}", self.history.len()),
                    format!("context_items: {}", self.context.len()),
                    format!("registered_commands: {}", self.commands.len()),
                ];
                Reply::new(
                    format!("Bot Status:\n{}", lines.join("\n")),
                    "status_shown",
                    &["history", "context", "help"],
                )
            }
            Builtin::History => {
                let limit = args
                    .first()
                    .and_then(|a| a.parse::<usize>().ok())
                    .map_or(DEFAULT_HISTORY, |n| n.min(MAX_HISTORY));
                let recent = &self.history[self.history.len().saturating_sub(limit)..];
                let mut text = format!(
                    "Recent {} of {} interactions:",
                    recent.len(),
                    self.history.len()
                );
                for (i, interaction) in recent.iter().enumerate() {
                    text.push_str(&format!(
                        "\n{}. User: {}",
                        i + 1,
                        truncate(&interaction.user_input, HISTORY_ENTRY_WIDTH)
                    ));
                }
                Reply::new(text, "history_shown", &["clear", "status"])
            }
            Builtin::Clear => {
                let cleared = self.history.len();
                self.history.clear();
                Reply::new(
                    format!("Cleared {cleared} conversation history items"),
                    "history_cleared",
                    &["status", "help"],
                )
            }
            Builtin::Reset => {
                self.context.clear();
                self.history.clear();
                Reply::new(
                    "Bot context and history have been reset",
                    "bot_reset",
                    &["help", "status"],
                )
            }
            Builtin::Context => {
                if self.context.is_empty() {
                    return Reply::new(
                        "Context is empty",
                        "context_shown",
                        &["Use JSON input to set context"],
                    );
                }
                let mut text = String::from("Current context:");
                for (key, value) in &self.context {
                    text.push_str(&format!(
                        "\n  {}: {}",
                        key,
                        truncate(&display_value(value), CONTEXT_VALUE_WIDTH)
                    ));
                }
                Reply::new(text, "context_shown", &["reset", "status"])
            }
        }
    }

    fn process_json(&mut self, value: &Value) -> Reply {
        let Value::Object(request) = value else {
            if value.is_null() {
                return empty_input();
            }
            return Reply::new(
                format!("I received: {value}. I'm not sure how to process this type of input."),
                "unknown_input",
                &["help", "Use text commands or structured JSON input"],
            );
        };

        let action = request
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let data = match request.get("data") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        match action {
            "set_context" => {
                let count = data.len();
                self.context.extend(data);
                Reply::new(
                    format!("Updated context with {count} items"),
                    "context_updated",
                    &["status", "get_context"],
                )
            }
            "get_context" => Reply::new(
                format!("Current context: {}", Value::Object(self.context.clone())),
                "context_retrieved",
                &["set_context", "clear_context"],
            ),
            "execute_task" => {
                let task_type = data
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("generic")
                    .to_string();
                Reply::new(
                    format!(
                        "Executed {task_type} task with data: {}",
                        Value::Object(data)
                    ),
                    "task_executed",
                    &["status", "history"],
                )
            }
            other => Reply::new(
                format!("Unknown action: {other}"),
                "unknown_action",
                &["set_context", "get_context", "execute_task"],
            ),
        }
    }
}

fn empty_input() -> Reply {
    Reply::new(
        "I didn't receive any input. How can I help you?",
        "prompt",
        &["help", "commands", "status"],
    )
}

impl Bot for InteractiveBot {
    fn meta(&self) -> &BotMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut BotMeta {
        &mut self.meta
    }

    fn execute(&mut self, input: BotInput) -> Result<Value, FxlabError> {
        Ok(serde_json::to_value(self.interact(input))?)
    }
}
