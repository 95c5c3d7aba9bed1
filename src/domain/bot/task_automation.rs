//! Task automation bot: named action lists with optional conditions and
//! schedules.
//!
//! Actions are declarative JSON objects tagged by `type`. System commands are
//! checked against an allow-list and simulated, never spawned.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use tracing::{debug, error, info, warn};

use super::{now, Bot, BotInput, BotMeta};
use crate::domain::error::FxlabError;

pub const TYPE_NAME: &str = "TaskAutomationBot";

const SAFE_COMMANDS: &[&str] = &["echo", "date", "pwd", "ls"];

/// Longest accepted `wait` action, in seconds.
const MAX_WAIT_SECONDS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default = "unknown_action")]
    pub kind: String,
    #[serde(default)]
    pub halt_on_error: bool,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

fn unknown_action() -> String {
    "unknown".into()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
}

/// `interval` (seconds, recurring) wins over `at` (one-shot) when both are set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

/// A task as submitted: either stored with [`TaskAutomationBot::add_task`] or
/// run directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefinition {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub actions: Vec<Action>,
    pub schedule: Option<Schedule>,
    pub conditions: Conditions,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub actions: Vec<Action>,
    pub schedule: Option<Schedule>,
    pub conditions: Conditions,
    pub created_at: NaiveDateTime,
    pub enabled: bool,
    pub execution_count: u64,
    pub last_execution: Option<NaiveDateTime>,
    pub last_result: Option<TaskRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>, details: Value) -> Self {
        ActionOutcome {
            success: true,
            message: message.into(),
            details,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        ActionOutcome {
            success: false,
            message: message.into(),
            details: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action_index: usize,
    pub action_type: String,
    pub result: ActionOutcome,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRun {
    pub task_id: Option<String>,
    pub task_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_seconds: f64,
    pub actions_executed: usize,
    pub actions_successful: usize,
    pub results: Vec<ActionRecord>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed(TaskRun),
    Skipped { task: String, reason: String },
    Rejected { task: String, error: String },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Completed(run) if run.success)
    }
}

/// What to run: a stored task by id, or an ad-hoc definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskRef {
    Id(String),
    Definition(TaskDefinition),
}

#[derive(Debug, Clone, PartialEq)]
struct ScheduledRun {
    task_id: String,
    next_run: NaiveDateTime,
    interval: Option<u64>,
}

pub struct TaskAutomationBot {
    meta: BotMeta,
    tasks: Vec<Task>,
    scheduled: Vec<ScheduledRun>,
    history: Vec<TaskOutcome>,
}

impl TaskAutomationBot {
    pub fn new(meta: BotMeta) -> Self {
        Self {
            meta,
            tasks: Vec::new(),
            scheduled: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn boxed(meta: BotMeta) -> Box<dyn Bot> {
        Box::new(Self::new(meta))
    }

    pub fn add_task(&mut self, definition: TaskDefinition) -> Result<String, FxlabError> {
        self.add_task_at(definition, now())
    }

    /// Store a task and arm its schedule relative to `now`. Returns the id
    /// `task_<n>_<unix seconds>`.
    pub fn add_task_at(
        &mut self,
        definition: TaskDefinition,
        now: NaiveDateTime,
    ) -> Result<String, FxlabError> {
        let id = format!("task_{}_{}", self.tasks.len() + 1, now.and_utc().timestamp());

        if let Some(schedule) = &definition.schedule {
            if let Some(run) = self.plan(&id, schedule, now)? {
                self.scheduled.push(run);
            }
        }

        let task = Task {
            name: definition
                .name
                .unwrap_or_else(|| format!("Task_{}", id)),
            task_type: definition.task_type.unwrap_or_else(|| "general".into()),
            actions: definition.actions,
            schedule: definition.schedule,
            conditions: definition.conditions,
            created_at: now,
            enabled: definition.enabled.unwrap_or(true),
            execution_count: 0,
            last_execution: None,
            last_result: None,
            id: id.clone(),
        };
        info!(task = %task.name, id = %id, "task added");
        self.tasks.push(task);
        Ok(id)
    }

    fn plan(
        &self,
        task_id: &str,
        schedule: &Schedule,
        now: NaiveDateTime,
    ) -> Result<Option<ScheduledRun>, FxlabError> {
        if let Some(interval) = schedule.interval {
            let next_run = after_interval(now, interval).ok_or_else(|| FxlabError::InvalidInput {
                bot: self.meta.name.clone(),
                reason: format!("schedule interval out of range: {interval}"),
            })?;
            return Ok(Some(ScheduledRun {
                task_id: task_id.to_string(),
                next_run,
                interval: Some(interval),
            }));
        }
        if let Some(at) = &schedule.at {
            let next_run = parse_timestamp(at).ok_or_else(|| FxlabError::InvalidInput {
                bot: self.meta.name.clone(),
                reason: format!("invalid schedule time: {at}"),
            })?;
            return Ok(Some(ScheduledRun {
                task_id: task_id.to_string(),
                next_run,
                interval: None,
            }));
        }
        Ok(None)
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn list_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_history(&self) -> &[TaskOutcome] {
        &self.history
    }

    /// Enable or disable a stored task. Returns false for unknown ids.
    pub fn set_task_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn run_task(&mut self, task: TaskRef) -> TaskOutcome {
        self.run_task_at(task, now())
    }

    pub fn run_task_at(&mut self, task: TaskRef, now: NaiveDateTime) -> TaskOutcome {
        let (id, name, actions, conditions, enabled) = match task {
            TaskRef::Id(id) => match self.get_task(&id) {
                Some(t) => (
                    Some(t.id.clone()),
                    t.name.clone(),
                    t.actions.clone(),
                    t.conditions.clone(),
                    t.enabled,
                ),
                None => {
                    return TaskOutcome::Rejected {
                        task: id.clone(),
                        error: format!("Task not found: {id}"),
                    };
                }
            },
            TaskRef::Definition(def) => (
                def.id,
                def.name.unwrap_or_else(|| "Unknown".into()),
                def.actions,
                def.conditions,
                def.enabled.unwrap_or(true),
            ),
        };

        if !enabled {
            return TaskOutcome::Rejected {
                task: name,
                error: "Task is disabled".into(),
            };
        }

        match conditions_met(&conditions, now) {
            Ok(true) => {}
            Ok(false) => {
                debug!(task = %name, "conditions not met");
                return TaskOutcome::Skipped {
                    task: name,
                    reason: "Conditions not met".into(),
                };
            }
            Err(reason) => {
                let outcome = TaskOutcome::Rejected { task: name, error: reason };
                self.history.push(outcome.clone());
                return outcome;
            }
        }

        let start = std::time::Instant::now();
        let mut results = Vec::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            let result = execute_action(action);
            let success = result.success;
            results.push(ActionRecord {
                action_index: i,
                action_type: action.kind.clone(),
                result,
                success,
            });
            if !success && action.halt_on_error {
                warn!(task = %name, action = i, "halting after failed action");
                break;
            }
        }
        let elapsed = start.elapsed();

        let run = TaskRun {
            task_id: id.clone(),
            task_name: name,
            start_time: now,
            end_time: Duration::from_std(elapsed)
                .ok()
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(now),
            duration_seconds: elapsed.as_secs_f64(),
            actions_executed: results.len(),
            actions_successful: results.iter().filter(|r| r.success).count(),
            success: results.iter().all(|r| r.success),
            results,
        };

        if let Some(id) = &id {
            if let Some(stored) = self.tasks.iter_mut().find(|t| &t.id == id) {
                stored.execution_count += 1;
                stored.last_execution = Some(run.end_time);
                stored.last_result = Some(run.clone());
            }
        }

        let outcome = TaskOutcome::Completed(run);
        self.history.push(outcome.clone());
        outcome
    }

    /// Ids of scheduled tasks whose next run is at or before `now`.
    pub fn due_tasks(&self, now: NaiveDateTime) -> Vec<String> {
        self.scheduled
            .iter()
            .filter(|s| s.next_run <= now)
            .map(|s| s.task_id.clone())
            .collect()
    }

    /// Run every due task. Recurring entries re-arm at `now + interval`;
    /// one-shot entries, and recurring ones that cannot be re-armed, are
    /// dropped.
    pub fn run_due(&mut self, now: NaiveDateTime) -> Vec<TaskOutcome> {
        let due = self.due_tasks(now);
        self.scheduled.retain_mut(|s| {
            if s.next_run > now {
                return true;
            }
            let Some(interval) = s.interval else {
                return false;
            };
            match after_interval(now, interval) {
                Some(next_run) => {
                    s.next_run = next_run;
                    true
                }
                None => {
                    warn!(task = %s.task_id, interval, "schedule out of range, dropping it");
                    false
                }
            }
        });
        due.into_iter()
            .map(|id| self.run_task_at(TaskRef::Id(id), now))
            .collect()
    }
}

/// `now + interval` seconds, or `None` when it leaves the calendar range.
fn after_interval(now: NaiveDateTime, interval: u64) -> Option<NaiveDateTime> {
    let seconds = i64::try_from(interval).ok()?;
    now.checked_add_signed(Duration::try_seconds(seconds)?)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok()
}

fn conditions_met(conditions: &Conditions, now: NaiveDateTime) -> Result<bool, String> {
    if let Some(range) = &conditions.time_range {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("invalid time {s:?}: {e}"))
        };
        let (start, end) = (parse(&range.start)?, parse(&range.end)?);
        let current = now.time();
        if current < start || current > end {
            return Ok(false);
        }
    }

    if let Some(days) = &conditions.days {
        let today = now.format("%A").to_string().to_lowercase();
        if !days.iter().any(|d| d.to_lowercase() == today) {
            return Ok(false);
        }
    }

    Ok(true)
}

fn param<'a>(action: &'a Action, key: &str) -> Option<&'a Value> {
    action.params.get(key)
}

fn param_str<'a>(action: &'a Action, key: &str, default: &'a str) -> &'a str {
    param(action, key).and_then(Value::as_str).unwrap_or(default)
}

fn execute_action(action: &Action) -> ActionOutcome {
    match action.kind.as_str() {
        "wait" => action_wait(action),
        "log" => action_log(action),
        "file_operation" => action_file_operation(action),
        "data_processing" => action_data_processing(action),
        "system_command" => action_system_command(action),
        other => ActionOutcome::failed(format!("Unknown action type: {other}")),
    }
}

fn action_wait(action: &Action) -> ActionOutcome {
    let seconds = param(action, "duration")
        .and_then(Value::as_f64)
        .unwrap_or(1.0)
        .max(0.0);
    if seconds > MAX_WAIT_SECONDS {
        return ActionOutcome::failed(format!(
            "Wait duration {seconds} exceeds {MAX_WAIT_SECONDS} seconds"
        ));
    }
    let Ok(duration) = std::time::Duration::try_from_secs_f64(seconds) else {
        return ActionOutcome::failed(format!("Invalid wait duration: {seconds}"));
    };
    std::thread::sleep(duration);
    ActionOutcome::ok(
        format!("Waited for {seconds} seconds"),
        json!({ "duration": seconds }),
    )
}

fn action_log(action: &Action) -> ActionOutcome {
    let message = param_str(action, "message", "Task executed");
    let level = param_str(action, "level", "info").to_lowercase();
    match level.as_str() {
        "error" => error!(target: "fxlab::task", "{message}"),
        "warning" | "warn" => warn!(target: "fxlab::task", "{message}"),
        "debug" => debug!(target: "fxlab::task", "{message}"),
        _ => info!(target: "fxlab::task", "{message}"),
    }
    ActionOutcome::ok(
        format!("Logged message: {message}"),
        json!({ "level": level }),
    )
}

fn action_file_operation(action: &Action) -> ActionOutcome {
    let operation = param_str(action, "operation", "read");
    let path = param_str(action, "file_path", "");

    let result = match operation {
        "read" => fs::read_to_string(path)
            .map(|content| (format!("Read file: {path}"), content.chars().count())),
        "write" => {
            let content = param_str(action, "content", "");
            fs::write(path, content)
                .map(|()| (format!("Wrote to file: {path}"), content.chars().count()))
        }
        other => return ActionOutcome::failed(format!("Unknown file operation: {other}")),
    };

    match result {
        Ok((message, length)) => {
            ActionOutcome::ok(message, json!({ "content_length": length }))
        }
        Err(e) => ActionOutcome::failed(format!("File operation failed: {e}")),
    }
}

/// Filter predicate: `{"op": "gt" | "lt" | "eq" | "ne" | "contains", "value": ..,
/// "field": optional object key}`.
fn matches_condition(item: &Value, condition: &Value) -> Result<bool, String> {
    let target = match condition.get("field").and_then(Value::as_str) {
        Some(field) => item.get(field).unwrap_or(&Value::Null),
        None => item,
    };
    let expected = condition.get("value").unwrap_or(&Value::Null);
    let op = condition.get("op").and_then(Value::as_str).unwrap_or("eq");

    let numeric = || match (target.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(format!("'{op}' needs numeric operands")),
    };

    Ok(match op {
        "eq" => target == expected,
        "ne" => target != expected,
        "gt" => {
            let (a, b) = numeric()?;
            a > b
        }
        "lt" => {
            let (a, b) = numeric()?;
            a < b
        }
        "contains" => match (target, expected) {
            (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
            (Value::Array(items), v) => items.contains(v),
            _ => false,
        },
        other => return Err(format!("unknown filter op: {other}")),
    })
}

/// Transform: `{"op": "upper" | "lower" | "multiply" | "add", "value": ..}`.
fn apply_transform(item: &Value, transformer: &Value) -> Result<Value, String> {
    let op = transformer.get("op").and_then(Value::as_str).unwrap_or("identity");
    let operand = transformer.get("value").and_then(Value::as_f64);

    match (op, item) {
        ("identity", v) => Ok(v.clone()),
        ("upper", Value::String(s)) => Ok(Value::String(s.to_uppercase())),
        ("lower", Value::String(s)) => Ok(Value::String(s.to_lowercase())),
        ("multiply", v) | ("add", v) => {
            let (Some(x), Some(k)) = (v.as_f64(), operand) else {
                return Err(format!("'{op}' needs numeric item and value"));
            };
            let y = if op == "multiply" { x * k } else { x + k };
            Ok(json!(y))
        }
        (op, v) => Err(format!("cannot apply '{op}' to {v}")),
    }
}

fn action_data_processing(action: &Action) -> ActionOutcome {
    let operation = param_str(action, "operation", "transform");
    let empty = Vec::new();
    let data = param(action, "data")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let processed: Result<Vec<Value>, String> = match operation {
        "filter" => match param(action, "condition") {
            None => Ok(data.clone()),
            Some(condition) => data
                .iter()
                .filter_map(|item| match matches_condition(item, condition) {
                    Ok(true) => Some(Ok(item.clone())),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                })
                .collect(),
        },
        "transform" => match param(action, "transformer") {
            None => Ok(data.clone()),
            Some(t) => data.iter().map(|item| apply_transform(item, t)).collect(),
        },
        other => return ActionOutcome::failed(format!("Unknown data operation: {other}")),
    };

    match processed {
        Ok(result) => {
            let message = if operation == "filter" {
                format!("Filtered {} items to {}", data.len(), result.len())
            } else {
                format!("Transformed {} items", data.len())
            };
            ActionOutcome::ok(
                message,
                json!({ "result_count": result.len(), "result": result }),
            )
        }
        Err(e) => ActionOutcome::failed(format!("Data processing failed: {e}")),
    }
}

fn action_system_command(action: &Action) -> ActionOutcome {
    let command = param_str(action, "command", "");
    if !SAFE_COMMANDS.iter().any(|safe| command.starts_with(safe)) {
        return ActionOutcome::failed(format!("Command not allowed: {command}"));
    }
    ActionOutcome::ok(
        format!("System command simulated: {command}"),
        json!({ "command": command }),
    )
}

impl Bot for TaskAutomationBot {
    fn meta(&self) -> &BotMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut BotMeta {
        &mut self.meta
    }

    /// Text input names a stored task id; JSON input is a task definition.
    fn execute(&mut self, input: BotInput) -> Result<Value, FxlabError> {
        let task = match input {
            BotInput::Text(id) => TaskRef::Id(id.trim().to_string()),
            BotInput::Json(value) => {
                let definition =
                    serde_json::from_value(value).map_err(|e| FxlabError::InvalidInput {
                        bot: self.meta.name.clone(),
                        reason: format!("invalid task definition: {e}"),
                    })?;
                TaskRef::Definition(definition)
            }
        };
        Ok(serde_json::to_value(self.run_task(task))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bot::BotConfig;
    use tempfile::TempDir;

    fn bot() -> TaskAutomationBot {
        TaskAutomationBot::new(BotMeta::new(
            "task-automation",
            TYPE_NAME,
            None,
            BotConfig::new(),
        ))
    }

    /// A Wednesday.
    fn wednesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn definition(value: Value) -> TaskDefinition {
        serde_json::from_value(value).unwrap()
    }

    fn completed(outcome: TaskOutcome) -> TaskRun {
        match outcome {
            TaskOutcome::Completed(run) => run,
            other => panic!("expected completed run, got {other:?}"),
        }
    }

    #[test]
    fn add_task_assigns_sequential_ids_and_defaults() {
        let mut b = bot();
        let now = wednesday(9, 0);
        let first = b.add_task_at(TaskDefinition::default(), now).unwrap();
        let second = b
            .add_task_at(definition(json!({"name": "report"})), now)
            .unwrap();

        let ts = now.and_utc().timestamp();
        assert_eq!(first, format!("task_1_{ts}"));
        assert_eq!(second, format!("task_2_{ts}"));

        let task = b.get_task(&first).unwrap();
        assert_eq!(task.name, format!("Task_{first}"));
        assert_eq!(task.task_type, "general");
        assert!(task.enabled);
        assert_eq!(b.list_tasks().len(), 2);
    }

    #[test]
    fn runs_actions_and_records_stats() {
        let mut b = bot();
        let now = wednesday(9, 0);
        let id = b
            .add_task_at(
                definition(json!({
                    "name": "mixed",
                    "actions": [
                        {"type": "log", "message": "hello"},
                        {"type": "system_command", "command": "echo hi"},
                        {"type": "system_command", "command": "rm -rf /"},
                        {"type": "wait", "duration": 0}
                    ]
                })),
                now,
            )
            .unwrap();

        let run = completed(b.run_task_at(TaskRef::Id(id.clone()), now));
        assert_eq!(run.actions_executed, 4);
        assert_eq!(run.actions_successful, 3);
        assert!(!run.success);
        assert_eq!(run.results[2].result.message, "Command not allowed: rm -rf /");
        assert_eq!(
            run.results[1].result.message,
            "System command simulated: echo hi"
        );

        let task = b.get_task(&id).unwrap();
        assert_eq!(task.execution_count, 1);
        assert!(task.last_result.is_some());
        assert_eq!(b.task_history().len(), 1);
    }

    #[test]
    fn halt_on_error_stops_the_run() {
        let mut b = bot();
        let def = definition(json!({
            "actions": [
                {"type": "teleport", "halt_on_error": true},
                {"type": "log"}
            ]
        }));
        let run = completed(b.run_task_at(TaskRef::Definition(def), wednesday(9, 0)));
        assert_eq!(run.actions_executed, 1);
        assert_eq!(run.results[0].result.message, "Unknown action type: teleport");
        assert_eq!(run.task_name, "Unknown");
    }

    #[test]
    fn unknown_id_and_disabled_are_rejected() {
        let mut b = bot();
        let now = wednesday(9, 0);
        assert!(matches!(
            b.run_task_at(TaskRef::Id("task_9".into()), now),
            TaskOutcome::Rejected { ref error, .. } if error == "Task not found: task_9"
        ));

        let id = b.add_task_at(TaskDefinition::default(), now).unwrap();
        assert!(b.set_task_enabled(&id, false));
        assert!(matches!(
            b.run_task_at(TaskRef::Id(id), now),
            TaskOutcome::Rejected { ref error, .. } if error == "Task is disabled"
        ));
        assert!(!b.set_task_enabled("missing", true));
    }

    #[test]
    fn conditions_gate_execution() {
        let mut b = bot();
        let def = definition(json!({
            "name": "office",
            "conditions": {
                "time_range": {"start": "08:00", "end": "17:00"},
                "days": ["Monday", "WEDNESDAY"]
            }
        }));

        assert!(b
            .run_task_at(TaskRef::Definition(def.clone()), wednesday(9, 30))
            .is_success());
        assert!(matches!(
            b.run_task_at(TaskRef::Definition(def.clone()), wednesday(18, 0)),
            TaskOutcome::Skipped { .. }
        ));
        let thursday = wednesday(9, 30) + Duration::days(1);
        assert!(matches!(
            b.run_task_at(TaskRef::Definition(def), thursday),
            TaskOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn bad_time_range_is_rejected() {
        let mut b = bot();
        let def = definition(json!({
            "conditions": {"time_range": {"start": "9am", "end": "17:00"}}
        }));
        assert!(matches!(
            b.run_task_at(TaskRef::Definition(def), wednesday(9, 0)),
            TaskOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn file_operations_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        let path = path.to_str().unwrap();
        let mut b = bot();
        let def = definition(json!({
            "actions": [
                {
                    "type": "file_operation",
                    "operation": "write",
                    "file_path": path,
                    "content": "abc"
                },
                {"type": "file_operation", "operation": "read", "file_path": path},
                {"type": "file_operation", "operation": "delete", "file_path": path}
            ]
        }));
        let run = completed(b.run_task_at(TaskRef::Definition(def), wednesday(9, 0)));
        assert!(run.results[0].success);
        assert_eq!(run.results[1].result.details["content_length"], 3);
        assert_eq!(
            run.results[2].result.message,
            "Unknown file operation: delete"
        );
        assert_eq!(fs::read_to_string(path).unwrap(), "abc");
    }

    #[test]
    fn missing_file_read_fails() {
        let outcome = execute_action(&Action {
            kind: "file_operation".into(),
            halt_on_error: false,
            params: json!({"operation": "read", "file_path": "/no/such/file"})
                .as_object()
                .unwrap()
                .clone(),
        });
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("File operation failed"));
    }

    #[test]
    fn data_processing_filter_and_transform() {
        let filter: Action = serde_json::from_value(json!({
            "type": "data_processing",
            "operation": "filter",
            "data": [1, 5, 10, 20],
            "condition": {"op": "gt", "value": 4}
        }))
        .unwrap();
        let outcome = execute_action(&filter);
        assert_eq!(outcome.message, "Filtered 4 items to 3");
        assert_eq!(outcome.details["result"], json!([5, 10, 20]));

        let by_field: Action = serde_json::from_value(json!({
            "type": "data_processing",
            "operation": "filter",
            "data": [{"pair": "EUR/USD"}, {"pair": "USD/JPY"}],
            "condition": {"field": "pair", "op": "contains", "value": "EUR"}
        }))
        .unwrap();
        assert_eq!(execute_action(&by_field).details["result_count"], 1);

        let transform: Action = serde_json::from_value(json!({
            "type": "data_processing",
            "operation": "transform",
            "data": ["a", "b"],
            "transformer": {"op": "upper"}
        }))
        .unwrap();
        let outcome = execute_action(&transform);
        assert_eq!(outcome.message, "Transformed 2 items");
        assert_eq!(outcome.details["result"], json!(["A", "B"]));

        let bad: Action = serde_json::from_value(json!({
            "type": "data_processing",
            "operation": "transform",
            "data": ["a"],
            "transformer": {"op": "multiply", "value": 2}
        }))
        .unwrap();
        assert!(!execute_action(&bad).success);
    }

    #[test]
    fn schedules_fire_when_due() {
        let mut b = bot();
        let now = wednesday(9, 0);
        let recurring = b
            .add_task_at(definition(json!({"schedule": {"interval": 60}})), now)
            .unwrap();
        let once = b
            .add_task_at(
                definition(json!({"schedule": {"at": "2024-05-15T09:05:00"}})),
                now,
            )
            .unwrap();

        assert!(b.due_tasks(now).is_empty());
        assert_eq!(b.due_tasks(now + Duration::seconds(60)), vec![recurring.clone()]);

        let later = wednesday(9, 10);
        let outcomes = b.run_due(later);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(TaskOutcome::is_success));

        // one-shot is gone, recurring re-armed a minute later
        assert!(b.due_tasks(later).is_empty());
        assert_eq!(b.due_tasks(later + Duration::seconds(60)), vec![recurring]);
        assert_eq!(b.get_task(&once).unwrap().execution_count, 1);
    }

    #[test]
    fn invalid_schedule_time_is_an_error() {
        let mut b = bot();
        let err = b
            .add_task_at(definition(json!({"schedule": {"at": "tomorrow"}})), wednesday(9, 0))
            .unwrap_err();
        assert!(matches!(err, FxlabError::InvalidInput { .. }));
        assert!(b.list_tasks().is_empty());
    }

    #[test]
    fn date_only_schedule_means_midnight() {
        let mut b = bot();
        let id = b
            .add_task_at(definition(json!({"schedule": {"at": "2024-05-16"}})), wednesday(9, 0))
            .unwrap();
        let midnight = wednesday(0, 0) + Duration::days(1);
        assert!(b.due_tasks(midnight - Duration::seconds(1)).is_empty());
        assert_eq!(b.due_tasks(midnight), vec![id]);
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let mut b = bot();
        for interval in [10_000_000_000_000_000u64, u64::MAX] {
            let err = b
                .add_task_at(
                    definition(json!({"schedule": {"interval": interval}})),
                    wednesday(9, 0),
                )
                .unwrap_err();
            assert!(matches!(err, FxlabError::InvalidInput { .. }));
        }
        assert!(b.list_tasks().is_empty());
    }

    #[test]
    fn schedule_past_calendar_end_is_dropped() {
        let mut b = bot();
        let century: u64 = 100 * 365 * 24 * 3600;
        let id = b
            .add_task_at(definition(json!({"schedule": {"interval": century}})), wednesday(9, 0))
            .unwrap();

        let late = NaiveDateTime::MAX - Duration::days(1);
        let outcomes = b.run_due(late);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert!(b.due_tasks(NaiveDateTime::MAX).is_empty());
        assert_eq!(b.get_task(&id).unwrap().execution_count, 1);
    }

    #[test]
    fn wait_rejects_unbounded_durations() {
        for duration in [1e30, MAX_WAIT_SECONDS + 1.0] {
            let action: Action =
                serde_json::from_value(json!({"type": "wait", "duration": duration})).unwrap();
            let outcome = execute_action(&action);
            assert!(!outcome.success);
            assert!(outcome.message.contains("exceeds"));
        }

        let quick: Action = serde_json::from_value(json!({"type": "wait", "duration": 0})).unwrap();
        assert!(execute_action(&quick).success);
    }

    #[test]
    fn bot_runs_json_definitions() {
        let mut b = bot();
        b.activate();
        let out = b
            .run(json!({"name": "j", "actions": [{"type": "log", "message": "x"}]}).into())
            .unwrap();
        assert_eq!(out["status"], "completed");
        assert_eq!(out["task_name"], "j");

        let out = b.run("task_404".into()).unwrap();
        assert_eq!(out["status"], "rejected");

        let err = b.run(json!({"actions": 3}).into()).unwrap_err();
        assert!(matches!(err, FxlabError::Execution { .. }));
    }
}
