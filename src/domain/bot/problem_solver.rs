//! Keyword-driven problem analysis bot.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use super::{Bot, BotInput, BotMeta};
use crate::domain::error::FxlabError;

pub const TYPE_NAME: &str = "ProblemSolverBot";

const MAX_KEYWORDS: usize = 10;
const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "for", "with", "this", "that", "have", "need",
];

const TECHNICAL_WORDS: &[&str] = &["code", "programming", "bug", "error", "function"];
const BUSINESS_WORDS: &[&str] = &["business", "process", "workflow", "efficiency"];
const EDUCATIONAL_WORDS: &[&str] = &["learn", "understand", "study", "knowledge"];
const ORGANIZATIONAL_WORDS: &[&str] = &["organize", "manage", "plan", "schedule"];

const HIGH_URGENCY_WORDS: &[&str] = &["urgent", "asap", "immediately", "critical", "emergency"];
const LOW_URGENCY_WORDS: &[&str] = &["later", "eventually", "when possible", "low priority"];

const LOW_COMPLEXITY_WORDS: &[&str] = &["simple", "basic", "easy", "straightforward"];
const HIGH_COMPLEXITY_WORDS: &[&str] = &["complex", "complicated", "advanced", "difficult"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Technical,
    Business,
    Educational,
    Organizational,
    General,
}

/// Shared scale for urgency and complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn title(self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemAnalysis {
    #[serde(rename = "type")]
    pub problem_type: ProblemType,
    pub urgency: Level,
    pub complexity: Level,
    pub keywords: Vec<String>,
    /// Word count.
    pub length: usize,
    pub questions_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub problem: String,
    pub analysis: ProblemAnalysis,
    pub solution: String,
    pub breakdown: Vec<String>,
    pub steps: Vec<String>,
    pub resources: Vec<String>,
    pub timeline: String,
    pub priority: String,
    pub complexity: String,
    pub success_criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SolveOutcome {
    Solved(Box<Solution>),
    Rejected { error: String, solution: String },
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

pub fn analyze(problem: &str) -> ProblemAnalysis {
    let lower = problem.to_lowercase();

    let problem_type = if mentions_any(&lower, TECHNICAL_WORDS) {
        ProblemType::Technical
    } else if mentions_any(&lower, BUSINESS_WORDS) {
        ProblemType::Business
    } else if mentions_any(&lower, EDUCATIONAL_WORDS) {
        ProblemType::Educational
    } else if mentions_any(&lower, ORGANIZATIONAL_WORDS) {
        ProblemType::Organizational
    } else {
        ProblemType::General
    };

    let urgency = if mentions_any(&lower, HIGH_URGENCY_WORDS) {
        Level::High
    } else if mentions_any(&lower, LOW_URGENCY_WORDS) {
        Level::Low
    } else {
        Level::Medium
    };

    let complexity = if mentions_any(&lower, LOW_COMPLEXITY_WORDS) {
        Level::Low
    } else if mentions_any(&lower, HIGH_COMPLEXITY_WORDS) {
        Level::High
    } else {
        Level::Medium
    };

    ProblemAnalysis {
        problem_type,
        urgency,
        complexity,
        keywords: keywords(problem),
        length: problem.split_whitespace().count(),
        questions_count: problem.matches('?').count(),
    }
}

/// Purely alphabetic words of at least three letters, lower-cased, stop
/// words removed, first occurrence order, at most ten.
fn keywords(problem: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    problem
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN && w.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

fn breakdown(problem: &str) -> Vec<String> {
    problem
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| format!("Component {}: {}", i + 1, s))
        .collect()
}

fn steps(problem_type: ProblemType) -> Vec<String> {
    let mut steps = vec![
        "Define the problem clearly",
        "Identify root causes",
        "Brainstorm potential solutions",
        "Evaluate solution options",
        "Implement the best solution",
        "Monitor and adjust as needed",
    ];
    match problem_type {
        ProblemType::Technical => steps.extend([
            "Review documentation and resources",
            "Test in a controlled environment",
            "Document the solution",
        ]),
        ProblemType::Business => steps.extend([
            "Assess business impact",
            "Consult with stakeholders",
            "Develop implementation plan",
        ]),
        _ => {}
    }
    steps.into_iter().map(String::from).collect()
}

fn resources(problem_type: ProblemType) -> Vec<String> {
    let mut resources = vec!["Time", "Information/Research"];
    match problem_type {
        ProblemType::Technical => resources.extend([
            "Development tools",
            "Testing environment",
            "Documentation",
            "Technical expertise",
        ]),
        ProblemType::Business => resources.extend([
            "Stakeholder input",
            "Budget allocation",
            "Process documentation",
            "Team coordination",
        ]),
        ProblemType::Educational => resources.extend([
            "Learning materials",
            "Practice opportunities",
            "Mentor/guidance",
            "Study time",
        ]),
        _ => {}
    }
    resources.into_iter().map(String::from).collect()
}

fn timeline(analysis: &ProblemAnalysis) -> (String, Vec<String>) {
    let (timeline, criteria) = match analysis.complexity {
        Level::Low => ("Few hours", vec!["Problem resolved", "Solution tested"]),
        Level::High => (
            "1-2 weeks",
            vec![
                "All components addressed",
                "Solution thoroughly tested",
                "Documentation completed",
                "Stakeholders satisfied",
            ],
        ),
        Level::Medium => (
            "1-3 days",
            vec!["Problem resolved", "Solution implemented", "Results verified"],
        ),
    };
    let timeline = if analysis.urgency == Level::High {
        format!("Urgent - {timeline}")
    } else {
        timeline.to_string()
    };
    (timeline, criteria.into_iter().map(String::from).collect())
}

pub fn solve(problem: &str) -> SolveOutcome {
    if problem.trim().is_empty() {
        return SolveOutcome::Rejected {
            error: "No problem provided".into(),
            solution: "Please provide a clear problem description".into(),
        };
    }

    let analysis = analyze(problem);
    let components = breakdown(problem);
    let (timeline, success_criteria) = timeline(&analysis);

    SolveOutcome::Solved(Box::new(Solution {
        problem: problem.trim().to_string(),
        solution: format!(
            "Break down the problem into {} manageable components",
            components.len()
        ),
        breakdown: components,
        steps: steps(analysis.problem_type),
        resources: resources(analysis.problem_type),
        timeline,
        priority: analysis.urgency.title().to_string(),
        complexity: analysis.complexity.title().to_string(),
        success_criteria,
        analysis,
    }))
}

pub struct ProblemSolverBot {
    meta: BotMeta,
}

impl ProblemSolverBot {
    pub fn new(meta: BotMeta) -> Self {
        Self { meta }
    }

    pub fn boxed(meta: BotMeta) -> Box<dyn Bot> {
        Box::new(Self::new(meta))
    }
}

impl Bot for ProblemSolverBot {
    fn meta(&self) -> &BotMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut BotMeta {
        &mut self.meta
    }

    fn execute(&mut self, input: BotInput) -> Result<Value, FxlabError> {
        let problem = match input {
            BotInput::Text(text) => text,
            BotInput::Json(Value::String(text)) => text,
            BotInput::Json(value) => match value.get("problem").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => {
                    return Err(FxlabError::InvalidInput {
                        bot: self.meta.name.clone(),
                        reason: "expected text or an object with a \"problem\" field".into(),
                    });
                }
            },
        };
        Ok(serde_json::to_value(solve(&problem))?)
    }
}
