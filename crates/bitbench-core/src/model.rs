use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bumped whenever the on-disk `CachedResult` layout or grading semantics change.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub prompt: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub negative_answers: Vec<String>,
}

/// A named, versioned set of questions sharing one system prompt.
///
/// `id` is not part of the file format; the loader derives it from the file stem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSuite {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default, alias = "systemPrompt")]
    pub system_prompt: String,
    pub tests: Vec<TestCase>,
}

fn default_chain() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnableModel {
    /// Unique key used in cache paths, events and rankings.
    pub name: String,
    /// Backend model identifier (e.g. `openai/gpt-4o`).
    pub provider_model: String,
    #[serde(default)]
    pub reasoning: bool,
    #[serde(default = "default_cost_per_test")]
    pub avg_cost_per_test: f64,
    /// Provider specific request options, merged into the request body untouched.
    #[serde(default)]
    pub invocation_options: serde_json::Value,
}

pub fn default_cost_per_test() -> f64 {
    0.01
}

impl RunnableModel {
    pub fn new(name: impl Into<String>, provider_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_model: provider_model.into(),
            reasoning: false,
            avg_cost_per_test: default_cost_per_test(),
            invocation_options: serde_json::Value::Null,
        }
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.invocation_options = options;
        self
    }

    pub fn with_avg_cost(mut self, cost: f64) -> Self {
        self.avg_cost_per_test = cost;
        self
    }
}

/// One (model, test, run) combination; the smallest schedulable piece of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionUnit {
    pub model: String,
    pub model_index: usize,
    pub test_index: usize,
    /// 1-based.
    pub run_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradedText {
    pub text: String,
    pub correct: bool,
}

/// Persisted outcome of one completed execution unit.
///
/// Field names follow the dashboard's cache reader, hence the mixed casing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub cache_version: u32,
    pub timestamp: String,
    pub suite_id: String,
    pub suite_name: String,
    pub version: String,
    pub model: String,
    pub run_number: u32,
    pub test_index: usize,
    #[serde(rename = "system_prompt")]
    pub system_prompt: String,
    pub prompt: String,
    pub answers: Vec<String>,
    #[serde(rename = "negative_answers", default)]
    pub negative_answers: Vec<String>,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    #[serde(rename = "cost")]
    pub cost_usd: f64,
    pub completion_tokens: u64,
    pub signature: String,
    pub result: GradedText,
}

/// What a model backend returns for one completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Scheduler knobs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub runs_per_model: u32,
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub stagger_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            runs_per_model: 1,
            max_concurrency: 40,
            timeout: Duration::from_secs(400),
            stagger_delay: Duration::from_millis(150),
        }
    }
}
