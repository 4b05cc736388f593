//! Built-in model catalog and selection.

use serde_json::json;

use crate::errors::{BenchError, BenchResult};
use crate::model::RunnableModel;

/// (name, OpenRouter model id, reasoning, reasoning effort)
const CATALOG: &[(&str, &str, bool, Option<&str>)] = &[
    // Open weight
    ("kimi-k2-thinking", "moonshotai/kimi-k2-thinking", true, None),
    ("kimi-k2", "moonshotai/kimi-k2", false, None),
    ("qwen-3-32b", "qwen/qwen3-32b", true, None),
    ("glm-4.5", "z-ai/glm-4.5", true, None),
    ("glm-4.5v", "z-ai/glm-4.5v", true, None),
    ("qwen3-235b-a22b-thinking", "qwen/qwen3-235b-a22b-thinking-2507", true, None),
    ("deepseek-r1-0528", "deepseek/deepseek-r1-0528", true, None),
    ("gpt-oss-120b", "openai/gpt-oss-120b", true, None),
    ("gpt-oss-20b", "openai/gpt-oss-20b", true, None),
    ("deepseek-v3.1", "deepseek/deepseek-chat-v3.1", false, None),
    ("deepseek-v3.1-thinking", "deepseek/deepseek-chat-v3.1", true, None),
    ("deepseek-v3.2", "deepseek/deepseek-v3.2", false, None),
    ("deepseek-v3.2-thinking-high", "deepseek/deepseek-v3.2", true, Some("high")),
    // xAI
    ("grok-4", "x-ai/grok-4", true, None),
    ("grok-4.1-fast", "x-ai/grok-4.1-fast", true, None),
    ("grok-3-mini", "x-ai/grok-3-mini-beta", true, None),
    // Google
    ("gemini-3-pro-preview", "google/gemini-3-pro-preview", true, None),
    ("gemini-2.5-pro", "google/gemini-2.5-pro-preview", true, None),
    ("gemini-2.5-flash", "google/gemini-2.5-flash", false, None),
    // Anthropic
    ("claude-4-sonnet", "anthropic/claude-sonnet-4", true, None),
    ("claude-4-sonnet-non-thinking", "anthropic/claude-sonnet-4", false, None),
    ("claude-4-opus", "anthropic/claude-opus-4", true, None),
    ("claude-4.5-opus", "anthropic/claude-opus-4.5", false, None),
    ("claude-4.5-opus-thinking-high", "anthropic/claude-opus-4.5", true, Some("high")),
    ("claude-4.5-sonnet", "anthropic/claude-sonnet-4.5", true, None),
    // OpenAI
    ("o4-mini", "openai/o4-mini", true, None),
    ("o3", "openai/o3", true, None),
    ("o3-pro", "openai/o3-pro", true, None),
    ("gpt-4.1", "openai/gpt-4.1", true, None),
    ("gpt-4o", "openai/gpt-4o", true, None),
    ("gpt-5-minimal", "openai/gpt-5", true, Some("minimal")),
    ("gpt-5-default", "openai/gpt-5", true, None),
    ("gpt-5-high", "openai/gpt-5", true, Some("high")),
    ("gpt-5-mini", "openai/gpt-5-mini", true, None),
    ("gpt-5-nano", "openai/gpt-5-nano", true, None),
    ("gpt-5.1-low", "openai/gpt-5.1", true, Some("low")),
    ("gpt-5.1-default", "openai/gpt-5.1", true, None),
    ("gpt-5.1-high", "openai/gpt-5.1", true, Some("high")),
    ("gpt-5.2-none", "openai/gpt-5.2", false, Some("none")),
    ("gpt-5.2-xhigh", "openai/gpt-5.2", true, Some("xhigh")),
    ("gpt-5.2-high", "openai/gpt-5.2", true, Some("high")),
    ("gpt-5.2-pro", "openai/gpt-5.2-pro", true, Some("high")),
    ("gemini-3-flash-high", "google/gemini-3-flash-preview", true, Some("high")),
    ("gemini-3-flash-low", "google/gemini-3-flash-preview", true, Some("low")),
];

/// Every model the benchmark knows about, in canonical order.
///
/// Costs are the 0.01 USD default; apply a [`crate::costs::CostTable`] to
/// replace them with observed averages.
pub fn default_catalog() -> Vec<RunnableModel> {
    CATALOG
        .iter()
        .map(|&(name, provider_model, reasoning, effort)| {
            let model = RunnableModel::new(name, provider_model).with_reasoning(reasoning);
            match effort {
                Some(effort) => model.with_options(json!({ "reasoning": { "effort": effort } })),
                None => model,
            }
        })
        .collect()
}

/// Filters `catalog` down to `names`, keeping catalog order.
///
/// An empty filter selects everything. Unknown names are rejected so a typo
/// cannot silently shrink a run.
pub fn select_models(catalog: &[RunnableModel], names: &[String]) -> BenchResult<Vec<RunnableModel>> {
    if names.is_empty() {
        return Ok(catalog.to_vec());
    }

    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !catalog.iter().any(|m| m.name == *n))
        .collect();
    if !unknown.is_empty() {
        return Err(BenchError::config(format!(
            "unknown model(s): {}",
            unknown.join(", ")
        )));
    }

    Ok(catalog
        .iter()
        .filter(|m| names.iter().any(|n| *n == m.name))
        .cloned()
        .collect())
}
