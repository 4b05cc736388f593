use crate::model::{ModelResponse, RunnableModel};
use async_trait::async_trait;

pub mod fake;
pub mod openrouter;

/// One completion call: a model plus the two prompt halves.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a RunnableModel,
    pub system_prompt: &'a str,
    pub prompt: &'a str,
}

/// A model backend. Implementations make exactly one attempt per call; any
/// retry policy lives inside the implementation, never in the scheduler.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<ModelResponse>;

    fn provider_name(&self) -> &'static str;
}
