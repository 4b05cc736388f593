//! Scripted in-process backend for tests and offline dry runs.

use super::{CompletionRequest, ModelClient};
use crate::model::ModelResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum FakeReply {
    Text {
        text: String,
        completion_tokens: u64,
        cost_usd: f64,
    },
    Fail(String),
    /// Never answers; only the invoker timeout ends the call.
    Hang,
}

impl FakeReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            completion_tokens: 10,
            cost_usd: 0.001,
        }
    }
}

pub struct FakeClient {
    default: FakeReply,
    /// Keyed by (model name, user prompt).
    script: HashMap<(String, String), FakeReply>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    call_log: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            default: FakeReply::text(default_text),
            script: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_default(mut self, reply: FakeReply) -> Self {
        self.default = reply;
        self
    }

    pub fn with_reply(
        mut self,
        model: impl Into<String>,
        prompt: impl Into<String>,
        reply: FakeReply,
    ) -> Self {
        self.script.insert((model.into(), prompt.into()), reply);
        self
    }

    /// Total calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Model names in call order.
    pub fn call_log(&self) -> Vec<String> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn reply_for(&self, model: &str, prompt: &str) -> FakeReply {
        self.script
            .get(&(model.to_string(), prompt.to_string()))
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelClient for FakeClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.call_log.lock() {
            log.push(request.model.name.clone());
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Decrements on every exit path, including cancellation by timeout.
        let _guard = InFlight(&self.in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.reply_for(&request.model.name, request.prompt) {
            FakeReply::Text {
                text,
                completion_tokens,
                cost_usd,
            } => Ok(ModelResponse {
                text,
                completion_tokens,
                cost_usd,
                provider: "fake".to_string(),
                model: request.model.provider_model.clone(),
                meta: serde_json::Value::Null,
            }),
            FakeReply::Fail(message) => Err(anyhow::anyhow!(message)),
            FakeReply::Hang => std::future::pending().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
