use super::{CompletionRequest, ModelClient};
use crate::model::ModelResponse;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// OpenRouter chat-completions client.
///
/// No request timeout is configured here; the invoker bounds every call.
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads the API key from `OPENROUTER_API_KEY`.
    pub fn from_env(base_url: &str) -> anyhow::Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{} is not set", API_KEY_ENV))?;
        Ok(Self::new(base_url, api_key))
    }

    fn build_body(request: &CompletionRequest<'_>) -> Value {
        let mut body = json!({
            "model": request.model.provider_model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.prompt },
            ],
            "usage": { "include": true },
        });
        // Options are opaque; top-level keys override the defaults above.
        if let (Some(dst), Some(src)) = (
            body.as_object_mut(),
            request.model.invocation_options.as_object(),
        ) {
            for (k, v) in src {
                dst.insert(k.clone(), v.clone());
            }
        }
        body
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<ModelResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_body(&request);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "BitBench")
            .json(&body)
            .send()
            .await
            .context("OpenRouter request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenRouter API error (status {}): {}",
                status.as_u16(),
                error_text
            );
        }

        let json: Value = resp
            .json()
            .await
            .context("OpenRouter response is not JSON")?;

        if let Some(err) = json.pointer("/error/message").and_then(Value::as_str) {
            anyhow::bail!("OpenRouter provider error: {}", err);
        }

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("OpenRouter response missing content"))?
            .to_string();

        let completion_tokens = json
            .pointer("/usage/completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let cost_usd = json
            .pointer("/usage/cost")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Ok(ModelResponse {
            text,
            completion_tokens,
            cost_usd,
            provider: "openrouter".to_string(),
            model: request.model.provider_model.clone(),
            meta: json!({
                "id": json.get("id").cloned().unwrap_or(Value::Null),
                "usage": json.get("usage").cloned().unwrap_or(Value::Null),
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunnableModel;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &RunnableModel) -> CompletionRequest<'_> {
        CompletionRequest {
            model,
            system_prompt: "Answer briefly.",
            prompt: "What is 6*7?",
        }
    }

    #[tokio::test]
    async fn parses_content_usage_and_cost() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-5",
                "usage": { "include": true },
                "reasoning": { "effort": "high" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "gen-1",
                "choices": [{ "message": { "role": "assistant", "content": "42" } }],
                "usage": { "completion_tokens": 17, "cost": 0.0012 },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = RunnableModel::new("gpt-5-high", "openai/gpt-5")
            .with_options(json!({ "reasoning": { "effort": "high" } }));
        let client = OpenRouterClient::new(server.uri(), "test-key");
        let resp = client.complete(request(&model)).await.unwrap();

        assert_eq!(resp.text, "42");
        assert_eq!(resp.completion_tokens, 17);
        assert!((resp.cost_usd - 0.0012).abs() < 1e-12);
        assert_eq!(resp.provider, "openrouter");
    }

    #[tokio::test]
    async fn non_success_status_is_error_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let model = RunnableModel::new("gpt-4o", "openai/gpt-4o");
        let client = OpenRouterClient::new(server.uri(), "k");
        let err = client.complete(request(&model)).await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("status 429"));
        assert_eq!(
            crate::errors::InvocationErrorKind::classify_message(&msg),
            crate::errors::InvocationErrorKind::RateLimit
        );
    }

    #[tokio::test]
    async fn missing_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let model = RunnableModel::new("gpt-4o", "openai/gpt-4o");
        let client = OpenRouterClient::new(format!("{}/", server.uri()), "k");
        let err = client.complete(request(&model)).await.unwrap_err();
        assert!(err.to_string().contains("missing content"));
    }

    #[test]
    #[serial_test::serial]
    fn from_env_requires_key() {
        std::env::remove_var(API_KEY_ENV);
        assert!(OpenRouterClient::from_env("https://openrouter.ai/api/v1").is_err());
        std::env::set_var(API_KEY_ENV, "k");
        let client = OpenRouterClient::from_env("https://openrouter.ai/api/v1/").unwrap();
        std::env::remove_var(API_KEY_ENV);
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
    }
}
