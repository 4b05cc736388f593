//! Single-attempt, time-bounded model call.

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::errors::ModelInvocationError;
use crate::model::RunnableModel;
use crate::providers::llm::{CompletionRequest, ModelClient};

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub text: String,
    pub completion_tokens: u64,
    pub cost_usd: f64,
    pub duration_ms: u64,
}

/// Calls `client` once. Expiry of `limit` is reported like any other failure;
/// the underlying future is dropped, never retried.
pub async fn invoke(
    client: &dyn ModelClient,
    model: &RunnableModel,
    system_prompt: &str,
    prompt: &str,
    limit: Duration,
) -> Result<Invocation, ModelInvocationError> {
    let started = Instant::now();
    let fut = client.complete(CompletionRequest {
        model,
        system_prompt,
        prompt,
    });
    let res = timeout(limit, fut).await;
    let duration_ms = elapsed_ms(started);

    match res {
        Ok(Ok(resp)) => Ok(Invocation {
            text: resp.text,
            completion_tokens: resp.completion_tokens,
            cost_usd: resp.cost_usd,
            duration_ms,
        }),
        Ok(Err(e)) => Err(ModelInvocationError::from_anyhow(&model.name, &e, duration_ms)),
        Err(_) => Err(ModelInvocationError::timeout(
            &model.name,
            limit.as_secs_f64(),
            duration_ms,
        )),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InvocationErrorKind;
    use crate::providers::llm::fake::{FakeClient, FakeReply};

    #[tokio::test]
    async fn success_carries_metrics() {
        let client = FakeClient::new("42");
        let model = RunnableModel::new("m", "x/m");
        let inv = invoke(&client, &model, "sys", "q", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(inv.text, "42");
        assert_eq!(inv.completion_tokens, 10);
    }

    #[tokio::test]
    async fn timeout_is_a_classified_failure() {
        let client = FakeClient::new("x").with_default(FakeReply::Hang);
        let model = RunnableModel::new("slow", "x/slow");
        let err = invoke(&client, &model, "sys", "q", Duration::from_millis(30))
            .await
            .unwrap_err();
        assert_eq!(err.kind, InvocationErrorKind::Timeout);
        assert_eq!(err.model, "slow");
        assert!(err.duration_ms >= 30);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn backend_error_is_not_retried() {
        let client = FakeClient::new("x").with_default(FakeReply::Fail("status 503".into()));
        let model = RunnableModel::new("m", "x/m");
        let err = invoke(&client, &model, "sys", "q", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, InvocationErrorKind::Server);
        assert_eq!(client.calls(), 1);
    }
}
