use std::path::PathBuf;

/// Errors that stop a benchmark before (or instead of) running it.
///
/// Per-unit failures never surface here; they become `error` events.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The plan cannot be built (no models, no tests, zero runs, ...).
    #[error("plan error: {message}")]
    Plan { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("suite error ({}): {message}", path.display())]
    Suite { path: PathBuf, message: String },

    #[error("io error ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub fn plan(message: impl Into<String>) -> Self {
        Self::Plan {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationErrorKind {
    RateLimit,
    Timeout,
    Server,
    Network,
    Other,
}

impl InvocationErrorKind {
    /// Best-effort classification of a backend error message.
    pub fn classify_message(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("rate limit") || msg.contains("429") || msg.contains("too many requests")
        {
            Self::RateLimit
        } else if msg.contains("timeout") || msg.contains("timed out") {
            Self::Timeout
        } else if msg.contains("500")
            || msg.contains("502")
            || msg.contains("503")
            || msg.contains("504")
            || msg.contains("provider error")
        {
            Self::Server
        } else if msg.contains("network") || msg.contains("connection") || msg.contains("dns") {
            Self::Network
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Network => "network",
            Self::Other => "other",
        }
    }
}

/// A single failed model call. Not retried by the scheduler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{model}: {message}")]
pub struct ModelInvocationError {
    pub model: String,
    pub kind: InvocationErrorKind,
    pub message: String,
    pub duration_ms: u64,
}

impl ModelInvocationError {
    pub fn from_anyhow(model: &str, err: &anyhow::Error, duration_ms: u64) -> Self {
        // `{:#}` keeps the context chain, which is where reqwest/status details live.
        let message = format!("{:#}", err);
        Self {
            model: model.to_string(),
            kind: InvocationErrorKind::classify_message(&message),
            message,
            duration_ms,
        }
    }

    pub fn timeout(model: &str, limit_secs: f64, duration_ms: u64) -> Self {
        Self {
            model: model.to_string(),
            kind: InvocationErrorKind::Timeout,
            message: format!("timed out after {:.1}s", limit_secs),
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_message_maps_infra_errors() {
        assert_eq!(
            InvocationErrorKind::classify_message("provider returned 429"),
            InvocationErrorKind::RateLimit
        );
        assert_eq!(
            InvocationErrorKind::classify_message("request timeout while calling provider"),
            InvocationErrorKind::Timeout
        );
        assert_eq!(
            InvocationErrorKind::classify_message("OpenRouter API error (status 503): busy"),
            InvocationErrorKind::Server
        );
        assert_eq!(
            InvocationErrorKind::classify_message("error sending request: connection refused"),
            InvocationErrorKind::Network
        );
        assert_eq!(
            InvocationErrorKind::classify_message("response missing content"),
            InvocationErrorKind::Other
        );
    }

    #[test]
    fn invocation_error_keeps_context_chain() {
        let err = anyhow::anyhow!("status 502").context("OpenRouter request failed");
        let e = ModelInvocationError::from_anyhow("gpt-4o", &err, 12);
        assert_eq!(e.kind, InvocationErrorKind::Server);
        assert!(e.message.contains("OpenRouter request failed"));
        assert!(e.message.contains("502"));
        assert_eq!(e.to_string(), format!("gpt-4o: {}", e.message));
    }

    #[test]
    fn bench_error_messages_are_prefixed() {
        assert_eq!(
            BenchError::plan("no active models").to_string(),
            "plan error: no active models"
        );
        assert_eq!(
            BenchError::config("unknown model: x").to_string(),
            "config error: unknown model: x"
        );
    }
}
