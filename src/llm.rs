//! LLM provider abstraction
//!
//! Provides a common interface over the completion providers the relay can
//! forward conversations to.

mod anthropic;
mod error;
mod gemini;
mod openai;
mod provider;
mod types;

#[cfg(test)]
pub mod testing;

pub use anthropic::AnthropicService;
pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use openai::{ChatEndpoint, OpenAIService};
pub use provider::{build_service, LlmConfig, Provider, UnknownProvider};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        // Failures are logged by the caller, which knows the request id
        if let Ok(response) = &result {
            tracing::info!(
                model = %self.model_id,
                duration_ms = %duration.as_millis(),
                messages = request.messages.len(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM request completed"
            );
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockLlmService;
    use super::*;

    fn request() -> LlmRequest {
        LlmRequest {
            system: None,
            messages: vec![LlmMessage::user("hi")],
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_logging_service_passes_results_through() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("hello");
        mock.queue_error(LlmError::rate_limit("slow down"));
        let service = LoggingService::new(mock.clone());
        assert_eq!(service.model_id(), "mock-model");

        let response = service.complete(&request()).await.unwrap();
        assert_eq!(response.usable_text().as_deref(), Some("hello"));

        let err = service.complete(&request()).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimit);
        assert_eq!(err.message, "slow down");
        assert_eq!(mock.call_count(), 2);
    }
}
