//! Conversation relay
//!
//! Stateless: every call receives the whole transcript, prepends the composed
//! system instruction, makes exactly one provider call and returns the text
//! of one new assistant turn.

use crate::composer::{system_prompt, PromptTemplates, TypeHints};
use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService};
use crate::transcript::Turn;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Answer substituted when the provider returns no usable text
pub const FALLBACK_ANSWER: &str = "Sorry, I could not generate a response.";

/// Safe message returned to callers when the provider fails
pub const PROVIDER_FAILURE_MESSAGE: &str = "AI failed to respond";

/// Relay failures, as seen by callers
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),
    /// The provider error is kept for logging; its text is not part of `Display`
    #[error("{PROVIDER_FAILURE_MESSAGE}")]
    ProviderUnavailable(#[source] LlmError),
}

/// Forwards transcripts to the completion provider
#[derive(Clone)]
pub struct Relay {
    llm: Arc<dyn LlmService>,
    templates: Arc<PromptTemplates>,
    max_tokens: Option<u32>,
}

impl Relay {
    pub fn new(llm: Arc<dyn LlmService>, templates: PromptTemplates) -> Self {
        Self {
            llm,
            templates: Arc::new(templates),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Produce the next assistant reply for `transcript`
    pub async fn advise(&self, transcript: &[Turn], hints: &TypeHints) -> Result<String, RelayError> {
        let request_id = Uuid::new_v4();

        if transcript.is_empty() {
            tracing::warn!(%request_id, "Rejected advice request with empty transcript");
            return Err(RelayError::InvalidRequest(
                "messages must be a non-empty array".to_string(),
            ));
        }

        let request = LlmRequest {
            system: Some(system_prompt(&self.templates, hints)),
            messages: transcript.iter().map(LlmMessage::from).collect(),
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            %request_id,
            turns = transcript.len(),
            typed = hints.pair().is_some(),
            "Forwarding transcript to provider"
        );

        match self.llm.complete(&request).await {
            Ok(response) => Ok(response.usable_text().unwrap_or_else(|| {
                tracing::warn!(%request_id, "Provider returned no usable text, using fallback");
                FALLBACK_ANSWER.to_string()
            })),
            Err(e) => {
                tracing::error!(
                    %request_id,
                    model = %self.llm.model_id(),
                    kind = e.kind.as_str(),
                    error = %e,
                    "Provider call failed"
                );
                Err(RelayError::ProviderUnavailable(e))
            }
        }
    }
}
