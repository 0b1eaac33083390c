//! Provider selection and construction from configuration

use super::{
    AnthropicService, ChatEndpoint, GeminiService, LlmError, LlmRequest, LlmResponse, LlmService,
    LoggingService, OpenAIService,
};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Provider HTTP timeout
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(300);

/// Completion providers the relay can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Groq,
    OpenAI,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-20241022",
            Provider::Gemini => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Unrecognized `LLM_PROVIDER` value
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown LLM provider '{0}' (expected groq, openai, anthropic or gemini)")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Configuration for the completion provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Overrides the provider's default model
    pub model: Option<String>,
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Build the provider service described by `config`, wrapped with logging.
///
/// A missing or empty API key does not fail here: the returned service
/// reports an auth error on every call instead.
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let model = config.model().to_string();

    let inner: Arc<dyn LlmService> = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        None => {
            tracing::warn!(
                provider = %config.provider,
                env_var = config.provider.api_key_env_var(),
                "No API key configured; advice requests will fail"
            );
            Arc::new(UnconfiguredService {
                provider: config.provider,
                model,
            })
        }
        Some(key) => match config.provider {
            Provider::Groq => Arc::new(OpenAIService::new(
                key.to_string(),
                ChatEndpoint::Groq,
                model,
                PROVIDER_TIMEOUT,
            )?),
            Provider::OpenAI => Arc::new(OpenAIService::new(
                key.to_string(),
                ChatEndpoint::OpenAI,
                model,
                PROVIDER_TIMEOUT,
            )?),
            Provider::Anthropic => Arc::new(AnthropicService::new(
                key.to_string(),
                model,
                PROVIDER_TIMEOUT,
            )?),
            Provider::Gemini => Arc::new(GeminiService::new(
                key.to_string(),
                model,
                PROVIDER_TIMEOUT,
            )?),
        },
    };

    Ok(Arc::new(LoggingService::new(inner)))
}

/// Stand-in used when no API key is configured
struct UnconfiguredService {
    provider: Provider,
    model: String,
}

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(format!(
            "{} API key not configured (set {})",
            self.provider,
            self.provider.api_key_env_var()
        )))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
