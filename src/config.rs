//! Environment configuration for the server and the terminal client

use crate::collector::Questionnaire;
use crate::llm::{LlmConfig, Provider, UnknownProvider};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Provider(#[from] UnknownProvider),
    #[error("unknown questionnaire '{0}' (expected 'standard' or 'classic')")]
    UnknownQuestionnaire(String),
}

/// Server settings
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub max_tokens: u32,
    pub frontend_url: String,
    pub port: u16,
    /// JSON file overriding the built-in system prompts
    pub prompts_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match var("LLM_PROVIDER") {
            Some(name) => Provider::from_str(name.trim())?,
            None => Provider::default(),
        };

        Ok(Self {
            llm: LlmConfig {
                provider,
                api_key: var(provider.api_key_env_var()),
                model: var("LLM_MODEL"),
            },
            max_tokens: parse_or("LLM_MAX_TOKENS", var("LLM_MAX_TOKENS").as_deref(), DEFAULT_MAX_TOKENS),
            frontend_url: var("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            port: parse_or("PORT", var("PORT").as_deref(), DEFAULT_PORT),
            prompts_path: var("UNKNOT_PROMPTS").map(PathBuf::from),
        })
    }
}

/// Terminal client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub questionnaire: Questionnaire,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let questionnaire = match var("UNKNOT_QUESTIONNAIRE").as_deref().map(str::trim) {
            None | Some("standard") => Questionnaire::standard(),
            Some("classic") => Questionnaire::classic(),
            Some(other) => return Err(ConfigError::UnknownQuestionnaire(other.to_string())),
        };

        let backend_url = var("UNKNOT_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        Ok(Self {
            backend_url,
            questionnaire,
        })
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, value: Option<&str>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Invalid number, using default");
            default
        }),
    }
}
