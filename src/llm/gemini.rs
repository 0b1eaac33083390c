//! Google Gemini provider implementation

use super::types::{LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let model = model.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: format!("{GEMINI_BASE_URL}/{model}:generateContent"),
            model,
        })
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let system_instruction = request.system.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: text.clone() }],
        });

        let contents = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.text.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: request.max_tokens,
            }),
        }
    }

    /// A prompt blocked outright comes back with no candidates at all
    fn normalize_response(resp: GeminiResponse) -> LlmResponse {
        let parts = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = resp.usage_metadata.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_token_count),
            output_tokens: u64::from(u.candidates_token_count),
        });

        LlmResponse { parts, usage }
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                return Err(LlmError::from_status(status, &error_resp.error.message));
            }
            return Err(LlmError::from_status(status, &body));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(gemini_response))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{PromptTemplates, TypeHints};
    use crate::llm::LlmMessage;
    use crate::relay::{Relay, FALLBACK_ANSWER};
    use crate::transcript::Turn;
    use std::sync::Arc;

    #[test]
    fn test_assistant_maps_to_model_role() {
        let request = LlmRequest {
            system: Some("Be warm.".to_string()),
            messages: vec![LlmMessage::user("hi"), LlmMessage::assistant("hello")],
            max_tokens: Some(256),
        };
        let json = serde_json::to_value(GeminiService::translate_request(&request)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be warm.");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_blocked_candidate_has_no_text() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let response = GeminiService::normalize_response(parsed);
        assert!(response.usable_text().is_none());
    }

    #[test]
    fn test_no_candidates_has_no_text() {
        for body in [r#"{"candidates": []}"#, r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#] {
            let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
            assert!(GeminiService::normalize_response(parsed).usable_text().is_none());
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_becomes_fallback_answer() {
        let app = axum::Router::new().route(
            "/generate",
            axum::routing::post(|| async { axum::Json(serde_json::json!({ "candidates": [] })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut service =
            GeminiService::new("k".to_string(), "gemini-1.5-pro", Duration::from_secs(5)).unwrap();
        service.base_url = format!("http://{addr}/generate");

        let relay = Relay::new(Arc::new(service), PromptTemplates::default());
        let answer = relay
            .advise(&[Turn::user("hi")], &TypeHints::default())
            .await
            .unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[test]
    fn test_url_contains_model() {
        let service =
            GeminiService::new("k".to_string(), "gemini-1.5-pro", Duration::from_secs(1)).unwrap();
        assert!(service.base_url.ends_with("/gemini-1.5-pro:generateContent"));
    }
}
