//! HTTP request handlers

use super::types::{AdviceRequest, AdviceResponse, ErrorResponse};
use super::AppState;
use crate::relay::{RelayError, PROVIDER_FAILURE_MESSAGE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/advice", post(advise))
        .route("/api/health", get(health))
        .with_state(state)
}

// ============================================================
// Advice
// ============================================================

async fn advise(
    State(state): State<AppState>,
    body: Result<Json<AdviceRequest>, JsonRejection>,
) -> Result<Json<AdviceResponse>, AppError> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "Rejected malformed advice request");
        AppError::BadRequest("Request body must be a JSON object with a messages array".to_string())
    })?;

    let hints = req.hints();
    let messages = match req.messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => {
            return Err(AppError::BadRequest(
                "messages must be a non-empty array".to_string(),
            ))
        }
    };

    let answer = state.relay.advise(&messages, &hints).await?;
    Ok(Json(AdviceResponse { answer }))
}

// ============================================================
// Health
// ============================================================

async fn health() -> &'static str {
    "Server is running"
}

// ============================================================
// Error handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal,
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::InvalidRequest(msg) => AppError::BadRequest(msg),
            // Already logged by the relay with its request id
            RelayError::ProviderUnavailable(_) => AppError::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                PROVIDER_FAILURE_MESSAGE.to_string(),
            ),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PromptTemplates;
    use crate::llm::testing::MockLlmService;
    use crate::llm::LlmError;
    use crate::relay::Relay;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(mock: &Arc<MockLlmService>) -> Router {
        let relay = Relay::new(mock.clone(), PromptTemplates::default());
        create_router(AppState::new(relay))
    }

    async fn post_advice(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/advice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let mock = Arc::new(MockLlmService::new());
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Server is running");
    }

    #[tokio::test]
    async fn test_answer_returned() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("I hear you.");

        let body = json!({
            "messages": [{ "role": "user", "content": "Here's my situation" }],
            "userMbti": "INFP",
            "friendMbti": "ESTJ"
        });
        let (status, value) = post_advice(app(&mock), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "answer": "I hear you." }));

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system.as_deref().unwrap().contains("ESTJ"));
        assert_eq!(requests[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_messages_rejected_without_provider_call() {
        let bodies = [
            json!({}).to_string(),
            json!({ "messages": [] }).to_string(),
            json!({ "messages": null }).to_string(),
            json!({ "messages": "hello" }).to_string(),
            json!({ "messages": [{ "role": "system", "content": "x" }] }).to_string(),
            json!({ "messages": [{ "role": "user" }] }).to_string(),
            "{not json".to_string(),
        ];

        for body in bodies {
            let mock = Arc::new(MockLlmService::new());
            let (status, value) = post_advice(app(&mock), body.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert!(value["error"].is_string(), "body: {body}");
            assert_eq!(mock.call_count(), 0, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_generic_500() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::server_error("upstream exploded: key=sk-live-42"));

        let body = json!({ "messages": [{ "role": "user", "content": "hi" }] });
        let (status, value) = post_advice(app(&mock), body.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({ "error": "AI failed to respond" }));
    }

    #[tokio::test]
    async fn test_blank_provider_answer_uses_fallback() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("");

        let body = json!({ "messages": [{ "role": "user", "content": "hi" }] });
        let (status, value) = post_advice(app(&mock), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["answer"], "Sorry, I could not generate a response.");
    }
}
