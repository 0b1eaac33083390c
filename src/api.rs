//! HTTP API for the advice relay

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::relay::Relay;
use axum::http::header::{self, HeaderValue, InvalidHeaderValue};
use axum::http::Method;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// CORS policy admitting only the configured frontend origin
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(frontend_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PromptTemplates;
    use crate::llm::testing::MockLlmService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const FRONTEND: &str = "http://localhost:5173";

    async fn allowed_origin(origin: &str, method: Method) -> Option<HeaderValue> {
        let relay = Relay::new(Arc::new(MockLlmService::new()), PromptTemplates::default());
        let app = create_router(AppState::new(relay)).layer(cors_layer(FRONTEND).unwrap());

        let mut request = Request::builder()
            .method(method.clone())
            .uri("/api/health")
            .header(header::ORIGIN, origin);
        if method == Method::OPTIONS {
            request = request.header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET");
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_cors_admits_frontend_origin_only() {
        assert_eq!(
            allowed_origin(FRONTEND, Method::GET).await,
            Some(HeaderValue::from_static(FRONTEND))
        );
        assert_eq!(allowed_origin("http://evil.example", Method::GET).await, None);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        assert_eq!(
            allowed_origin(FRONTEND, Method::OPTIONS).await,
            Some(HeaderValue::from_static(FRONTEND))
        );
        assert_eq!(allowed_origin("http://evil.example", Method::OPTIONS).await, None);
    }

    #[test]
    fn test_cors_rejects_unusable_origin() {
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
