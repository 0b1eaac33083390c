//! Ways for a session to reach the relay

use crate::api::{AdviceRequest, AdviceResponse, ErrorResponse};
use crate::composer::TypeHints;
use crate::relay::{Relay, RelayError};
use crate::transcript::Turn;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Relay returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Something that turns a transcript into the next assistant reply
#[async_trait]
pub trait AdviceClient: Send + Sync {
    async fn advise(&self, transcript: &[Turn], hints: &TypeHints) -> Result<String, ClientError>;
}

/// Talks to a running server over `POST /api/advice`
pub struct HttpAdviceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAdviceClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/advice", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AdviceClient for HttpAdviceClient {
    async fn advise(&self, transcript: &[Turn], hints: &TypeHints) -> Result<String, ClientError> {
        let body = AdviceRequest {
            messages: Some(transcript.to_vec()),
            user_type: hints.user().map(str::to_string),
            friend_type: hints.friend().map(str::to_string),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply: AdviceResponse = response.json().await?;
        Ok(reply.answer)
    }
}

/// Calls a [`Relay`] in-process, skipping HTTP
pub struct LocalAdviceClient {
    relay: Relay,
}

impl LocalAdviceClient {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl AdviceClient for LocalAdviceClient {
    async fn advise(&self, transcript: &[Turn], hints: &TypeHints) -> Result<String, ClientError> {
        Ok(self.relay.advise(transcript, hints).await?)
    }
}
