//! Pure session transition function

use super::{Effect, Event, SessionState, CONNECTION_ERROR};
use crate::transcript::Turn;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejected transitions; the session is left unchanged
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Still waiting for a reply, cannot accept another message")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Given the same inputs, always produces the same outputs; no I/O.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (SessionState::Idle, Event::UserSubmit { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            Ok(TransitionResult::new(SessionState::AwaitingResponse)
                .with_effect(Effect::AppendTurn(Turn::user(text)))
                .with_effect(Effect::RequestAdvice))
        }

        (SessionState::AwaitingResponse, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        (SessionState::AwaitingResponse, Event::RelaySucceeded { answer }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::AppendTurn(Turn::assistant(answer))))
        }

        (SessionState::AwaitingResponse, Event::RelayFailed { .. }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::AppendTurn(Turn::assistant(CONNECTION_ERROR))))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with {event:?}"
        ))),
    }
}
