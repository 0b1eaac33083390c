//! Conversation view: owns the transcript and executes transition effects

use super::{
    transition, AdviceClient, Effect, Event, SessionSeed, SessionState, TransitionError, GREETING,
};
use crate::composer::TypeHints;
use crate::transcript::{Transcript, Turn};

pub struct ConversationView<C> {
    client: C,
    hints: TypeHints,
    state: SessionState,
    transcript: Transcript,
}

impl<C: AdviceClient> ConversationView<C> {
    /// Open a session. With an initial message the first relay call is made
    /// before this returns; otherwise the transcript starts with a greeting.
    pub async fn start(client: C, seed: SessionSeed) -> Self {
        let mut view = Self {
            client,
            hints: TypeHints::new(seed.user_type.as_deref(), seed.friend_type.as_deref()),
            state: SessionState::Idle,
            transcript: Transcript::new(),
        };

        match seed.initial_message.filter(|m| !m.trim().is_empty()) {
            Some(text) => {
                if let Err(e) = view.dispatch(Event::UserSubmit { text }).await {
                    tracing::warn!(error = %e, "Could not send initial message");
                }
            }
            None => view.transcript.push(Turn::assistant(GREETING)),
        }

        view
    }

    /// Send a user message and wait for the reply.
    ///
    /// Returns the assistant turn that was appended. Blank input is refused
    /// and leaves the transcript untouched.
    pub async fn send(&mut self, text: &str) -> Result<&Turn, TransitionError> {
        self.dispatch(Event::UserSubmit {
            text: text.to_string(),
        })
        .await?;
        self.transcript
            .last()
            .ok_or_else(|| TransitionError::InvalidTransition("transcript is empty".to_string()))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn hints(&self) -> &TypeHints {
        &self.hints
    }

    async fn dispatch(&mut self, event: Event) -> Result<(), TransitionError> {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let result = transition(&self.state, event)?;
            self.state = result.new_state;

            for effect in result.effects {
                match effect {
                    Effect::AppendTurn(turn) => self.transcript.push(turn),
                    Effect::RequestAdvice => {
                        let reply = self.client.advise(self.transcript.turns(), &self.hints).await;
                        next = Some(match reply {
                            Ok(answer) => Event::RelaySucceeded { answer },
                            Err(e) => {
                                tracing::warn!(error = %e, "Advice request failed");
                                Event::RelayFailed {
                                    error: e.to_string(),
                                }
                            }
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
