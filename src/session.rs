//! Client-side conversation session
//!
//! Elm-style: a pure transition function decides what happens, and
//! [`ConversationView`] executes the resulting effects against an
//! [`AdviceClient`].

mod client;
mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
mod view;

#[cfg(test)]
mod proptests;

pub use client::{AdviceClient, ClientError, HttpAdviceClient, LocalAdviceClient};
pub use effect::Effect;
pub use event::Event;
pub use state::SessionState;
pub use transition::{transition, TransitionError, TransitionResult};
pub use view::ConversationView;

use crate::collector::SituationSummary;
use crate::composer::situation_message;

/// Assistant turn shown when a session starts without a situation
pub const GREETING: &str = "Hello! How can I help you with your friendship today?";

/// Assistant turn appended when the relay cannot be reached
pub const CONNECTION_ERROR: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// What the questionnaire hands to the conversation view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSeed {
    pub initial_message: Option<String>,
    pub user_type: Option<String>,
    pub friend_type: Option<String>,
}

impl SessionSeed {
    pub fn from_summary(summary: &SituationSummary) -> Self {
        Self {
            initial_message: Some(situation_message(summary)),
            user_type: summary.user_type.clone(),
            friend_type: summary.friend_type.clone(),
        }
    }
}
