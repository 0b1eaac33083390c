//! Conversation turns and the append-only transcript

use crate::llm::{LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for LlmMessage {
    fn from(turn: &Turn) -> Self {
        LlmMessage {
            role: match turn.role {
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
            },
            text: turn.content.clone(),
        }
    }
}

/// Ordered conversation history.
///
/// Turns can only be appended; there is no way to edit or remove one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_wire_format() {
        let json = serde_json::to_value(Turn::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "user", "content": "hi" }));

        let turn: Turn =
            serde_json::from_str(r#"{"role": "assistant", "content": "hello"}"#).unwrap();
        assert_eq!(turn, Turn::assistant("hello"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<Turn>(r#"{"role": "system", "content": "x"}"#).is_err());
        assert!(serde_json::from_str::<Turn>(r#"{"role": "user", "content": 5}"#).is_err());
    }

    #[test]
    fn test_transcript_serializes_as_sequence() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("a"));
        transcript.push(Turn::assistant("b"));
        let json = serde_json::to_value(&transcript).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(transcript.last(), Some(&Turn::assistant("b")));
    }

    #[test]
    fn test_turn_to_llm_message() {
        let msg = LlmMessage::from(&Turn::assistant("ok"));
        assert_eq!(msg, LlmMessage::assistant("ok"));
    }
}
