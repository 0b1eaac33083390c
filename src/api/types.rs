//! API request and response types

use crate::composer::TypeHints;
use crate::transcript::Turn;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/advice`
///
/// Unknown fields are ignored. `messages` stays optional here so a missing
/// array is reported with the same message as an empty one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub messages: Option<Vec<Turn>>,
    #[serde(
        default,
        rename = "userMbti",
        alias = "userType",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_type: Option<String>,
    #[serde(
        default,
        rename = "friendMbti",
        alias = "friendType",
        skip_serializing_if = "Option::is_none"
    )]
    pub friend_type: Option<String>,
}

impl AdviceRequest {
    pub fn hints(&self) -> TypeHints {
        TypeHints::new(self.user_type.as_deref(), self.friend_type.as_deref())
    }
}

/// Successful advice reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub answer: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_both_type_spellings() {
        let req: AdviceRequest = serde_json::from_str(
            r#"{"messages": [], "userMbti": "infp", "friendType": "estj", "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(req.user_type.as_deref(), Some("infp"));
        assert_eq!(req.friend_type.as_deref(), Some("estj"));
        assert_eq!(req.hints().pair(), Some(("INFP", "ESTJ")));
    }

    #[test]
    fn test_request_serializes_wire_names() {
        let req = AdviceRequest {
            messages: Some(vec![Turn::user("hi")]),
            user_type: Some("INFP".to_string()),
            friend_type: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [{ "role": "user", "content": "hi" }],
                "userMbti": "INFP"
            })
        );
    }
}
