//! Questionnaire step schema
//!
//! The questionnaire is data: an ordered list of step descriptors. Two
//! schemas ship built in, and others can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Default length bound for personality-type inputs (e.g. "INFP")
pub const TYPE_MAX_LEN: usize = 4;

/// Answer slot a step fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "closeness")]
    Closeness,
    #[serde(rename = "feeling")]
    Feeling,
    #[serde(rename = "intent")]
    Intent,
    #[serde(rename = "userMbti", alias = "userType")]
    UserType,
    #[serde(rename = "friendMbti", alias = "friendType")]
    FriendType,
    #[serde(rename = "message")]
    Message,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Closeness => "closeness",
            Field::Feeling => "feeling",
            Field::Intent => "intent",
            Field::UserType => "userMbti",
            Field::FriendType => "friendMbti",
            Field::Message => "message",
        }
    }

    fn expected_kind(self) -> KindTag {
        match self {
            Field::Closeness | Field::Feeling | Field::Intent => KindTag::Choice,
            Field::UserType | Field::FriendType => KindTag::Text,
            Field::Message => KindTag::LongText,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a step is answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Fixed option buttons; selecting one records it and advances
    Choice { options: Vec<String> },
    /// Bounded single-line input, upper-cased, advanced with "Next"
    Text {
        #[serde(default = "default_type_max_len")]
        max_len: usize,
        #[serde(default)]
        required: bool,
    },
    /// Multi-line required input; the final step
    #[serde(rename = "longtext")]
    LongText,
}

fn default_type_max_len() -> usize {
    TYPE_MAX_LEN
}

impl StepKind {
    fn tag(&self) -> KindTag {
        match self {
            StepKind::Choice { .. } => KindTag::Choice,
            StepKind::Text { .. } => KindTag::Text,
            StepKind::LongText => KindTag::LongText,
        }
    }
}

/// Step kind without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Choice,
    Text,
    LongText,
}

impl std::fmt::Display for KindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KindTag::Choice => "choice",
            KindTag::Text => "text",
            KindTag::LongText => "longtext",
        })
    }
}

/// One questionnaire step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub field: Field,
    pub label: String,
    #[serde(flatten)]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl StepDescriptor {
    pub fn choice(field: Field, label: &str, options: &[&str]) -> Self {
        Self {
            field,
            label: label.to_string(),
            kind: StepKind::Choice {
                options: options.iter().map(ToString::to_string).collect(),
            },
            placeholder: None,
        }
    }

    pub fn text(field: Field, label: &str, placeholder: &str) -> Self {
        Self {
            field,
            label: label.to_string(),
            kind: StepKind::Text {
                max_len: TYPE_MAX_LEN,
                required: false,
            },
            placeholder: Some(placeholder.to_string()),
        }
    }

    pub fn long_text(field: Field, label: &str, placeholder: &str) -> Self {
        Self {
            field,
            label: label.to_string(),
            kind: StepKind::LongText,
            placeholder: Some(placeholder.to_string()),
        }
    }
}

/// Schema validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("questionnaire has no step for '{0}'")]
    MissingField(Field),
    #[error("questionnaire asks for '{0}' more than once")]
    DuplicateField(Field),
    #[error("step '{field}' must be a {expected} step")]
    WrongKind { field: Field, expected: KindTag },
    #[error("choice step '{0}' has no options")]
    NoOptions(Field),
    #[error("the message step must be the last step")]
    MessageNotLast,
    #[error("invalid questionnaire JSON: {0}")]
    Parse(String),
}

const CLOSENESS_OPTIONS: &[&str] = &["Best Friend", "Close Friend", "Just Friends", "Acquaintance"];
const FEELING_OPTIONS: &[&str] = &["Hurt", "Confused", "Ignored", "Guilty", "Angry"];
const INTENT_OPTIONS: &[&str] = &["Fix things", "Take a break", "Let it go"];

/// Validated, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Questionnaire {
    steps: Vec<StepDescriptor>,
}

impl Questionnaire {
    /// Validate and wrap a list of steps
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.field) {
                return Err(SchemaError::DuplicateField(step.field));
            }
            let expected = step.field.expected_kind();
            if step.kind.tag() != expected {
                return Err(SchemaError::WrongKind {
                    field: step.field,
                    expected,
                });
            }
            if let StepKind::Choice { options } = &step.kind {
                if options.is_empty() {
                    return Err(SchemaError::NoOptions(step.field));
                }
            }
        }

        for required in [Field::Closeness, Field::Feeling, Field::Intent, Field::Message] {
            if !seen.contains(&required) {
                return Err(SchemaError::MissingField(required));
            }
        }

        if steps.last().map(|s| s.field) != Some(Field::Message) {
            return Err(SchemaError::MessageNotLast);
        }

        Ok(Self { steps })
    }

    /// Parse and validate a JSON array of step descriptors
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let steps: Vec<StepDescriptor> =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::new(steps)
    }

    /// Six steps, including both personality-type questions
    pub fn standard() -> Self {
        Self {
            steps: vec![
                closeness_step(),
                feeling_step(),
                intent_step(),
                StepDescriptor::text(
                    Field::UserType,
                    "What's your MBTI type? (optional)",
                    "e.g., INFP",
                ),
                StepDescriptor::text(
                    Field::FriendType,
                    "What's your friend's MBTI type? (optional)",
                    "e.g., ESTJ",
                ),
                message_step(),
            ],
        }
    }

    /// Four steps, no personality types
    pub fn classic() -> Self {
        Self {
            steps: vec![closeness_step(), feeling_step(), intent_step(), message_step()],
        }
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }
}

fn closeness_step() -> StepDescriptor {
    StepDescriptor::choice(
        Field::Closeness,
        "How close are you with this person?",
        CLOSENESS_OPTIONS,
    )
}

fn feeling_step() -> StepDescriptor {
    StepDescriptor::choice(
        Field::Feeling,
        "What emotion are you feeling most?",
        FEELING_OPTIONS,
    )
}

fn intent_step() -> StepDescriptor {
    StepDescriptor::choice(Field::Intent, "What do you want right now?", INTENT_OPTIONS)
}

fn message_step() -> StepDescriptor {
    StepDescriptor::long_text(
        Field::Message,
        "If they were in front of you, what would you say?",
        "Type what your heart feels...",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_validate() {
        let standard = Questionnaire::standard();
        assert_eq!(standard.len(), 6);
        assert_eq!(Questionnaire::new(standard.steps().to_vec()).unwrap(), standard);

        let classic = Questionnaire::classic();
        assert_eq!(classic.len(), 4);
        assert_eq!(Questionnaire::new(classic.steps().to_vec()).unwrap(), classic);
    }

    #[test]
    fn test_missing_required_field() {
        let steps = vec![closeness_step(), feeling_step(), message_step()];
        assert_eq!(
            Questionnaire::new(steps),
            Err(SchemaError::MissingField(Field::Intent))
        );
    }

    #[test]
    fn test_duplicate_field() {
        let steps = vec![
            closeness_step(),
            closeness_step(),
            feeling_step(),
            intent_step(),
            message_step(),
        ];
        assert_eq!(
            Questionnaire::new(steps),
            Err(SchemaError::DuplicateField(Field::Closeness))
        );
    }

    #[test]
    fn test_message_must_be_last() {
        let steps = vec![closeness_step(), message_step(), feeling_step(), intent_step()];
        assert_eq!(Questionnaire::new(steps), Err(SchemaError::MessageNotLast));
    }

    #[test]
    fn test_kind_must_match_field() {
        let steps = vec![
            StepDescriptor::text(Field::Closeness, "How close?", ""),
            feeling_step(),
            intent_step(),
            message_step(),
        ];
        assert_eq!(
            Questionnaire::new(steps),
            Err(SchemaError::WrongKind {
                field: Field::Closeness,
                expected: KindTag::Choice
            })
        );
    }

    #[test]
    fn test_empty_options_rejected() {
        let steps = vec![
            StepDescriptor::choice(Field::Closeness, "How close?", &[]),
            feeling_step(),
            intent_step(),
            message_step(),
        ];
        assert_eq!(
            Questionnaire::new(steps),
            Err(SchemaError::NoOptions(Field::Closeness))
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"field": "closeness", "label": "How close?", "kind": "choice", "options": ["Best Friend"]},
            {"field": "feeling", "label": "Feeling?", "kind": "choice", "options": ["Hurt"]},
            {"field": "intent", "label": "Want?", "kind": "choice", "options": ["Fix things"]},
            {"field": "userType", "label": "Your type?", "kind": "text"},
            {"field": "message", "label": "Say?", "kind": "longtext", "placeholder": "..."}
        ]"#;
        let schema = Questionnaire::from_json(json).unwrap();
        assert_eq!(schema.len(), 5);
        assert_eq!(
            schema.step(3).unwrap().kind,
            StepKind::Text {
                max_len: TYPE_MAX_LEN,
                required: false
            }
        );
    }

    #[test]
    fn test_from_json_round_trips_builtin() {
        let json = serde_json::to_string(&Questionnaire::standard()).unwrap();
        assert_eq!(Questionnaire::from_json(&json).unwrap(), Questionnaire::standard());
    }

    #[test]
    fn test_from_json_parse_error() {
        assert!(matches!(
            Questionnaire::from_json("{not json"),
            Err(SchemaError::Parse(_))
        ));
    }
}
