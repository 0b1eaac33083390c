//! Prompt composition
//!
//! Pure functions turning a [`SituationSummary`] and optional personality-type
//! hints into the counselor system instruction and the seed user message.
//! The instruction text is configuration data ([`PromptTemplates`]) so it can
//! be tuned without touching the relay.

use crate::collector::SituationSummary;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

const USER_TYPE_KEY: &str = "user_type";
const FRIEND_TYPE_KEY: &str = "friend_type";

/// Hint value meaning "the user did not know"
const UNKNOWN_TYPE: &str = "UNKNOWN";

const GENERIC_PROMPT: &str = r"You are a senior friendship counselor. A user is trying to resolve a misunderstanding with a friend.

Before giving any advice, ask one gentle, empathetic clarifying question about their situation. Once you understand what happened, give kind but clear advice that offers both emotional insight and one concrete next step they can take.

Respond in a warm, understanding tone. Keep replies short and conversational. Use Markdown for formatting.";

const WITH_TYPES_PROMPT: &str = r"You are a senior friendship counselor who also understands MBTI personality types. A user is trying to resolve a misunderstanding with a friend.

The user's personality type is {user_type}. Their friend's personality type is {friend_type}.

Your first reply must be one gentle clarifying question that explicitly mentions both {user_type} and {friend_type} and how these two types might be experiencing the situation differently. Only after the user answers, give kind but clear advice that offers emotional insight, draws on how {user_type} and {friend_type} tend to communicate, and ends with one concrete next step.

Respond in a warm, understanding tone. Keep replies short and conversational. Use Markdown for formatting.";

/// Template loading failures
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read prompt templates from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid prompt templates JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the with_types template must contain {{{0}}}")]
    MissingPlaceholder(&'static str),
}

/// System-instruction templates, keyed by whether type hints are present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// Used when both hints are present; contains `{user_type}` and `{friend_type}`
    pub with_types: String,
    /// Used otherwise
    pub generic: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            with_types: WITH_TYPES_PROMPT.to_string(),
            generic: GENERIC_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Validate a template pair
    pub fn new(with_types: String, generic: String) -> Result<Self, TemplateError> {
        for key in [USER_TYPE_KEY, FRIEND_TYPE_KEY] {
            if !with_types.contains(&format!("{{{key}}}")) {
                return Err(TemplateError::MissingPlaceholder(key));
            }
        }
        Ok(Self { with_types, generic })
    }

    /// Load templates from a JSON file with `with_types` and `generic` keys
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw: PromptTemplates = serde_json::from_str(&content)?;
        Self::new(raw.with_types, raw.generic)
    }
}

/// Normalized personality-type hints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHints {
    user: Option<String>,
    friend: Option<String>,
}

impl TypeHints {
    /// Trims and upper-cases each hint; empty values and "Unknown" are dropped
    pub fn new(user: Option<&str>, friend: Option<&str>) -> Self {
        Self {
            user: normalize_hint(user),
            friend: normalize_hint(friend),
        }
    }

    pub fn from_summary(summary: &SituationSummary) -> Self {
        Self::new(summary.user_type.as_deref(), summary.friend_type.as_deref())
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn friend(&self) -> Option<&str> {
        self.friend.as_deref()
    }

    /// Both hints, only when both are present
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.user.as_deref()?, self.friend.as_deref()?))
    }
}

fn normalize_hint(value: Option<&str>) -> Option<String> {
    let upper = value?.trim().to_uppercase();
    if upper.is_empty() || upper == UNKNOWN_TYPE {
        None
    } else {
        Some(upper)
    }
}

/// Output of [`compose`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_prompt: String,
    pub seed_user_message: String,
}

/// Build both prompt strings for a finished questionnaire
pub fn compose(summary: &SituationSummary, templates: &PromptTemplates) -> ComposedPrompt {
    ComposedPrompt {
        system_prompt: system_prompt(templates, &TypeHints::from_summary(summary)),
        seed_user_message: situation_message(summary),
    }
}

/// Render the situation narrative sent as the first user turn
pub fn situation_message(summary: &SituationSummary) -> String {
    let hints = TypeHints::from_summary(summary);
    let mut message = String::from("Here's my situation:\n");
    let _ = writeln!(message, "- How close we are: {}", summary.closeness);
    let _ = writeln!(message, "- How I'm feeling: {}", summary.feeling);
    let _ = writeln!(message, "- What I want to achieve: {}", summary.intent);
    if let Some(user) = hints.user() {
        let _ = writeln!(message, "- My personality type: {user}");
    }
    if let Some(friend) = hints.friend() {
        let _ = writeln!(message, "- My friend's personality type: {friend}");
    }
    let _ = write!(message, "- What I would say to them: \"{}\"", summary.message);
    message
}

/// Build the counselor instruction for the given hints
pub fn system_prompt(templates: &PromptTemplates, hints: &TypeHints) -> String {
    match hints.pair() {
        Some((user, friend)) => render(
            &templates.with_types,
            &[(USER_TYPE_KEY, user), (FRIEND_TYPE_KEY, friend)],
        ),
        None => templates.generic.clone(),
    }
}

/// Substitute `{key}` placeholders in a single pass, so substituted values
/// are never themselves scanned for placeholders.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after)) = rest.split_once('{') {
        out.push_str(before);
        let substituted = after.split_once('}').and_then(|(key, tail)| {
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, tail))
        });
        match substituted {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
