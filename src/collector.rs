//! Answer collector: the questionnaire state machine
//!
//! Walks the steps of a [`Questionnaire`] in order and packages the answers
//! into a [`SituationSummary`]. Invalid states cannot be reached: choice steps
//! only accept declared options, and the final step refuses to submit a blank
//! message.

mod schema;

pub use schema::{Field, KindTag, Questionnaire, SchemaError, StepDescriptor, StepKind, TYPE_MAX_LEN};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Structured output of the questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationSummary {
    pub closeness: String,
    pub feeling: String,
    pub intent: String,
    pub message: String,
    #[serde(default, rename = "userMbti", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, rename = "friendMbti", skip_serializing_if = "Option::is_none")]
    pub friend_type: Option<String>,
}

/// Where the collector is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Step(usize),
    Submitted,
}

/// Operations refused by the collector
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectorError {
    #[error("the questionnaire has already been submitted")]
    AlreadySubmitted,
    #[error("step '{field}' is a {actual} step")]
    WrongStepKind { field: Field, actual: KindTag },
    #[error("'{option}' is not an option for '{field}'")]
    UnknownOption { field: Field, option: String },
    #[error("'{0}' is required")]
    RequiredField(Field),
    #[error("write a message before starting the conversation")]
    EmptyMessage,
    #[error("no answer recorded for '{0}'")]
    MissingAnswer(Field),
}

/// Questionnaire progress for one user
#[derive(Debug, Clone)]
pub struct Collector {
    schema: Questionnaire,
    answers: HashMap<Field, String>,
    state: CollectorState,
}

impl Collector {
    pub fn new(schema: Questionnaire) -> Self {
        Self {
            schema,
            answers: HashMap::new(),
            state: CollectorState::Step(0),
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        self.state == CollectorState::Submitted
    }

    /// Zero-based index of the current step, `None` once submitted
    pub fn step_index(&self) -> Option<usize> {
        match self.state {
            CollectorState::Step(i) => Some(i),
            CollectorState::Submitted => None,
        }
    }

    pub fn step_count(&self) -> usize {
        self.schema.len()
    }

    pub fn current_step(&self) -> Option<&StepDescriptor> {
        self.step_index().and_then(|i| self.schema.step(i))
    }

    /// Recorded answer (or current draft) for a field
    pub fn answer(&self, field: Field) -> Option<&str> {
        self.answers.get(&field).map(String::as_str)
    }

    /// Select an option on a choice step; records it and advances
    pub fn choose(&mut self, option: &str) -> Result<usize, CollectorError> {
        let (index, step) = self.active_step()?;
        let StepKind::Choice { options } = &step.kind else {
            return Err(wrong_kind(step));
        };
        if !options.iter().any(|o| o == option) {
            return Err(CollectorError::UnknownOption {
                field: step.field,
                option: option.to_string(),
            });
        }

        let field = step.field;
        self.answers.insert(field, option.to_string());
        Ok(self.advance(index))
    }

    /// Update the draft of the current text or longtext step.
    ///
    /// Text input is upper-cased and cut to the step's length bound.
    pub fn input(&mut self, value: &str) -> Result<(), CollectorError> {
        let (_, step) = self.active_step()?;
        let normalized = match &step.kind {
            StepKind::Text { max_len, .. } => value.to_uppercase().chars().take(*max_len).collect(),
            StepKind::LongText => value.to_string(),
            StepKind::Choice { .. } => return Err(wrong_kind(step)),
        };

        let field = step.field;
        self.answers.insert(field, normalized);
        Ok(())
    }

    /// Move past a text step ("Next")
    pub fn next(&mut self) -> Result<usize, CollectorError> {
        let (index, step) = self.active_step()?;
        let StepKind::Text { required, .. } = &step.kind else {
            return Err(wrong_kind(step));
        };
        if *required && is_blank(self.answer(step.field)) {
            return Err(CollectorError::RequiredField(step.field));
        }
        Ok(self.advance(index))
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        matches!(
            self.current_step().map(|s| &s.kind),
            Some(StepKind::LongText)
        ) && !is_blank(self.answer(Field::Message))
    }

    /// Finish the questionnaire from the final longtext step
    pub fn submit(&mut self) -> Result<SituationSummary, CollectorError> {
        let (_, step) = self.active_step()?;
        if step.kind != StepKind::LongText {
            return Err(wrong_kind(step));
        }
        if is_blank(self.answer(Field::Message)) {
            return Err(CollectorError::EmptyMessage);
        }

        let summary = self.summary()?;
        self.state = CollectorState::Submitted;
        tracing::debug!(
            closeness = %summary.closeness,
            feeling = %summary.feeling,
            intent = %summary.intent,
            has_types = summary.user_type.is_some() || summary.friend_type.is_some(),
            "Questionnaire submitted"
        );
        Ok(summary)
    }

    fn summary(&self) -> Result<SituationSummary, CollectorError> {
        let required = |field| {
            self.answer(field)
                .map(ToString::to_string)
                .ok_or(CollectorError::MissingAnswer(field))
        };
        let optional = |field| {
            self.answer(field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        Ok(SituationSummary {
            closeness: required(Field::Closeness)?,
            feeling: required(Field::Feeling)?,
            intent: required(Field::Intent)?,
            message: required(Field::Message)?.trim().to_string(),
            user_type: optional(Field::UserType),
            friend_type: optional(Field::FriendType),
        })
    }

    fn active_step(&self) -> Result<(usize, &StepDescriptor), CollectorError> {
        let index = self.step_index().ok_or(CollectorError::AlreadySubmitted)?;
        let step = self
            .schema
            .step(index)
            .ok_or(CollectorError::AlreadySubmitted)?;
        Ok((index, step))
    }

    /// Schema validation guarantees the last step is the longtext step, so
    /// choice and text steps always have a successor.
    fn advance(&mut self, index: usize) -> usize {
        let next = (index + 1).min(self.schema.len().saturating_sub(1));
        self.state = CollectorState::Step(next);
        next
    }
}

fn wrong_kind(step: &StepDescriptor) -> CollectorError {
    CollectorError::WrongStepKind {
        field: step.field,
        actual: match step.kind {
            StepKind::Choice { .. } => KindTag::Choice,
            StepKind::Text { .. } => KindTag::Text,
            StepKind::LongText => KindTag::LongText,
        },
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
