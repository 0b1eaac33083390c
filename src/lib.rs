//! Unknot: a friendship-conflict counselor
//!
//! A short questionnaire captures the situation, the composer turns it into
//! a system instruction plus an opening message, and the relay forwards the
//! conversation to a hosted completion model.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod api;
pub mod collector;
pub mod composer;
pub mod config;
pub mod llm;
pub mod relay;
pub mod session;
pub mod transcript;
