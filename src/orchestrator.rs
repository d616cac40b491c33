//! Generation with escalation and fallback.
//!
//! The [`Orchestrator`] drives one topic through the providers:
//!
//! 1. Build a prompt and call the primary provider.
//! 2. Validate the text (minimum length only for fact-backed topics).
//! 3. If it was too short, rebuild the prompt with escalation and ask the
//!    primary once more.
//! 4. On any remaining primary failure, ask the fallback provider once with an
//!    equivalent non-escalated prompt.
//! 5. If the fallback fails too, return a [`GenerationError`] carrying the last
//!    reason.
//!
//! Exactly one provider's validated output is ever returned.

use crate::error::{AttemptFailure, GenerationError, PolicyError};
use crate::models::{FactRecord, Topic};
use crate::policy::validate;
use crate::prompt::{Prompt, PromptBuilder};
use crate::providers::GenerationProvider;
use crate::utils::truncate_for_log;
use tracing::{info, instrument, warn};

/// Validated text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub provider: &'static str,
    pub escalated: bool,
}

/// How strictly fallback output is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackValidation {
    /// Fallback text must meet the same minimum length as the primary's.
    #[default]
    Strict,
    /// Fallback text is only bounded by the maximum length.
    MaxLenOnly,
}

pub struct Orchestrator<'a, P, F> {
    builder: &'a PromptBuilder,
    primary: P,
    fallback: F,
    fallback_validation: FallbackValidation,
}

impl<'a, P, F> Orchestrator<'a, P, F>
where
    P: GenerationProvider,
    F: GenerationProvider,
{
    pub fn new(builder: &'a PromptBuilder, primary: P, fallback: F) -> Self {
        Self {
            builder,
            primary,
            fallback,
            fallback_validation: FallbackValidation::default(),
        }
    }

    pub fn with_fallback_validation(mut self, validation: FallbackValidation) -> Self {
        self.fallback_validation = validation;
        self
    }

    #[instrument(level = "info", skip_all, fields(%topic, primary = self.primary.name(), fallback = self.fallback.name()))]
    pub async fn run(&self, topic: &Topic, fact: Option<&FactRecord>) -> Result<Generated, GenerationError> {
        let prompt = self.builder.build(topic, fact, false);

        let primary_failure = match attempt(&self.primary, &prompt, prompt.min_len).await {
            Ok(text) => {
                return Ok(self.done(text, self.primary.name(), false));
            }
            Err(AttemptFailure::Policy(PolicyError::TooShort { len, min })) => {
                warn!(len, min, "Primary output too short; escalating prompt");
                let escalated = self.builder.build(topic, fact, true);
                match attempt(&self.primary, &escalated, escalated.min_len).await {
                    Ok(text) => return Ok(self.done(text, self.primary.name(), true)),
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        warn!(
            error = %primary_failure,
            fallback = self.fallback.name(),
            "Primary provider exhausted; using fallback"
        );

        let min_len = match self.fallback_validation {
            FallbackValidation::Strict => prompt.min_len,
            FallbackValidation::MaxLenOnly => None,
        };

        match attempt(&self.fallback, &prompt, min_len).await {
            Ok(text) => Ok(self.done(text, self.fallback.name(), false)),
            Err(reason) => Err(GenerationError {
                topic: topic.to_string(),
                provider: self.fallback.name(),
                reason,
            }),
        }
    }

    fn done(&self, text: String, provider: &'static str, escalated: bool) -> Generated {
        info!(
            provider,
            escalated,
            chars = text.chars().count(),
            preview = %truncate_for_log(&text, 80),
            "Generated post text"
        );
        Generated {
            text,
            provider,
            escalated,
        }
    }
}

/// One provider call followed by validation.
async fn attempt<G: GenerationProvider>(
    provider: &G,
    prompt: &Prompt,
    min_len: Option<usize>,
) -> Result<String, AttemptFailure> {
    let raw = provider.generate(prompt).await?;
    match validate(&raw, prompt.max_len, min_len) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                provider = provider.name(),
                error = %e,
                raw = %truncate_for_log(&raw, 120),
                "Output rejected by content policy"
            );
            Err(e.into())
        }
    }
}
