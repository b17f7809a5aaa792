//! Guardrail configuration

use super::dispatcher::RacePolicy;
use super::moderation::DEFAULT_MODERATION_THRESHOLD;
use super::prompts::{DEFAULT_SYSTEM_PROMPT, ModerationRubric, TOPICAL_GUARDRAIL_PROMPT};
use crate::error::LlmError;

pub const CHAT_MODEL_ENV: &str = "RAILGUARD_CHAT_MODEL";
pub const GUARDRAIL_MODEL_ENV: &str = "RAILGUARD_GUARDRAIL_MODEL";
pub const MODERATION_THRESHOLD_ENV: &str = "RAILGUARD_MODERATION_THRESHOLD";
pub const RACE_POLICY_ENV: &str = "RAILGUARD_RACE_POLICY";

/// Settings for a [`GuardedChat`](super::GuardedChat) wired with the
/// topical and moderation guardrails.
#[derive(Debug, Clone)]
pub struct GuardrailConfig {
    /// Model for the generation call; `None` uses the client default
    pub chat_model: Option<String>,
    pub chat_temperature: f32,
    pub system_prompt: String,
    /// Model for both classifiers; `None` uses the client default
    pub guardrail_model: Option<String>,
    pub guardrail_temperature: f32,
    pub topical_prompt: String,
    pub moderation_rubric: ModerationRubric,
    pub moderation_threshold: i64,
    pub race_policy: RacePolicy,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            chat_model: None,
            chat_temperature: 0.5,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            guardrail_model: None,
            guardrail_temperature: 0.0,
            topical_prompt: TOPICAL_GUARDRAIL_PROMPT.to_string(),
            moderation_rubric: ModerationRubric::default(),
            moderation_threshold: DEFAULT_MODERATION_THRESHOLD,
            race_policy: RacePolicy::default(),
        }
    }
}

impl GuardrailConfig {
    /// Defaults overlaid with any `RAILGUARD_*` variables that are set.
    pub fn from_env() -> Result<Self, LlmError> {
        let mut config = Self::default();
        if let Some(model) = env(CHAT_MODEL_ENV) {
            config.chat_model = Some(model);
        }
        if let Some(model) = env(GUARDRAIL_MODEL_ENV) {
            config.guardrail_model = Some(model);
        }
        if let Some(raw) = env(MODERATION_THRESHOLD_ENV) {
            config.moderation_threshold = raw.trim().parse().map_err(|e| {
                LlmError::ConfigurationError(format!(
                    "{MODERATION_THRESHOLD_ENV}='{raw}' is not an integer: {e}"
                ))
            })?;
        }
        if let Some(raw) = env(RACE_POLICY_ENV) {
            config.race_policy = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    pub fn with_guardrail_model(mut self, model: impl Into<String>) -> Self {
        self.guardrail_model = Some(model.into());
        self
    }

    pub const fn with_moderation_threshold(mut self, threshold: i64) -> Self {
        self.moderation_threshold = threshold;
        self
    }

    pub fn with_moderation_rubric(mut self, rubric: ModerationRubric) -> Self {
        self.moderation_rubric = rubric;
        self
    }

    pub fn with_topical_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.topical_prompt = prompt.into();
        self
    }

    pub const fn with_race_policy(mut self, policy: RacePolicy) -> Self {
        self.race_policy = policy;
        self
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
