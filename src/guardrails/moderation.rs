//! Moderation output guardrail
//!
//! Scores generated text against a [`ModerationRubric`] and suppresses it at
//! or above a threshold.

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::ModerationRubric;
use crate::error::LlmError;
use crate::traits::{ChatCapability, OutputGuardrail};
use crate::types::{ChatMessage, ChatRequest, GuardrailVerdict, MODERATION_REFUSAL, ModerationScore};

pub const MODERATION_GUARDRAIL_NAME: &str = "moderation";

/// Scores at or above this value are flagged.
pub const DEFAULT_MODERATION_THRESHOLD: i64 = 3;

#[derive(Clone)]
pub struct ModerationGuardrail {
    client: Arc<dyn ChatCapability>,
    rubric: ModerationRubric,
    threshold: i64,
    model: Option<String>,
    temperature: f32,
    refusal: String,
}

impl ModerationGuardrail {
    pub fn new(client: Arc<dyn ChatCapability>) -> Self {
        Self {
            client,
            rubric: ModerationRubric::default(),
            threshold: DEFAULT_MODERATION_THRESHOLD,
            model: None,
            temperature: 0.0,
            refusal: MODERATION_REFUSAL.to_string(),
        }
    }

    pub fn with_rubric(mut self, rubric: ModerationRubric) -> Self {
        self.rubric = rubric;
        self
    }

    pub const fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_refusal(mut self, refusal: impl Into<String>) -> Self {
        self.refusal = refusal.into();
        self
    }

    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Ask the classifier for a score. A non-integer reply is a `ParseError`.
    pub async fn score(&self, content: &str) -> Result<ModerationScore, LlmError> {
        let mut request = ChatRequest::builder()
            .message(ChatMessage::user(self.rubric.render(content)))
            .temperature(self.temperature);
        if let Some(model) = &self.model {
            request = request.model(model.clone());
        }
        let reply = self.client.chat_request(request.build()).await?;
        let score: ModerationScore = reply.text().parse()?;
        if !score.in_rubric_range() {
            tracing::warn!(%score, "moderation score outside the 1-5 rubric");
        }
        Ok(score)
    }

    /// Return `content` unchanged if it passes, otherwise the refusal string.
    pub async fn moderate(&self, content: String) -> Result<String, LlmError> {
        match self.check(&content).await? {
            GuardrailVerdict::Pass => Ok(content),
            GuardrailVerdict::Veto { refusal } => Ok(refusal),
        }
    }
}

#[async_trait]
impl OutputGuardrail for ModerationGuardrail {
    fn name(&self) -> &str {
        MODERATION_GUARDRAIL_NAME
    }

    async fn check(&self, content: &str) -> Result<GuardrailVerdict, LlmError> {
        let score = self.score(content).await?;
        if score.value() >= self.threshold {
            tracing::info!(%score, threshold = self.threshold, "moderation guardrail flagged content");
            Ok(GuardrailVerdict::veto(self.refusal.clone()))
        } else {
            tracing::debug!(%score, threshold = self.threshold, "moderation guardrail passed content");
            Ok(GuardrailVerdict::Pass)
        }
    }
}
