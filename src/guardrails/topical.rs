//! Topical input guardrail
//!
//! Classifies the user request as on or off topic with a chat call.

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::TOPICAL_GUARDRAIL_PROMPT;
use crate::error::LlmError;
use crate::traits::{ChatCapability, ChatExtensions, InputGuardrail};
use crate::types::{GuardrailVerdict, TOPICAL_REFUSAL, TopicLabel};

pub const TOPICAL_GUARDRAIL_NAME: &str = "topical";

/// Vetoes requests the classifier labels `not_allowed`.
///
/// Any other reply, including unrecognised labels, lets the request through.
#[derive(Clone)]
pub struct TopicalGuardrail {
    client: Arc<dyn ChatCapability>,
    system_prompt: String,
    model: Option<String>,
    temperature: f32,
    refusal: String,
}

impl TopicalGuardrail {
    pub fn new(client: Arc<dyn ChatCapability>) -> Self {
        Self {
            client,
            system_prompt: TOPICAL_GUARDRAIL_PROMPT.to_string(),
            model: None,
            temperature: 0.0,
            refusal: TOPICAL_REFUSAL.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Replace the prompt with one allowing exactly `topics`.
    pub fn with_allowed_topics(self, topics: &[&str]) -> Self {
        self.with_system_prompt(super::prompts::topical_prompt_for(topics))
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

    /// Raw classifier reply for `request`.
    pub async fn classify(&self, request: &str) -> Result<String, LlmError> {
        self.client
            .ask_with_system(
                &self.system_prompt,
                request,
                self.model.as_deref(),
                Some(self.temperature),
            )
            .await
    }
}

#[async_trait]
impl InputGuardrail for TopicalGuardrail {
    fn name(&self) -> &str {
        TOPICAL_GUARDRAIL_NAME
    }

    async fn check(&self, request: &str) -> Result<GuardrailVerdict, LlmError> {
        let label = self.classify(request).await?;
        match label.parse::<TopicLabel>() {
            Ok(TopicLabel::NotAllowed) => {
                tracing::info!(label = %label.trim(), "topical guardrail vetoed request");
                Ok(GuardrailVerdict::veto(self.refusal.clone()))
            }
            Ok(TopicLabel::Allowed) => {
                tracing::debug!("topical guardrail allowed request");
                Ok(GuardrailVerdict::Pass)
            }
            Err(_) => {
                tracing::warn!(label = %label.trim(), "unrecognised topical label, treating as allowed");
                Ok(GuardrailVerdict::Pass)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::types::{ChatRequest, ChatResponse};

    /// Replies with a fixed label and keeps the requests it saw.
    struct LabelChat {
        label: &'static str,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl LabelChat {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatCapability for LabelChat {
        async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok(ChatResponse::new(self.label))
        }
    }

    #[tokio::test]
    async fn allowed_topics_replace_the_system_prompt() {
        let chat = LabelChat::new("not_allowed");
        let guardrail = TopicalGuardrail::new(chat.clone()).with_allowed_topics(&["rivers", "lakes"]);

        let verdict = guardrail.check("tell me about volcanoes").await.unwrap();
        assert!(verdict.is_veto());

        let seen = chat.seen.lock().unwrap();
        let system = &seen[0].messages[0].content;
        assert!(system.contains("The allowed topics are rivers and lakes."));
        assert_eq!(seen[0].last_user_content(), Some("tell me about volcanoes"));
        assert_eq!(seen[0].temperature, Some(0.0));
    }

    #[tokio::test]
    async fn allowed_label_passes() {
        let guardrail = TopicalGuardrail::new(LabelChat::new(" Allowed\n"));
        assert_eq!(guardrail.check("cats?").await.unwrap(), GuardrailVerdict::Pass);
    }
}
