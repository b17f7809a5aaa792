//! Shared test doubles

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use railguard::prelude::*;
use railguard::types::MessageRole;

/// Which of the three pipeline calls a request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Topical,
    Generation,
    Moderation,
}

/// Chat double that answers each pipeline call from a script.
///
/// Calls are told apart by their prompts: the topical classifier sends the
/// topical system prompt, moderation sends one user message holding the
/// rubric, everything else is generation.
pub struct ScriptedChat {
    pub topical_prompt: String,
    pub label: String,
    pub label_delay: Duration,
    pub generation: String,
    pub generation_delay: Duration,
    pub score: String,
    pub calls: Mutex<Vec<CallKind>>,
}

impl ScriptedChat {
    pub fn new(topical_prompt: impl Into<String>) -> Self {
        Self {
            topical_prompt: topical_prompt.into(),
            label: "allowed".to_string(),
            label_delay: Duration::ZERO,
            generation: "Consider a Ragdoll or a Golden Retriever.".to_string(),
            generation_delay: Duration::ZERO,
            score: "1".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn label(mut self, label: &str, delay: Duration) -> Self {
        self.label = label.to_string();
        self.label_delay = delay;
        self
    }

    pub fn generation(mut self, text: &str, delay: Duration) -> Self {
        self.generation = text.to_string();
        self.generation_delay = delay;
        self
    }

    pub fn score(mut self, score: &str) -> Self {
        self.score = score.to_string();
        self
    }

    pub fn calls(&self) -> Vec<CallKind> {
        self.calls.lock().unwrap().clone()
    }

    fn kind_of(&self, request: &ChatRequest) -> CallKind {
        match request.messages.as_slice() {
            [system, _] if system.role == MessageRole::System && system.content == self.topical_prompt => {
                CallKind::Topical
            }
            [only] if only.role == MessageRole::User && only.content.contains("### Evaluation") => {
                CallKind::Moderation
            }
            _ => CallKind::Generation,
        }
    }
}

#[async_trait]
impl ChatCapability for ScriptedChat {
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let kind = self.kind_of(&request);
        self.calls.lock().unwrap().push(kind);
        let (reply, delay) = match kind {
            CallKind::Topical => (&self.label, self.label_delay),
            CallKind::Generation => (&self.generation, self.generation_delay),
            CallKind::Moderation => (&self.score, Duration::ZERO),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(ChatResponse::new(reply.clone()))
    }
}
