//! Guardrail traits
//!
//! Input guardrails inspect the user request and race the generation call.
//! Output guardrails inspect generated text after it is available.

use crate::error::LlmError;
use crate::types::GuardrailVerdict;
use async_trait::async_trait;

#[async_trait]
pub trait InputGuardrail: Send + Sync {
    /// Name reported in refusals and logs.
    fn name(&self) -> &str;

    async fn check(&self, request: &str) -> Result<GuardrailVerdict, LlmError>;
}

#[async_trait]
pub trait OutputGuardrail: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, content: &str) -> Result<GuardrailVerdict, LlmError>;
}
