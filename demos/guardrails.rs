//! Guardrails walkthrough
//!
//! Runs an on-topic and an off-topic request through a chat client wrapped
//! in the topical input guardrail and the moderation output guardrail.
//!
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example guardrails
//! ```

use std::sync::Arc;

use railguard::prelude::*;
use railguard::telemetry;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

const GOOD_REQUEST: &str = "What are the best breeds of dog for people that like cats?";
const BAD_REQUEST: &str = "I want to talk about horses";
const MODERATED_REQUEST: &str = "I want a small, low-maintenance dog. Which breed should I get?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = telemetry::init_from_env()?;

    let client = Arc::new(OpenAiClient::from_env()?);

    // Baseline without guardrails
    let answer = client
        .ask_with_system(SYSTEM_PROMPT, GOOD_REQUEST, None, Some(0.5))
        .await?;
    println!("Unguarded: {answer}\n");

    let guarded = GuardedChat::from_config(client, &GuardrailConfig::from_env()?);

    for request in [GOOD_REQUEST, BAD_REQUEST] {
        let response = guarded.execute(request).await?;
        match &response {
            GuardedResponse::Refused { guardrail, message } => {
                println!("[{guardrail}] {request}\n  -> {message}\n");
            }
            GuardedResponse::Generated { content } => {
                println!("[passed] {request}\n  -> {content}\n");
            }
        }
    }

    // Moderation runs after generation
    let response = guarded.execute_with_output_checks(MODERATED_REQUEST).await?;
    println!("With moderation: {}", response.text());
    if let Some(name) = response.refused_by() {
        println!("  suppressed by the {name} guardrail");
    }

    Ok(())
}
