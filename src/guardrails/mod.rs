//! Guardrails
//!
//! - **`dispatcher`** - `GuardedChat`: input guardrails raced against generation,
//!   output guardrails applied afterwards
//! - **`topical`** - on/off-topic classification of the request
//! - **`moderation`** - rubric scoring of the generated text
//! - **`prompts`** - classifier prompt templates
//! - **`config`** - `GuardrailConfig`

pub mod config;
pub mod dispatcher;
pub mod moderation;
pub mod prompts;
pub mod topical;

pub use config::GuardrailConfig;
pub use dispatcher::{GuardedChat, RacePolicy};
pub use moderation::{DEFAULT_MODERATION_THRESHOLD, ModerationGuardrail};
pub use prompts::ModerationRubric;
pub use topical::TopicalGuardrail;
