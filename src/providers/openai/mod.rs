//! OpenAI chat completion client

pub mod client;
pub mod config;
pub mod errors;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
