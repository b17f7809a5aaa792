//! Weaviate generative search client

pub mod client;
pub mod config;
pub mod graphql;

pub use client::WeaviateClient;
pub use config::WeaviateConfig;
