//! Generative search walkthrough
//!
//! Queries a pre-populated `Articles` collection with per-record and grouped
//! generation.
//!
//! ```bash
//! export WEAVIATE_URL="https://your-cluster.weaviate.network"
//! export WEAVIATE_API_KEY="your-weaviate-key"
//! export OPENAI_API_KEY="your-openai-key"
//! cargo run --example generative_search
//! ```

use std::sync::Arc;

use railguard::prelude::*;
use railguard::search::grouped_summary;
use railguard::telemetry;

const COLLECTION: &str = "Articles";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = telemetry::init_from_env()?;

    let backend = Arc::new(WeaviateClient::from_env()?);
    let search = GenerativeSearch::new(backend);

    let records = search.per_item("football clubs", COLLECTION).await?;
    for record in &records {
        println!("{}", record.property_str("title").unwrap_or("<untitled>"));
        println!("  {}\n", record.single_result().unwrap_or("<no generation>"));
    }

    let records = search.grouped("football clubs", COLLECTION).await?;
    println!("Grouped over {} records:", records.len());
    println!("{}", grouped_summary(&records).unwrap_or("<no generation>"));

    Ok(())
}
