//! Generative search wrapper
//!
//! Formats a query into a near-text search with a generation instruction and
//! returns the unwrapped records.

use std::sync::Arc;

use crate::error::LlmError;
use crate::traits::GenerativeSearchCapability;
use crate::types::{GenerativeInstruction, NearText, SearchRecord, SearchRequest};

/// Per-record prompt; `{content}` is filled by the vector store.
pub const DEFAULT_SINGLE_PROMPT: &str = "Summarize in a short tweet the following content: {content}";

/// Task applied to the whole result set.
pub const DEFAULT_GROUPED_TASK: &str = "Explain what these have in common";

pub const DEFAULT_DISTANCE: f32 = 0.7;
pub const DEFAULT_LIMIT: u32 = 5;

/// Knobs shared by every query issued through [`GenerativeSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub properties: Vec<String>,
    pub distance: Option<f32>,
    pub limit: u32,
    pub single_prompt: String,
    pub grouped_task: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            properties: ["title", "content", "url"]
                .into_iter()
                .map(String::from)
                .collect(),
            distance: Some(DEFAULT_DISTANCE),
            limit: DEFAULT_LIMIT,
            single_prompt: DEFAULT_SINGLE_PROMPT.to_string(),
            grouped_task: DEFAULT_GROUPED_TASK.to_string(),
        }
    }
}

impl SearchSettings {
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub const fn with_distance(mut self, distance: Option<f32>) -> Self {
        self.distance = distance;
        self
    }

    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_single_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.single_prompt = prompt.into();
        self
    }

    pub fn with_grouped_task(mut self, task: impl Into<String>) -> Self {
        self.grouped_task = task.into();
        self
    }
}

#[derive(Clone)]
pub struct GenerativeSearch {
    backend: Arc<dyn GenerativeSearchCapability>,
    settings: SearchSettings,
}

impl GenerativeSearch {
    pub fn new(backend: Arc<dyn GenerativeSearchCapability>) -> Self {
        Self {
            backend,
            settings: SearchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Request for `query` against `collection` with the given generation.
    pub fn build_request(
        &self,
        query: &str,
        collection: &str,
        generate: GenerativeInstruction,
    ) -> SearchRequest {
        let mut near_text = NearText::new(query);
        near_text.distance = self.settings.distance;
        SearchRequest::new(collection, near_text)
            .with_properties(self.settings.properties.iter().cloned())
            .with_limit(self.settings.limit)
            .with_generate(generate)
    }

    /// Search and generate one result per record.
    pub async fn per_item(
        &self,
        query: &str,
        collection: &str,
    ) -> Result<Vec<SearchRecord>, LlmError> {
        let request = self.build_request(
            query,
            collection,
            GenerativeInstruction::SinglePrompt(self.settings.single_prompt.clone()),
        );
        self.backend.search(request).await
    }

    /// Search and generate one result for the whole set.
    pub async fn grouped(
        &self,
        query: &str,
        collection: &str,
    ) -> Result<Vec<SearchRecord>, LlmError> {
        let request = self.build_request(
            query,
            collection,
            GenerativeInstruction::GroupedTask(self.settings.grouped_task.clone()),
        );
        self.backend.search(request).await
    }
}

/// The grouped result carried by the first record that has one.
pub fn grouped_summary(records: &[SearchRecord]) -> Option<&str> {
    records.iter().find_map(SearchRecord::grouped_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Vec<SearchRequest>>,
    }

    #[async_trait]
    impl GenerativeSearchCapability for RecordingBackend {
        async fn search(&self, request: SearchRequest) -> Result<Vec<SearchRecord>, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn per_item_uses_default_prompt_and_limits() {
        let backend = Arc::new(RecordingBackend::default());
        let search = GenerativeSearch::new(backend.clone());
        search.per_item("football clubs", "Articles").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.collection, "Articles");
        assert_eq!(request.near_text.concepts, vec!["football clubs".to_string()]);
        assert_eq!(request.near_text.distance, Some(0.7));
        assert_eq!(request.limit, Some(5));
        assert_eq!(request.properties, vec!["title", "content", "url"]);
        assert_eq!(
            request.generate,
            Some(GenerativeInstruction::SinglePrompt(DEFAULT_SINGLE_PROMPT.into()))
        );
    }

    #[tokio::test]
    async fn grouped_uses_task_and_custom_settings() {
        let backend = Arc::new(RecordingBackend::default());
        let search = GenerativeSearch::new(backend.clone()).with_settings(
            SearchSettings::default()
                .with_limit(3)
                .with_distance(None)
                .with_grouped_task("Find the common theme"),
        );
        search.grouped("rivers", "Articles").await.unwrap();

        assert_eq!(search.settings().limit, 3);
        assert_eq!(search.settings().grouped_task, "Find the common theme");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].limit, Some(3));
        assert_eq!(seen[0].near_text.distance, None);
        assert_eq!(
            seen[0].generate,
            Some(GenerativeInstruction::GroupedTask("Find the common theme".into()))
        );
    }

    #[test]
    fn grouped_summary_finds_first_grouped_result() {
        use crate::types::GenerateResult;
        let records = vec![
            SearchRecord::default(),
            SearchRecord {
                generate: Some(GenerateResult {
                    grouped_result: Some("All are rivers.".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];
        assert_eq!(grouped_summary(&records), Some("All are rivers."));
    }
}
