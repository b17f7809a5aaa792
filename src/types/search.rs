//! Generative vector-search types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Near-text query: concepts to embed plus a distance cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearText {
    pub concepts: Vec<String>,
    /// Maximum vector distance for a match. `None` disables the cutoff.
    pub distance: Option<f32>,
}

impl NearText {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concepts: vec![concept.into()],
            distance: None,
        }
    }

    pub const fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }
}

/// Generation attached to a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerativeInstruction {
    /// Prompt applied to each record; `{property}` placeholders are filled
    /// by the vector store from the record.
    SinglePrompt(String),
    /// One task applied to the whole result set.
    GroupedTask(String),
}

impl GenerativeInstruction {
    pub const fn is_grouped(&self) -> bool {
        matches!(self, Self::GroupedTask(_))
    }
}

/// A complete search request against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub collection: String,
    /// Properties returned for each record
    pub properties: Vec<String>,
    pub near_text: NearText,
    pub limit: Option<u32>,
    pub generate: Option<GenerativeInstruction>,
}

impl SearchRequest {
    pub fn new(collection: impl Into<String>, near_text: NearText) -> Self {
        Self {
            collection: collection.into(),
            properties: Vec::new(),
            near_text,
            limit: None,
            generate: None,
        }
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_generate(mut self, instruction: GenerativeInstruction) -> Self {
        self.generate = Some(instruction);
        self
    }
}

/// Generation output attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    #[serde(default)]
    pub single_result: Option<String>,
    /// Only present on the first record of a grouped generation.
    #[serde(default)]
    pub grouped_result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One record returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub properties: Map<String, Value>,
    pub generate: Option<GenerateResult>,
}

impl SearchRecord {
    /// String-valued property, if present.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    pub fn single_result(&self) -> Option<&str> {
        self.generate.as_ref()?.single_result.as_deref()
    }

    pub fn grouped_result(&self) -> Option<&str> {
        self.generate.as_ref()?.grouped_result.as_deref()
    }
}
