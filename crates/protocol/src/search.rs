use serde::{Deserialize, Serialize};

use crate::post::{Language, Post};

/// Search request as received from the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Optional narrowing applied to scored candidates before ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub provinces: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_media: Option<bool>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
            && self.categories.is_empty()
            && self.amenities.is_empty()
            && self.tags.is_empty()
            && self.has_media.is_none()
    }
}

/// Per-candidate score breakdown. All subscores live in [0,1]; the final
/// score is the configured weighted sum. Computed fresh per query, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetrics {
    pub relevance_score: f32,
    pub popularity_score: f32,
    pub recency_score: f32,
    pub semantic_score: f32,
    pub final_score: f32,
}

/// A ranked post together with its score breakdown and match annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(flatten)]
    pub post: Post,
    pub search_metrics: SearchMetrics,
    pub matched_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// All candidates that survived matching and filtering, before the
    /// page truncation. UI "N results" badges depend on this.
    pub total_count: usize,
    pub query: String,
    pub processing_time_ms: u64,
    pub expanded_terms: Vec<String>,
}

/// Lightweight autocomplete entry derived from the gazetteer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Place,
    Province,
    Category,
    Tag,
    Phrase,
}
