use crate::config::{PopularityConfig, RankingWeights, RecencyConfig};
use chrono::{DateTime, Utc};
use wander_protocol::{Post, SearchMetrics};

/// Relevance from a fuzzy-match distance (0 = perfect match).
#[must_use]
pub fn relevance_score(match_distance: f32) -> f32 {
    (1.0 - match_distance).clamp(0.0, 1.0)
}

/// Engagement-normalized popularity: `min((likes + α·comments) / max, 1)`.
#[must_use]
pub fn popularity_score(post: &Post, config: &PopularityConfig) -> f32 {
    let raw = post.counters.likes as f32 + config.comment_alpha * post.counters.comments as f32;
    (raw / config.max_engagement).min(1.0)
}

/// Exponential recency decay: `exp(-age_days / τ)`.
///
/// Recomputed on every call against the supplied clock, never cached. A post
/// without a usable timestamp scores 0; a post from the future clamps to 1.
#[must_use]
pub fn recency_score(post: &Post, now: DateTime<Utc>, config: &RecencyConfig) -> f32 {
    let Some(created_at) = post.created_at else {
        return 0.0;
    };
    let age_days = (now - created_at).num_seconds() as f32 / 86_400.0;
    (-age_days.max(0.0) / config.tau_days).exp().clamp(0.0, 1.0)
}

/// Swappable semantic-similarity signal.
///
/// The production implementation is a keyword-overlap proxy; an
/// embedding-based scorer can replace it as long as it keeps the [0,1]
/// pure-function contract.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, post: &Post, query: &str, expanded_terms: &[String]) -> f32;
}

/// Keyword-overlap stand-in for embedding similarity: the fraction of
/// expanded terms found as case-insensitive substrings of the post's
/// caption, tags, and location name.
#[derive(Debug, Default)]
pub struct KeywordOverlapScorer;

impl SimilarityScorer for KeywordOverlapScorer {
    fn score(&self, post: &Post, _query: &str, expanded_terms: &[String]) -> f32 {
        if expanded_terms.is_empty() {
            return 0.0;
        }

        let mut content = post.caption.to_lowercase();
        content.push(' ');
        for tag in &post.tags {
            content.push_str(&tag.to_lowercase());
            content.push(' ');
        }
        if let Some(location) = &post.location {
            content.push_str(&location.name.to_lowercase());
        }

        let matches = expanded_terms
            .iter()
            .filter(|term| !term.is_empty() && content.contains(&term.to_lowercase()))
            .count();

        (matches as f32 / expanded_terms.len() as f32).min(1.0)
    }
}

/// Weighted combination of the four subscores. Inputs are clamped to [0,1]
/// first, so with weights summing to 1.0 the result stays in [0,1].
#[must_use]
pub fn combine_scores(
    relevance: f32,
    popularity: f32,
    recency: f32,
    semantic: f32,
    weights: &RankingWeights,
) -> f32 {
    weights.semantic * semantic.clamp(0.0, 1.0)
        + weights.popularity * popularity.clamp(0.0, 1.0)
        + weights.recency * recency.clamp(0.0, 1.0)
        + weights.relevance * relevance.clamp(0.0, 1.0)
}

/// Assemble the full per-candidate metrics block.
#[must_use]
pub fn build_metrics(
    relevance: f32,
    popularity: f32,
    recency: f32,
    semantic: f32,
    weights: &RankingWeights,
) -> SearchMetrics {
    SearchMetrics {
        relevance_score: relevance,
        popularity_score: popularity,
        recency_score: recency,
        semantic_score: semantic,
        final_score: combine_scores(relevance, popularity, recency, semantic, weights),
    }
}
