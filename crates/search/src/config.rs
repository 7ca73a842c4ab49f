use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Ranking weight for each scoring signal. Weights must sum to 1.0
/// (±0.05 tolerance, checked by [`SearchConfig::validate`]).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingWeights {
    pub semantic: f32,
    pub popularity: f32,
    pub recency: f32,
    pub relevance: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            semantic: 0.4,
            popularity: 0.3,
            recency: 0.2,
            relevance: 0.1,
        }
    }
}

/// Calibration constants for the engagement-based popularity signal.
/// These drift as the platform grows and need periodic recalibration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopularityConfig {
    /// Weight of a comment relative to a like.
    pub comment_alpha: f32,
    /// Engagement value that maps to a popularity score of 1.0.
    pub max_engagement: f32,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            comment_alpha: 2.0,
            max_engagement: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecencyConfig {
    /// Exponential decay constant, in days.
    pub tau_days: f32,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self { tau_days: 30.0 }
    }
}

/// Field weights and acceptance threshold for fuzzy-matching posts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMatchConfig {
    pub caption: f32,
    pub tags: f32,
    pub location_name: f32,
    pub location_local_name: f32,
    pub author_name: f32,
    /// Candidates with a normalized distance above this are dropped.
    pub threshold: f32,
    /// Matched spans shorter than this many characters are discarded.
    pub min_match_chars: usize,
}

impl Default for PostMatchConfig {
    fn default() -> Self {
        Self {
            caption: 0.4,
            tags: 0.3,
            location_name: 0.2,
            location_local_name: 0.2,
            author_name: 0.1,
            threshold: 0.4,
            min_match_chars: 2,
        }
    }
}

/// Field weights and acceptance threshold for fuzzy-matching gazetteer
/// locations (location search and autocomplete).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationMatchConfig {
    pub name: f32,
    pub local_name: f32,
    pub aliases: f32,
    pub tags: f32,
    pub province: f32,
    pub threshold: f32,
    pub min_match_chars: usize,
}

impl Default for LocationMatchConfig {
    fn default() -> Self {
        Self {
            name: 0.3,
            local_name: 0.3,
            aliases: 0.2,
            tags: 0.1,
            province: 0.1,
            threshold: 0.3,
            min_match_chars: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FuzzyConfig {
    pub posts: PostMatchConfig,
    pub locations: LocationMatchConfig,
}

/// Related-item lookup parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelatedConfig {
    pub max_results: usize,
    /// Candidates whose *base* similarity falls below this are dropped;
    /// a score exactly equal to the threshold passes.
    pub min_similarity_threshold: f32,
    pub weight_by_popularity: bool,
    pub weight_by_recency: bool,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            max_results: 4,
            min_similarity_threshold: 0.3,
            weight_by_popularity: true,
            weight_by_recency: true,
        }
    }
}

/// The whole tuning surface of the engine, deserializable from a JSON
/// document so weights can change without code changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    pub weights: RankingWeights,
    pub popularity: PopularityConfig,
    pub recency: RecencyConfig,
    pub fuzzy: FuzzyConfig,
    pub related: RelatedConfig,
    /// Page size when the request does not specify one.
    pub default_limit: usize,
    /// Upper bound on how many fuzzy candidates get the full scoring
    /// treatment per query.
    pub candidate_pool_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            popularity: PopularityConfig::default(),
            recency: RecencyConfig::default(),
            fuzzy: FuzzyConfig::default(),
            related: RelatedConfig::default(),
            default_limit: 20,
            candidate_pool_cap: 50,
        }
    }
}

impl SearchConfig {
    /// Load a configuration override from a JSON file. Missing fields fall
    /// back to the defaults; the merged document is validated before use.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read search config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse search config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.semantic
            + self.weights.popularity
            + self.weights.recency
            + self.weights.relevance;
        if (sum - 1.0).abs() > 0.05 {
            bail!("ranking weights must sum to 1.0 (±0.05), got {sum:.3}");
        }
        if self.popularity.max_engagement <= 0.0 {
            bail!("popularity.maxEngagement must be positive");
        }
        if self.recency.tau_days <= 0.0 {
            bail!("recency.tauDays must be positive");
        }
        for (name, threshold) in [
            ("fuzzy.posts.threshold", self.fuzzy.posts.threshold),
            ("fuzzy.locations.threshold", self.fuzzy.locations.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("{name} must be within [0, 1], got {threshold}");
            }
        }
        if self.default_limit == 0 {
            bail!("defaultLimit must be >= 1");
        }
        if self.related.min_similarity_threshold < 0.0 {
            bail!("related.minSimilarityThreshold must be >= 0");
        }
        Ok(())
    }
}
