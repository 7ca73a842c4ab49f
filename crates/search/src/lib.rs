mod config;
mod engine;
mod error;
mod expand;
mod fuzzy;
mod highlight;
mod metrics;
mod rank;
mod related;
mod score;

pub use config::{
    FuzzyConfig, LocationMatchConfig, PopularityConfig, PostMatchConfig, RankingWeights,
    RecencyConfig, RelatedConfig, SearchConfig,
};
pub use engine::DiscoveryEngine;
pub use error::{Result, SearchError};
pub use expand::QueryExpander;
pub use fuzzy::{FuzzyMatch, FuzzyMatcher, MatchSpan};
pub use highlight::highlight;
pub use metrics::{AggregateMetrics, MetricsStore, QueryRecord};
pub use rank::{rank, RankedPage};
pub use related::RelatedFinder;
pub use score::{
    build_metrics, combine_scores, popularity_score, recency_score, relevance_score,
    KeywordOverlapScorer, SimilarityScorer,
};
