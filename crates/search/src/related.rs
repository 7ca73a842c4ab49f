use crate::config::{RelatedConfig, SearchConfig};
use crate::score::{popularity_score, recency_score};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use wander_corpus::{CorpusSnapshot, Gazetteer};
use wander_protocol::{Post, SearchMetrics, SearchResult};

/// Related-item lookup: attribute-overlap similarity instead of query
/// matching. Reuses the popularity/recency signals as multiplicative
/// boosts on top of the base similarity.
pub struct RelatedFinder<'a> {
    corpus: &'a CorpusSnapshot,
    gazetteer: &'a Gazetteer,
    config: &'a SearchConfig,
}

impl<'a> RelatedFinder<'a> {
    pub fn new(corpus: &'a CorpusSnapshot, gazetteer: &'a Gazetteer, config: &'a SearchConfig) -> Self {
        Self {
            corpus,
            gazetteer,
            config,
        }
    }

    /// Find posts similar to `source`, scored at `now`.
    ///
    /// Candidates are kept when their *base* similarity (before the
    /// popularity/recency boosts) reaches the configured threshold; the
    /// boundary is inclusive. The source post itself is always excluded.
    pub fn find(&self, source: &Post, related: &RelatedConfig, now: DateTime<Utc>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .corpus
            .posts()
            .iter()
            .filter(|candidate| candidate.id != source.id && candidate.is_public)
            .filter_map(|candidate| {
                let (base, common_tags) = self.base_similarity(source, candidate);
                if base < related.min_similarity_threshold {
                    return None;
                }

                let popularity = popularity_score(candidate, &self.config.popularity);
                let recency = recency_score(candidate, now, &self.config.recency);

                let mut weighted = base;
                if related.weight_by_popularity {
                    weighted *= 1.0 + popularity * 0.2;
                }
                if related.weight_by_recency {
                    weighted *= 1.0 + recency * 0.1;
                }

                Some(SearchResult {
                    post: candidate.clone(),
                    search_metrics: SearchMetrics {
                        relevance_score: base.min(1.0),
                        popularity_score: popularity,
                        recency_score: recency,
                        semantic_score: 0.0,
                        final_score: weighted,
                    },
                    matched_terms: common_tags,
                    highlighted_caption: None,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.search_metrics
                .final_score
                .partial_cmp(&a.search_metrics.final_score)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(related.max_results);
        results
    }

    /// Base similarity in [0,1]: location bonus (same place 0.5, else same
    /// province 0.3) + 0.3·tag-overlap + 0.2 same author. Also returns the
    /// common tags for the match annotation.
    fn base_similarity(&self, source: &Post, candidate: &Post) -> (f32, Vec<String>) {
        let mut score = 0.0f32;

        if self.same_known_location(source, candidate) {
            score += 0.5;
        } else if let (Some(a), Some(b)) = (&candidate.location, &source.location) {
            if a.province == b.province {
                score += 0.3;
            }
        }

        let common_tags: Vec<String> = candidate
            .tags
            .iter()
            .filter(|tag| {
                let tag = tag.to_lowercase();
                source.tags.iter().any(|other| other.to_lowercase() == tag)
            })
            .cloned()
            .collect();
        let denom = candidate.tags.len().max(source.tags.len());
        if denom > 0 {
            score += 0.3 * common_tags.len() as f32 / denom as f32;
        }

        if candidate.author.id == source.author.id {
            score += 0.2;
        }

        (score, common_tags)
    }

    /// Same-location bonus applies only when both posts reference the same
    /// gazetteer entry *and* that entry actually exists; a dangling
    /// reference degrades to the province comparison instead of failing
    /// the query.
    fn same_known_location(&self, source: &Post, candidate: &Post) -> bool {
        match (&candidate.location_id, &source.location_id) {
            (Some(a), Some(b)) if a == b => {
                if self.gazetteer.location(a).is_none() {
                    log::warn!("post {} references unknown location {a}", candidate.id);
                    return false;
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, author: &str, location_id: Option<&str>, province: &str, tags: &[&str]) -> Post {
        let mut value = serde_json::json!({
            "id": id,
            "author": {"id": author, "name": author},
            "caption": format!("post {id}"),
            "tags": tags,
            "location": {"name": "somewhere", "province": province},
            "createdAt": "2026-07-20T08:00:00Z",
        });
        if let Some(lid) = location_id {
            value["locationId"] = serde_json::Value::String(lid.to_string());
        }
        serde_json::from_value(value).unwrap()
    }

    fn fixture() -> (CorpusSnapshot, SearchConfig) {
        let posts = vec![
            post("src", "u1", Some("cm-doi-suthep"), "Chiang Mai", &["วัด", "ทะเลหมอก"]),
            post("same-loc", "u2", Some("cm-doi-suthep"), "Chiang Mai", &["วัด"]),
            post("same-prov", "u3", Some("cm-nimman"), "Chiang Mai", &["คาเฟ่"]),
            post("far", "u4", Some("krabi-phi-phi"), "Krabi", &["ทะเล"]),
        ];
        (CorpusSnapshot::from_posts(posts), SearchConfig::default())
    }

    #[test]
    fn excludes_the_source_post() {
        let (corpus, config) = fixture();
        let finder = RelatedFinder::new(&corpus, Gazetteer::builtin(), &config);
        let source = corpus.post("src").unwrap().clone();

        let related = finder.find(
            &source,
            &RelatedConfig {
                min_similarity_threshold: 0.0,
                ..RelatedConfig::default()
            },
            Utc::now(),
        );
        assert!(related.iter().all(|r| r.post.id != "src"));
    }

    #[test]
    fn zero_overlap_passes_only_a_zero_threshold() {
        let (corpus, config) = fixture();
        let finder = RelatedFinder::new(&corpus, Gazetteer::builtin(), &config);
        let source = corpus.post("src").unwrap().clone();

        let inclusive = finder.find(
            &source,
            &RelatedConfig {
                min_similarity_threshold: 0.0,
                ..RelatedConfig::default()
            },
            Utc::now(),
        );
        assert!(inclusive.iter().any(|r| r.post.id == "far"));

        let strict = finder.find(
            &source,
            &RelatedConfig {
                min_similarity_threshold: 0.01,
                ..RelatedConfig::default()
            },
            Utc::now(),
        );
        assert!(strict.iter().all(|r| r.post.id != "far"));
    }

    #[test]
    fn same_location_outranks_same_province() {
        let (corpus, config) = fixture();
        let finder = RelatedFinder::new(&corpus, Gazetteer::builtin(), &config);
        let source = corpus.post("src").unwrap().clone();

        let related = finder.find(&source, &RelatedConfig::default(), Utc::now());
        assert_eq!(related[0].post.id, "same-loc");
        // Shared tag recorded as the matched terms.
        assert_eq!(related[0].matched_terms, vec!["วัด".to_string()]);
    }

    #[test]
    fn unknown_location_reference_degrades_to_province_bonus() {
        let posts = vec![
            post("src", "u1", Some("ghost-location"), "Chiang Mai", &[]),
            post("cand", "u2", Some("ghost-location"), "Chiang Mai", &[]),
        ];
        let corpus = CorpusSnapshot::from_posts(posts);
        let config = SearchConfig::default();
        let finder = RelatedFinder::new(&corpus, Gazetteer::builtin(), &config);
        let source = corpus.post("src").unwrap().clone();

        let related = finder.find(
            &source,
            &RelatedConfig {
                min_similarity_threshold: 0.0,
                weight_by_popularity: false,
                weight_by_recency: false,
                ..RelatedConfig::default()
            },
            Utc::now(),
        );
        // Province bonus (0.3) applies, same-location bonus (0.5) does not.
        assert_eq!(related.len(), 1);
        let base = related[0].search_metrics.relevance_score;
        assert!((base - 0.3).abs() < 1e-6, "got {base}");
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let posts = vec![
            post("src", "u1", None, "Chiang Mai", &[]),
            post("cand", "u2", None, "Chiang Mai", &[]),
        ];
        let corpus = CorpusSnapshot::from_posts(posts);
        let config = SearchConfig::default();
        let finder = RelatedFinder::new(&corpus, Gazetteer::builtin(), &config);
        let source = corpus.post("src").unwrap().clone();

        let related = finder.find(
            &source,
            &RelatedConfig {
                min_similarity_threshold: 0.3,
                weight_by_popularity: false,
                weight_by_recency: false,
                ..RelatedConfig::default()
            },
            Utc::now(),
        );
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].post.id, "cand");
    }
}
