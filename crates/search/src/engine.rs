use crate::config::{RelatedConfig, SearchConfig};
use crate::error::{Result, SearchError};
use crate::expand::QueryExpander;
use crate::fuzzy::FuzzyMatcher;
use crate::highlight::highlight;
use crate::rank::rank;
use crate::related::RelatedFinder;
use crate::score::{
    build_metrics, popularity_score, recency_score, relevance_score, KeywordOverlapScorer,
    SimilarityScorer,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::time::Instant;
use wander_corpus::{geo, CorpusSnapshot, Gazetteer};
use wander_protocol::{
    Language, Location, Post, SearchFilters, SearchQuery, SearchResponse, SearchResult, Suggestion,
    SuggestionKind,
};

/// The contextual discovery engine: expansion → fuzzy matching → scoring →
/// ranking over an immutable corpus snapshot and gazetteer.
///
/// Every query is a stateless computation over `&self`; the engine can be
/// shared across threads behind an `Arc` without locks.
pub struct DiscoveryEngine {
    corpus: CorpusSnapshot,
    gazetteer: Gazetteer,
    config: SearchConfig,
    fuzzy: FuzzyMatcher,
    similarity: Box<dyn SimilarityScorer>,
}

impl std::fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryEngine").finish_non_exhaustive()
    }
}

impl DiscoveryEngine {
    /// Build an engine over a loaded corpus and gazetteer. Both collaborators
    /// are injected here so the engine is testable with fixtures; an empty
    /// collaborator means the startup loading step failed and is fatal.
    pub fn new(corpus: CorpusSnapshot, gazetteer: Gazetteer, config: SearchConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SearchError::CorpusUnavailable(
                "corpus snapshot holds no posts".to_string(),
            ));
        }
        if gazetteer.is_empty() {
            return Err(SearchError::CorpusUnavailable(
                "gazetteer holds no locations or expansions".to_string(),
            ));
        }
        let fuzzy = FuzzyMatcher::new(config.fuzzy);
        Ok(Self {
            corpus,
            gazetteer,
            config,
            fuzzy,
            similarity: Box::new(KeywordOverlapScorer),
        })
    }

    /// Swap the semantic-similarity implementation (e.g. for an
    /// embedding-backed scorer). The rest of the pipeline is untouched.
    #[must_use]
    pub fn with_similarity(mut self, similarity: Box<dyn SimilarityScorer>) -> Self {
        self.similarity = similarity;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn corpus(&self) -> &CorpusSnapshot {
        &self.corpus
    }

    #[must_use]
    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Run a search against the wall clock.
    pub fn search(&self, request: &SearchQuery) -> Result<SearchResponse> {
        self.search_at(request, Utc::now())
    }

    /// Run a search with an explicit clock. Identical inputs (request,
    /// snapshot, `now`) reproduce identical output.
    pub fn search_at(&self, request: &SearchQuery, now: DateTime<Utc>) -> Result<SearchResponse> {
        let started = Instant::now();

        let trimmed = request.query.trim();
        if trimmed.is_empty() {
            log::debug!("blank query; returning the empty result set");
            return Ok(SearchResponse {
                results: Vec::new(),
                total_count: 0,
                query: trimmed.to_string(),
                processing_time_ms: started.elapsed().as_millis() as u64,
                expanded_terms: Vec::new(),
            });
        }

        let limit = request.limit.unwrap_or(self.config.default_limit);
        if limit == 0 {
            return Err(SearchError::InvalidLimit(limit));
        }

        let expander = QueryExpander::new(&self.gazetteer);
        let expanded = expander.expand(trimmed);
        let pattern = expanded.join(" ");
        log::debug!("query '{trimmed}' expanded to {} terms", expanded.len());

        let mut matches = self.fuzzy.match_posts(&pattern, self.corpus.posts());
        log::debug!("fuzzy matching produced {} candidates", matches.len());

        matches.retain(|hit| {
            let post = &self.corpus.posts()[hit.index];
            post.is_public
                && request
                    .filters
                    .as_ref()
                    .map_or(true, |filters| self.passes_filters(post, filters))
        });
        let total_count = matches.len();

        // Closest matches get the full scoring treatment; the tail beyond
        // the candidate pool only counts toward totalCount.
        matches.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        matches.truncate((limit.saturating_mul(2)).min(self.config.candidate_pool_cap));

        let mut candidates = Vec::with_capacity(matches.len());
        for hit in matches {
            let post = &self.corpus.posts()[hit.index];

            let relevance = relevance_score(hit.distance);
            let popularity = popularity_score(post, &self.config.popularity);
            let recency = recency_score(post, now, &self.config.recency);
            let semantic = self.similarity.score(post, trimmed, &expanded);
            let metrics = build_metrics(relevance, popularity, recency, semantic, &self.config.weights);

            let mut matched_terms: Vec<String> = Vec::new();
            for span in &hit.spans {
                if !matched_terms.contains(&span.text) {
                    matched_terms.push(span.text.clone());
                }
            }
            let highlighted = highlight(&post.caption, &matched_terms);

            candidates.push(SearchResult {
                post: post.clone(),
                search_metrics: metrics,
                matched_terms,
                highlighted_caption: Some(highlighted),
            });
        }

        let page = rank(candidates, limit)?;
        let processing_time_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "search '{trimmed}': {} of {total_count} candidates returned in {processing_time_ms}ms",
            page.results.len(),
        );

        Ok(SearchResponse {
            results: page.results,
            total_count,
            query: trimmed.to_string(),
            processing_time_ms,
            expanded_terms: expanded,
        })
    }

    /// Related posts for a corpus post, using the configured defaults.
    pub fn related(&self, source_id: &str) -> Result<Vec<SearchResult>> {
        let defaults = self.config.related;
        self.related_with(source_id, &defaults)
    }

    pub fn related_with(&self, source_id: &str, related: &RelatedConfig) -> Result<Vec<SearchResult>> {
        self.related_with_at(source_id, related, Utc::now())
    }

    pub fn related_with_at(
        &self,
        source_id: &str,
        related: &RelatedConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchResult>> {
        let source = self
            .corpus
            .post(source_id)
            .ok_or_else(|| SearchError::UnknownPost(source_id.to_string()))?;
        let finder = RelatedFinder::new(&self.corpus, &self.gazetteer, &self.config);
        Ok(finder.find(source, related, now))
    }

    /// Fuzzy location lookup: closest matches first, then re-ordered by
    /// gazetteer popularity.
    pub fn search_locations(&self, query: &str, limit: usize) -> Vec<Location> {
        let trimmed = query.trim();
        if trimmed.is_empty() || limit == 0 {
            return Vec::new();
        }

        let expander = QueryExpander::new(&self.gazetteer);
        let pattern = expander.expand_to_query(trimmed);

        let mut matches = self.fuzzy.match_locations(&pattern, self.gazetteer.locations());
        matches.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        matches.truncate(limit);

        let mut locations: Vec<Location> = matches
            .into_iter()
            .map(|hit| self.gazetteer.locations()[hit.index].clone())
            .collect();
        locations.sort_by(|a, b| {
            b.popularity_score
                .partial_cmp(&a.popularity_score)
                .unwrap_or(Ordering::Equal)
        });
        locations
    }

    /// Autocomplete: lightweight suggestions over the raw prefix (no query
    /// expansion; keystrokes need the narrow interpretation).
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let trimmed = prefix.trim();
        if trimmed.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches = self.fuzzy.match_locations(trimmed, self.gazetteer.locations());
        matches.sort_by(|a, b| {
            let location_a = &self.gazetteer.locations()[a.index];
            let location_b = &self.gazetteer.locations()[b.index];
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    location_b
                        .popularity_score
                        .partial_cmp(&location_a.popularity_score)
                        .unwrap_or(Ordering::Equal)
                })
        });
        matches.truncate(limit);

        matches
            .into_iter()
            .map(|hit| {
                let location = &self.gazetteer.locations()[hit.index];
                Suggestion {
                    id: location.id.clone(),
                    kind: SuggestionKind::Place,
                    text: location.name.clone(),
                    description: location.description.clone(),
                    province: Some(location.province.clone()),
                    category: Some(location.category.clone()),
                    confidence: relevance_score(hit.distance),
                }
            })
            .collect()
    }

    /// Most popular gazetteer entries, rendered for the requested language.
    pub fn trending(&self, language: Language, limit: usize) -> Vec<String> {
        let mut locations: Vec<&Location> = self.gazetteer.locations().iter().collect();
        locations.sort_by(|a, b| {
            b.popularity_score
                .partial_cmp(&a.popularity_score)
                .unwrap_or(Ordering::Equal)
        });
        locations
            .into_iter()
            .take(limit)
            .map(|location| {
                location
                    .display_name(matches!(language, Language::Th))
                    .to_string()
            })
            .collect()
    }

    /// Locations strictly within `radius_km` of the given gazetteer entry,
    /// ascending by distance (km attached for presentation).
    pub fn nearby(
        &self,
        location_id: &str,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<(Location, f64)>> {
        let center = self
            .gazetteer
            .location(location_id)
            .ok_or_else(|| SearchError::UnknownLocation(location_id.to_string()))?;
        Ok(geo::nearby(self.gazetteer.locations(), center, radius_km, limit)
            .into_iter()
            .map(|(location, distance)| (location.clone(), distance))
            .collect())
    }

    fn passes_filters(&self, post: &Post, filters: &SearchFilters) -> bool {
        if filters.is_empty() {
            return true;
        }

        if !filters.provinces.is_empty() {
            let Some(location) = &post.location else {
                return false;
            };
            let province = location.province.to_lowercase();
            if !filters
                .provinces
                .iter()
                .any(|wanted| wanted.to_lowercase() == province)
            {
                return false;
            }
        }

        let entry = post
            .location_id
            .as_deref()
            .and_then(|id| self.gazetteer.location(id));

        if !filters.categories.is_empty() {
            let Some(entry) = entry else {
                // Membership cannot be established without a resolvable
                // location; the post fails the filter, not the query.
                log::debug!("post {} has no resolvable location for category filter", post.id);
                return false;
            };
            let category = entry.category.to_lowercase();
            if !filters
                .categories
                .iter()
                .any(|wanted| wanted.to_lowercase() == category)
            {
                return false;
            }
        }

        if !filters.amenities.is_empty() {
            let Some(entry) = entry else {
                return false;
            };
            let tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
            if !filters
                .amenities
                .iter()
                .all(|wanted| tags.contains(&wanted.to_lowercase()))
            {
                return false;
            }
        }

        if !filters.tags.is_empty() {
            let post_tags: Vec<String> = post.tags.iter().map(|t| t.to_lowercase()).collect();
            if !filters
                .tags
                .iter()
                .any(|wanted| post_tags.contains(&wanted.to_lowercase()))
            {
                return false;
            }
        }

        if let Some(wants_media) = filters.has_media {
            if post.has_media() != wants_media {
                return false;
            }
        }

        true
    }
}
