use crate::error::{Result, SearchError};
use std::cmp::Ordering;
use wander_protocol::SearchResult;

/// One page of ranked results plus the pre-truncation candidate count.
#[derive(Debug, Clone)]
pub struct RankedPage {
    pub results: Vec<SearchResult>,
    /// Candidates that went into the sort, before the page cut. UI result
    /// badges report this, not the page length.
    pub total_count: usize,
}

/// Sort scored candidates descending by final score and truncate to the
/// page size. The sort is stable: equal scores keep their input order, so
/// a fixed corpus snapshot always produces the same page.
pub fn rank(mut candidates: Vec<SearchResult>, limit: usize) -> Result<RankedPage> {
    if limit == 0 {
        return Err(SearchError::InvalidLimit(limit));
    }

    let total_count = candidates.len();
    candidates.sort_by(|a, b| {
        b.search_metrics
            .final_score
            .partial_cmp(&a.search_metrics.final_score)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(limit);

    Ok(RankedPage {
        results: candidates,
        total_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wander_protocol::{Post, SearchMetrics};

    fn result(id: &str, final_score: f32) -> SearchResult {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": id,
            "author": {"id": "u1", "name": "Mint"},
            "caption": "caption",
        }))
        .unwrap();
        SearchResult {
            post,
            search_metrics: SearchMetrics {
                relevance_score: 0.0,
                popularity_score: 0.0,
                recency_score: 0.0,
                semantic_score: 0.0,
                final_score,
            },
            matched_terms: Vec::new(),
            highlighted_caption: None,
        }
    }

    #[test]
    fn sorts_descending_and_truncates() {
        let page = rank(
            vec![result("low", 0.2), result("high", 0.9), result("mid", 0.5)],
            2,
        )
        .unwrap();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].post.id, "high");
        assert_eq!(page.results[1].post.id, "mid");
    }

    #[test]
    fn ties_preserve_input_order() {
        let page = rank(
            vec![
                result("first", 0.5),
                result("second", 0.5),
                result("third", 0.5),
            ],
            10,
        )
        .unwrap();

        let ids: Vec<&str> = page.results.iter().map(|r| r.post.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = rank(vec![result("a", 0.5)], 0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidLimit(0)));
    }

    #[test]
    fn total_count_survives_truncation() {
        let candidates: Vec<SearchResult> = (0..30)
            .map(|i| result(&format!("p{i}"), i as f32 / 30.0))
            .collect();
        let page = rank(candidates, 5).unwrap();
        assert_eq!(page.total_count, 30);
        assert_eq!(page.results.len(), 5);
    }
}
