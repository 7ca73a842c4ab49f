use std::collections::{HashMap, VecDeque};
use wander_protocol::Language;

/// One recorded query. Timestamps are deliberately absent; the store only
/// needs relative ordering, which the rolling window already provides.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    pub query: String,
    pub duration_ms: u64,
    pub result_count: usize,
    pub language: Language,
    pub used_filters: bool,
}

/// Aggregates over the current window.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateMetrics {
    pub total_queries: usize,
    pub average_duration_ms: f64,
    pub average_result_count: f64,
    pub filter_usage_rate: f64,
    /// Most frequent queries first; count ties break on the query text so
    /// the ordering is reproducible.
    pub popular_queries: Vec<(String, usize)>,
}

/// Caller-owned, in-memory query-metrics store with a bounded rolling
/// window. The engine itself never records into one implicitly.
#[derive(Debug)]
pub struct MetricsStore {
    window: VecDeque<QueryRecord>,
    capacity: usize,
    frequency: HashMap<String, usize>,
}

const POPULAR_QUERIES_LIMIT: usize = 10;

impl MetricsStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            frequency: HashMap::new(),
        }
    }

    pub fn record(&mut self, record: QueryRecord) {
        *self.frequency.entry(record.query.clone()).or_insert(0) += 1;
        self.window.push_back(record);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    #[must_use]
    pub fn aggregate(&self) -> AggregateMetrics {
        let total = self.window.len();
        if total == 0 {
            return AggregateMetrics {
                total_queries: 0,
                average_duration_ms: 0.0,
                average_result_count: 0.0,
                filter_usage_rate: 0.0,
                popular_queries: Vec::new(),
            };
        }

        let duration_sum: u64 = self.window.iter().map(|r| r.duration_ms).sum();
        let result_sum: usize = self.window.iter().map(|r| r.result_count).sum();
        let filtered = self.window.iter().filter(|r| r.used_filters).count();

        let mut popular: Vec<(String, usize)> = self
            .frequency
            .iter()
            .map(|(query, count)| (query.clone(), *count))
            .collect();
        popular.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        popular.truncate(POPULAR_QUERIES_LIMIT);

        AggregateMetrics {
            total_queries: total,
            average_duration_ms: duration_sum as f64 / total as f64,
            average_result_count: result_sum as f64 / total as f64,
            filter_usage_rate: filtered as f64 / total as f64,
            popular_queries: popular,
        }
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(query: &str, duration_ms: u64, results: usize, filtered: bool) -> QueryRecord {
        QueryRecord {
            query: query.to_string(),
            duration_ms,
            result_count: results,
            language: Language::Th,
            used_filters: filtered,
        }
    }

    #[test]
    fn window_is_bounded() {
        let mut store = MetricsStore::new(3);
        for i in 0..10 {
            store.record(record(&format!("q{i}"), 1, 1, false));
        }
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn aggregates_average_and_rate() {
        let mut store = MetricsStore::default();
        store.record(record("เชียงใหม่", 10, 4, true));
        store.record(record("กระบี่", 30, 2, false));

        let agg = store.aggregate();
        assert_eq!(agg.total_queries, 2);
        assert!((agg.average_duration_ms - 20.0).abs() < 1e-9);
        assert!((agg.average_result_count - 3.0).abs() < 1e-9);
        assert!((agg.filter_usage_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn popular_queries_order_by_count_then_text() {
        let mut store = MetricsStore::default();
        store.record(record("b", 1, 0, false));
        store.record(record("a", 1, 0, false));
        store.record(record("b", 1, 0, false));

        let agg = store.aggregate();
        assert_eq!(
            agg.popular_queries,
            vec![("b".to_string(), 2), ("a".to_string(), 1)]
        );
    }

    #[test]
    fn empty_store_aggregates_to_zeroes() {
        let agg = MetricsStore::default().aggregate();
        assert_eq!(agg.total_queries, 0);
        assert!(agg.popular_queries.is_empty());
    }
}
