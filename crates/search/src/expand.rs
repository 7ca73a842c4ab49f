use wander_corpus::Gazetteer;

/// Query expander backed by the location gazetteer.
///
/// A query that names an area ("เชียงใหม่") is widened with that area's
/// popular places and common tags so matching catches posts that never
/// mention the area by name. Recall goes up, precision can go down; that
/// trade-off is deliberate.
pub struct QueryExpander<'g> {
    gazetteer: &'g Gazetteer,
}

impl<'g> QueryExpander<'g> {
    pub fn new(gazetteer: &'g Gazetteer) -> Self {
        Self { gazetteer }
    }

    /// Expand a query into a deduplicated term list. The original query is
    /// always the first element. Every gazetteer entry whose canonical name
    /// or alias contains the query (case-insensitively) contributes its
    /// popular places and common tags, in gazetteer key order.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut expanded = vec![query.to_string()];
        if query.is_empty() {
            // An empty needle is a substring of everything; expanding it
            // would union the whole gazetteer. Callers are expected to
            // short-circuit before searching on empty input anyway.
            return expanded;
        }
        let needle = query.to_lowercase();

        for (name, expansion) in self.gazetteer.expansions() {
            let hit = name.to_lowercase().contains(&needle)
                || expansion
                    .aliases
                    .iter()
                    .any(|alias| alias.to_lowercase().contains(&needle));
            if !hit {
                continue;
            }
            for term in expansion
                .popular_places
                .iter()
                .chain(expansion.common_tags.iter())
            {
                if !expanded.contains(term) {
                    expanded.push(term.clone());
                }
            }
        }

        expanded
    }

    /// Expanded terms joined into the single pattern string handed to the
    /// fuzzy matcher.
    pub fn expand_to_query(&self, query: &str) -> String {
        self.expand(query).join(" ")
    }
}
