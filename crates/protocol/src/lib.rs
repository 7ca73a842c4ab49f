mod location;
mod post;
mod search;

pub use location::{GeoPoint, Location, LocationExpansion};
pub use post::{
    Author, Engagement, GeoTag, Language, MediaDims, MediaItem, MediaKind, Post, PostLocation,
};
pub use search::{
    SearchFilters, SearchMetrics, SearchQuery, SearchResponse, SearchResult, Suggestion,
    SuggestionKind,
};
