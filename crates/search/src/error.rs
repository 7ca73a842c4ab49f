use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Corpus error: {0}")]
    Corpus(#[from] wander_corpus::CorpusError),

    #[error("Invalid limit: {0} (must be >= 1)")]
    InvalidLimit(usize),

    #[error("Corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("Unknown post: {0}")]
    UnknownPost(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),
}
