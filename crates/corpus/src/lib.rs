mod error;
mod gazetteer;
pub mod geo;
mod snapshot;

pub use error::{CorpusError, Result};
pub use gazetteer::{Gazetteer, GAZETTEER_SCHEMA_VERSION};
pub use snapshot::{CorpusSnapshot, CORPUS_SCHEMA_VERSION};
