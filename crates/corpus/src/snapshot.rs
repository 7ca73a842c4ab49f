use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use wander_protocol::Post;

pub const CORPUS_SCHEMA_VERSION: u32 = 1;

/// Read-only snapshot of the post corpus.
///
/// Loaded once at process start; a query never observes a partially
/// refreshed snapshot because refresh produces a new value.
#[derive(Debug, Clone, Default)]
pub struct CorpusSnapshot {
    posts: Vec<Post>,
    by_id: HashMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedCorpus {
    schema_version: u32,
    posts: Vec<Post>,
}

impl CorpusSnapshot {
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let by_id = posts
            .iter()
            .enumerate()
            .map(|(idx, post)| (post.id.clone(), idx))
            .collect();
        Self { posts, by_id }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let persisted: PersistedCorpus = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != CORPUS_SCHEMA_VERSION {
            return Err(CorpusError::UnsupportedSchema {
                expected: CORPUS_SCHEMA_VERSION,
                actual: persisted.schema_version,
            });
        }
        log::debug!(
            "Loaded corpus snapshot: {} posts from {}",
            persisted.posts.len(),
            path.as_ref().display()
        );
        Ok(Self::from_posts(persisted.posts))
    }

    #[must_use]
    pub fn post(&self, id: &str) -> Option<&Post> {
        self.by_id.get(id).map(|&idx| &self.posts[idx])
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "author": {"id": "u1", "name": "Mint"},
            "caption": "caption"
        }))
        .unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let snapshot = CorpusSnapshot::from_posts(vec![post("a"), post("b")]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.post("b").map(|p| p.id.as_str()), Some("b"));
        assert!(snapshot.post("missing").is_none());
    }

    #[test]
    fn load_rejects_unknown_schema() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("corpus.json");
        std::fs::write(&path, r#"{"schemaVersion": 99, "posts": []}"#).unwrap();

        let err = CorpusSnapshot::load(&path).unwrap_err();
        assert!(matches!(err, CorpusError::UnsupportedSchema { actual: 99, .. }));
    }

    #[test]
    fn load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("corpus.json");
        let doc = serde_json::json!({
            "schemaVersion": 1,
            "posts": [
                {"id": "p1", "author": {"id": "u1", "name": "Mint"}, "caption": "เที่ยวเหนือ"}
            ]
        });
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let snapshot = CorpusSnapshot::load(&path).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.post("p1").is_some());
    }
}
