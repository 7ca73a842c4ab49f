use crate::error::{CorpusError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use wander_protocol::{Location, LocationExpansion};

pub const GAZETTEER_SCHEMA_VERSION: u32 = 1;

const BUILTIN_GAZETTEER: &str = include_str!("../data/gazetteer.json");

static BUILTIN: Lazy<Gazetteer> = Lazy::new(|| {
    Gazetteer::from_json_str(BUILTIN_GAZETTEER).expect("builtin gazetteer data must parse")
});

/// Static location knowledge base: the point-of-interest list plus the
/// query-expansion table (canonical name → popular places / common tags).
///
/// Expansions live in a `BTreeMap` so iteration order, and therefore the
/// order of expanded terms, is deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    locations: Vec<Location>,
    by_id: HashMap<String, usize>,
    expansions: BTreeMap<String, LocationExpansion>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedGazetteer {
    schema_version: u32,
    locations: Vec<Location>,
    #[serde(default)]
    expansions: BTreeMap<String, LocationExpansion>,
}

impl Gazetteer {
    /// The dataset compiled into the binary. Covers the major provinces and
    /// is the default when no override file is supplied.
    #[must_use]
    pub fn builtin() -> &'static Gazetteer {
        &BUILTIN
    }

    pub fn new(
        locations: Vec<Location>,
        expansions: BTreeMap<String, LocationExpansion>,
    ) -> Self {
        let by_id = locations
            .iter()
            .enumerate()
            .map(|(idx, location)| (location.id.clone(), idx))
            .collect();
        Self {
            locations,
            by_id,
            expansions,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let persisted: PersistedGazetteer = serde_json::from_str(raw)?;
        if persisted.schema_version != GAZETTEER_SCHEMA_VERSION {
            return Err(CorpusError::UnsupportedSchema {
                expected: GAZETTEER_SCHEMA_VERSION,
                actual: persisted.schema_version,
            });
        }
        Ok(Self::new(persisted.locations, persisted.expansions))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let gazetteer = Self::from_json_str(&raw)?;
        log::debug!(
            "Loaded gazetteer: {} locations, {} expansion entries from {}",
            gazetteer.locations.len(),
            gazetteer.expansions.len(),
            path.as_ref().display()
        );
        Ok(gazetteer)
    }

    #[must_use]
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.by_id.get(id).map(|&idx| &self.locations[idx])
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Expansion entries in deterministic (key-sorted) order.
    pub fn expansions(&self) -> impl Iterator<Item = (&str, &LocationExpansion)> {
        self.expansions
            .iter()
            .map(|(name, expansion)| (name.as_str(), expansion))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.expansions.is_empty()
    }
}
