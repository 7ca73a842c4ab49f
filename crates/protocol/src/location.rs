use serde::{Deserialize, Serialize};

/// Gazetteer entry for a point of interest or area.
///
/// Static read-only reference data; the popularity score is pre-normalized
/// to [0,1] by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_local: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub province: String,
    /// North, Central, South, Northeast.
    pub region: String,
    /// Beach, Mountain, Temple, Market, ...
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub geo: GeoPoint,
    pub popularity_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    /// Display name in the requested local script when available.
    pub fn display_name(&self, local: bool) -> &str {
        if local {
            self.name_local.as_deref().unwrap_or(&self.name)
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Expansion payload attached to a canonical location name in the
/// gazetteer's query-expansion table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationExpansion {
    #[serde(default)]
    pub popular_places: Vec<String>,
    #[serde(default)]
    pub common_tags: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub nearby_provinces: Vec<String>,
}
