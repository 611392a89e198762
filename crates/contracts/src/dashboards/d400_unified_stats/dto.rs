use serde::{Deserialize, Serialize};

/// Aggregate snapshot returned by `/debug/global-stats`.
///
/// Field names follow the wire format of the unified endpoint. An instance
/// is never patched after it is received: every fetch yields a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_plaintes: u64,
    #[serde(default)]
    pub total_resolues: u64,
    /// Global resolution rate, percent
    #[serde(default)]
    pub taux_resolution_global: f64,
    /// Communes ranked by complaint count (backend order)
    #[serde(default)]
    pub top_communes: Vec<CommuneTotal>,
    /// Resolution rate per (commune, category)
    #[serde(default)]
    pub resolution_data: Vec<ResolutionRow>,
    #[serde(default)]
    pub average_priority: f64,
    #[serde(default)]
    pub critical_complaints: u64,
    #[serde(default)]
    pub zones_count: u64,
    #[serde(default)]
    pub categories_count: u64,
    /// Backend computation timestamp, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_status: Option<String>,
}

/// Complaint count of a single commune
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneTotal {
    pub commune: String,
    pub total: u64,
}

impl CommuneTotal {
    pub fn new(commune: impl Into<String>, total: u64) -> Self {
        Self {
            commune: commune.into(),
            total,
        }
    }
}

/// Resolution figures of one (commune, category) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRow {
    pub commune: String,
    pub categorie: String,
    pub total_plaintes: u64,
    pub resolue_plaintes: u64,
    /// Percent, 0..=100
    pub taux_resolution: f64,
}
