//! Payloads of the legacy `/stats/*` endpoints (camelCase on the wire)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complaint count of one (zone, category) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCategoryCount {
    pub zone: String,
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyStats {
    #[serde(default)]
    pub counts: Vec<ZoneCategoryCount>,
}

impl FrequencyStats {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCategoryTrend {
    pub zone: String,
    pub category: String,
    pub percentage_change: f64,
}

/// Response of `/stats/trends`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendStats {
    #[serde(default)]
    pub trends: Vec<ZoneCategoryTrend>,
}

/// Commune with its complaint count and map position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneStats {
    pub commune: String,
    #[serde(default)]
    pub total_plaintes: u64,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

/// Response of `/stats/communes`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommuneStatsResponse {
    #[serde(default)]
    pub communes: Vec<CommuneStats>,
}

/// One bucket of `/stats/horaire`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoraireStats {
    pub tranche_horaire: String,
    #[serde(default)]
    pub total_plaintes: u64,
}

/// Response of `/stats/dashboard`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDashboard {
    #[serde(default)]
    pub frequency: FrequencyStats,
    #[serde(default)]
    pub previous_total: u64,
    #[serde(default)]
    pub trends: TrendStats,
    /// Top communes, row shape varies between backend versions
    #[serde(default)]
    pub communes: Vec<Value>,
    /// Resolution rows, normalized by the client
    #[serde(default)]
    pub resolution: Vec<Value>,
    #[serde(default)]
    pub horaire: Vec<HoraireStats>,
    #[serde(default)]
    pub average_priority: Option<f64>,
    #[serde(default)]
    pub critical_complaints: Option<u64>,
}
