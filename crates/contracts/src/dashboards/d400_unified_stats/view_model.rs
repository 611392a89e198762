use serde::{Deserialize, Serialize};
use std::fmt;

use super::dto::{CommuneTotal, ResolutionRow};

/// Page a view model is projected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Dashboard,
    Resolution,
    Stats,
    Geography,
    Complaints,
}

impl PageType {
    /// Length of the period a freshly mounted page loads
    pub fn default_days(self) -> i64 {
        match self {
            PageType::Dashboard => 7,
            PageType::Resolution
            | PageType::Stats
            | PageType::Geography
            | PageType::Complaints => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Dashboard => "dashboard",
            PageType::Resolution => "resolution",
            PageType::Stats => "stats",
            PageType::Geography => "geography",
            PageType::Complaints => "complaints",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields every page projection carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseView {
    pub total_plaintes: u64,
    pub total_resolues: u64,
    pub taux_resolution: f64,
    pub calculated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_plaintes: u64,
    pub total_resolues: u64,
    pub taux_resolution: f64,
    /// Delta vs previous period. Not computed upstream, always 0.
    pub nouveau_plaintes: i64,
    /// Growth vs previous period. Not computed upstream, always 0.
    pub taux_croissance: f64,
    pub zones_performantes: u64,
    pub total_plaintes_resolution: u64,
    pub moyenne_priorite: f64,
    pub plaintes_critiques: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(flatten)]
    pub base: BaseView,
    pub summary: DashboardSummary,
    pub top_communes: Vec<CommuneTotal>,
    pub resolution_data: Vec<ResolutionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub total_complaints: u64,
    pub resolved_complaints: u64,
    pub avg_resolution: f64,
    pub best_performer: Option<ResolutionRow>,
    pub worst_performer: Option<ResolutionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionView {
    #[serde(flatten)]
    pub base: BaseView,
    pub resolution_data: Vec<ResolutionRow>,
    pub summary_stats: ResolutionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_complaints: u64,
    pub avg_resolution_rate: f64,
    pub communes_count: u64,
    pub categories_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    #[serde(flatten)]
    pub base: BaseView,
    pub top_communes: Vec<CommuneTotal>,
    pub resolution_rows: Vec<ResolutionRow>,
    pub enhanced_summary: StatsSummary,
}

/// Page-specific projection of a `GlobalStats` snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewModel {
    Dashboard(DashboardView),
    Resolution(ResolutionView),
    Stats(StatsView),
    /// Pages without a dedicated projection (geography, complaints)
    Overview(BaseView),
}

impl ViewModel {
    pub fn base(&self) -> &BaseView {
        match self {
            ViewModel::Dashboard(view) => &view.base,
            ViewModel::Resolution(view) => &view.base,
            ViewModel::Stats(view) => &view.base,
            ViewModel::Overview(base) => base,
        }
    }

    pub fn as_dashboard(&self) -> Option<&DashboardView> {
        match self {
            ViewModel::Dashboard(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_resolution(&self) -> Option<&ResolutionView> {
        match self {
            ViewModel::Resolution(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_stats(&self) -> Option<&StatsView> {
        match self {
            ViewModel::Stats(view) => Some(view),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_days() {
        assert_eq!(PageType::Dashboard.default_days(), 7);
        assert_eq!(PageType::Resolution.default_days(), 30);
        assert_eq!(PageType::Stats.default_days(), 30);
        assert_eq!(PageType::Geography.default_days(), 30);
    }

    #[test]
    fn test_dashboard_view_serializes_flat_camel_case() {
        let base = BaseView {
            total_plaintes: 500,
            total_resolues: 420,
            taux_resolution: 84.0,
            calculated_at: None,
        };
        let view = ViewModel::Dashboard(DashboardView {
            base: base.clone(),
            summary: DashboardSummary {
                total_plaintes: 500,
                total_resolues: 420,
                taux_resolution: 84.0,
                nouveau_plaintes: 0,
                taux_croissance: 0.0,
                zones_performantes: 0,
                total_plaintes_resolution: 500,
                moyenne_priorite: 0.0,
                plaintes_critiques: 0,
            },
            top_communes: vec![CommuneTotal::new("Agdal", 120)],
            resolution_data: vec![],
        });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "dashboard");
        assert_eq!(json["totalPlaintes"], 500);
        assert_eq!(json["summary"]["tauxResolution"], 84.0);
        assert_eq!(json["topCommunes"][0]["commune"], "Agdal");
        assert_eq!(view.base(), &base);
    }
}
