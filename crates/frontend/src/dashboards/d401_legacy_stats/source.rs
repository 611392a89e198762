//! Global stats composed from the legacy `/stats/*` endpoints, for backends
//! that do not serve `/debug/global-stats` yet.

use async_trait::async_trait;
use chrono::Utc;
use contracts::dashboards::d400_unified_stats::{CommuneTotal, GlobalStats, ResolutionRow};
use contracts::dashboards::d401_legacy_stats::LegacyDashboard;
use contracts::shared::DateRange;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use super::api::{self, round_one_decimal};
use crate::dashboards::d400_unified_stats::StatsSource;
use crate::shared::api_utils::{ApiClient, ApiError};
use crate::shared::cancel::CancelToken;

/// `data_quality_status` of snapshots built by this source
pub const LEGACY_QUALITY_STATUS: &str = "LEGACY";

pub struct LegacySource {
    client: ApiClient,
}

impl LegacySource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatsSource for LegacySource {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn global_stats(
        &self,
        range: &DateRange,
        cancel: &CancelToken,
    ) -> Result<Value, ApiError> {
        let reference = range.to();
        let (dashboard, top_communes, resolution) = futures::try_join!(
            api::fetch_dashboard(&self.client, reference, cancel),
            api::fetch_top_communes(&self.client, reference, cancel),
            api::fetch_resolution(&self.client, range, cancel),
        )?;

        let stats = compose_global_stats(&dashboard, top_communes, resolution);
        serde_json::to_value(&stats).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Sum of the per-commune resolution totals
    async fn consistency_probe(
        &self,
        range: &DateRange,
        cancel: &CancelToken,
    ) -> Result<Value, ApiError> {
        let rows = api::fetch_resolution(&self.client, range, cancel).await?;
        let total: u64 = rows.iter().map(|r| r.total_plaintes).sum();
        Ok(json!(total))
    }
}

/// Build a unified snapshot out of the legacy payloads
pub fn compose_global_stats(
    dashboard: &LegacyDashboard,
    top_communes: Vec<CommuneTotal>,
    resolution: Vec<ResolutionRow>,
) -> GlobalStats {
    let total_resolues: u64 = resolution.iter().map(|r| r.resolue_plaintes).sum();
    let total_from_resolution: u64 = resolution.iter().map(|r| r.total_plaintes).sum();
    let taux_resolution_global = if total_from_resolution > 0 {
        round_one_decimal(total_resolues as f64 * 100.0 / total_from_resolution as f64)
    } else {
        0.0
    };

    let counts = &dashboard.frequency.counts;
    let zones: BTreeSet<&str> = counts.iter().map(|c| c.zone.as_str()).collect();
    let categories: BTreeSet<&str> = counts.iter().map(|c| c.category.as_str()).collect();

    GlobalStats {
        total_plaintes: dashboard.frequency.total(),
        total_resolues,
        taux_resolution_global,
        top_communes,
        resolution_data: resolution,
        average_priority: dashboard.average_priority.unwrap_or(0.0),
        critical_complaints: dashboard.critical_complaints.unwrap_or(0),
        zones_count: zones.len() as u64,
        categories_count: categories.len() as u64,
        calculated_at: Some(Utc::now().to_rfc3339()),
        data_quality_status: Some(LEGACY_QUALITY_STATUS.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d401_legacy_stats::{FrequencyStats, ZoneCategoryCount};

    fn count(zone: &str, category: &str, count: u64) -> ZoneCategoryCount {
        ZoneCategoryCount {
            zone: zone.to_string(),
            category: category.to_string(),
            count,
        }
    }

    fn row(commune: &str, total: u64, resolved: u64) -> ResolutionRow {
        ResolutionRow {
            commune: commune.to_string(),
            categorie: "Voirie".to_string(),
            total_plaintes: total,
            resolue_plaintes: resolved,
            taux_resolution: resolved as f64 * 100.0 / total as f64,
        }
    }

    #[test]
    fn test_compose_global_stats() {
        let dashboard = LegacyDashboard {
            frequency: FrequencyStats {
                counts: vec![
                    count("Agdal", "Voirie", 10),
                    count("Agdal", "Eclairage", 5),
                    count("Hassan", "Voirie", 4),
                ],
            },
            average_priority: Some(2.5),
            critical_complaints: Some(3),
            ..LegacyDashboard::default()
        };

        let stats = compose_global_stats(
            &dashboard,
            vec![CommuneTotal::new("Agdal", 15)],
            vec![row("Agdal", 10, 7), row("Hassan", 5, 1)],
        );

        assert_eq!(stats.total_plaintes, 19);
        assert_eq!(stats.total_resolues, 8);
        assert_eq!(stats.taux_resolution_global, 53.3);
        assert_eq!(stats.zones_count, 2);
        assert_eq!(stats.categories_count, 2);
        assert_eq!(stats.average_priority, 2.5);
        assert_eq!(stats.critical_complaints, 3);
        assert_eq!(stats.data_quality_status.as_deref(), Some("LEGACY"));
    }

    #[test]
    fn test_compose_without_resolution_rows() {
        let stats = compose_global_stats(&LegacyDashboard::default(), vec![], vec![]);
        assert_eq!(stats.total_plaintes, 0);
        assert_eq!(stats.taux_resolution_global, 0.0);
        assert!(stats.top_communes.is_empty());
    }
}
