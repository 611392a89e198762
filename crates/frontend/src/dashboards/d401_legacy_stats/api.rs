use chrono::{DateTime, Utc};
use contracts::dashboards::d400_unified_stats::{CommuneTotal, ResolutionRow};
use contracts::dashboards::d401_legacy_stats::{
    CommuneStats, CommuneStatsResponse, HoraireStats, LegacyDashboard, TrendStats,
};
use contracts::shared::DateRange;
use serde_json::Value;

use crate::dashboards::d400_unified_stats::normalizer::{parse_commune_total, parse_resolution_row};
use crate::shared::api_utils::{ApiClient, ApiError};
use crate::shared::cancel::CancelToken;
use crate::shared::date_utils::{to_iso_param, to_reference_date};

const API_BASE: &str = "/stats";

fn range_query(range: &DateRange) -> [(&'static str, String); 2] {
    [
        ("from", to_iso_param(range.from())),
        ("to", to_iso_param(range.to())),
    ]
}

/// Сводка дашборда на дату (`/stats/dashboard?referenceDate=`)
pub async fn fetch_dashboard(
    client: &ApiClient,
    reference_date: DateTime<Utc>,
    cancel: &CancelToken,
) -> Result<LegacyDashboard, ApiError> {
    let query = [("referenceDate", to_reference_date(reference_date))];
    client
        .get(&format!("{}/dashboard", API_BASE), &query, cancel)
        .await
}

pub async fn fetch_trends(
    client: &ApiClient,
    range: &DateRange,
    cancel: &CancelToken,
) -> Result<TrendStats, ApiError> {
    client
        .get(&format!("{}/trends", API_BASE), &range_query(range), cancel)
        .await
}

/// Commune map points since `since`
pub async fn fetch_communes(
    client: &ApiClient,
    since: DateTime<Utc>,
    cancel: &CancelToken,
) -> Result<Vec<CommuneStats>, ApiError> {
    let query = [("since", to_iso_param(since))];
    let response: CommuneStatsResponse = client
        .get(&format!("{}/communes", API_BASE), &query, cancel)
        .await?;
    Ok(response.communes)
}

/// Ranked commune list; row field names vary, see the normalizer aliases
pub async fn fetch_top_communes(
    client: &ApiClient,
    reference_date: DateTime<Utc>,
    cancel: &CancelToken,
) -> Result<Vec<CommuneTotal>, ApiError> {
    let query = [("referenceDate", to_reference_date(reference_date))];
    let body = client
        .get_json(&format!("{}/TopCommunes", API_BASE), &query, cancel)
        .await?;

    let rows = body
        .as_array()
        .ok_or_else(|| ApiError::Decode("expected an array of communes".to_string()))?;
    Ok(rows
        .iter()
        .filter(|row| row.is_object())
        .map(parse_commune_total)
        .collect())
}

/// Resolution rows for the period, repaired by [`repair_resolution_row`].
/// A body that is not an array yields no rows.
pub async fn fetch_resolution(
    client: &ApiClient,
    range: &DateRange,
    cancel: &CancelToken,
) -> Result<Vec<ResolutionRow>, ApiError> {
    let body = client
        .get_json(&format!("{}/resolution", API_BASE), &range_query(range), cancel)
        .await?;

    let Some(rows) = body.as_array() else {
        tracing::warn!("D401 legacy stats: invalid resolution data received");
        return Ok(Vec::new());
    };

    let repaired: Vec<ResolutionRow> = rows
        .iter()
        .filter(|row| row.is_object())
        .map(repair_resolution_row)
        .collect();
    tracing::info!(
        "D401 legacy stats: processed {} resolution records",
        repaired.len()
    );
    Ok(repaired)
}

pub async fn fetch_hourly(
    client: &ApiClient,
    range: &DateRange,
    cancel: &CancelToken,
) -> Result<Vec<HoraireStats>, ApiError> {
    client
        .get(&format!("{}/horaire", API_BASE), &range_query(range), cancel)
        .await
}

/// Legacy rows may carry the rate as a fraction. Rates within `[0, 1]` are
/// scaled to percent; every rate is rounded to one decimal.
pub fn repair_resolution_row(raw: &Value) -> ResolutionRow {
    let mut row = parse_resolution_row(raw);
    if (0.0..=1.0).contains(&row.taux_resolution) {
        row.taux_resolution *= 100.0;
    }
    row.taux_resolution = round_one_decimal(row.taux_resolution);
    row
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
