//! Raw backend payload -> `GlobalStats` -> page `ViewModel`.
//!
//! Only `total_plaintes` is mandatory and must be a non-negative number. Every other field falls back to a
//! default (0 for numbers, empty list for lists, `None` for strings), so a
//! partially filled payload still renders.
//!
//! Backend versions disagree on row field names. Each logical field accepts
//! the keys below, in priority order; the first key holding a usable value
//! wins:
//!
//! | field                 | keys                                 |
//! |-----------------------|--------------------------------------|
//! | commune name          | `commune`, `zone`, `name`            |
//! | commune total         | `total`, `totalPlaintes`, `count`    |
//! | resolution commune    | `commune`, `zone`                    |
//! | resolution category   | `categorie`, `category`              |
//! | resolution total      | `totalPlaintes`, `total`             |
//! | resolution resolved   | `resoluePlaintes`, `resolues`        |
//! | resolution rate       | `tauxResolution`, `taux`             |

use contracts::dashboards::d400_unified_stats::{
    BaseView, CommuneTotal, DashboardSummary, DashboardView, GlobalStats, PageType,
    ResolutionRow, ResolutionSummary, ResolutionView, StatsSummary, StatsView, ViewModel,
};
use serde_json::Value;
use thiserror::Error;

pub const COMMUNE_NAME_KEYS: &[&str] = &["commune", "zone", "name"];
pub const COMMUNE_TOTAL_KEYS: &[&str] = &["total", "totalPlaintes", "count"];
pub const RESOLUTION_COMMUNE_KEYS: &[&str] = &["commune", "zone"];
pub const RESOLUTION_CATEGORY_KEYS: &[&str] = &["categorie", "category"];
pub const RESOLUTION_TOTAL_KEYS: &[&str] = &["totalPlaintes", "total"];
pub const RESOLUTION_RESOLVED_KEYS: &[&str] = &["resoluePlaintes", "resolues"];
pub const RESOLUTION_RATE_KEYS: &[&str] = &["tauxResolution", "taux"];

pub const UNKNOWN_COMMUNE: &str = "Zone inconnue";
pub const UNKNOWN_CATEGORY: &str = "Catégorie inconnue";

/// Number of communes the dashboard surfaces
pub const TOP_COMMUNES_LIMIT: usize = 10;

const TOTAL_FIELD: &str = "total_plaintes";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid global stats response: expected a JSON object")]
    NotAnObject,

    #[error("Invalid global stats response: missing field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid global stats response: field `{0}` is not a number")]
    NotANumber(&'static str),

    #[error("Invalid global stats response: field `{0}` is negative")]
    NotACount(&'static str),
}

/// Normalize a raw `/debug/global-stats` payload into the view model of `page`
pub fn normalize(raw: &Value, page: PageType) -> Result<ViewModel, SchemaError> {
    let stats = parse_global_stats(raw)?;
    Ok(project(&stats, page))
}

pub fn parse_global_stats(raw: &Value) -> Result<GlobalStats, SchemaError> {
    let object = raw.as_object().ok_or(SchemaError::NotAnObject)?;

    let total = object
        .get(TOTAL_FIELD)
        .filter(|v| !v.is_null())
        .ok_or(SchemaError::MissingField(TOTAL_FIELD))?;
    let total_plaintes = match as_count(total) {
        Some(count) => count,
        None if total.as_f64().is_some() => return Err(SchemaError::NotACount(TOTAL_FIELD)),
        None => return Err(SchemaError::NotANumber(TOTAL_FIELD)),
    };

    Ok(GlobalStats {
        total_plaintes,
        total_resolues: object.get("total_resolues").and_then(as_count).unwrap_or(0),
        taux_resolution_global: object
            .get("taux_resolution_global")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        top_communes: rows(object.get("top_communes"))
            .map(parse_commune_total)
            .collect(),
        resolution_data: rows(object.get("resolution_data"))
            .map(parse_resolution_row)
            .collect(),
        average_priority: object
            .get("average_priority")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        critical_complaints: object
            .get("critical_complaints")
            .and_then(as_count)
            .unwrap_or(0),
        zones_count: object.get("zones_count").and_then(as_count).unwrap_or(0),
        categories_count: object
            .get("categories_count")
            .and_then(as_count)
            .unwrap_or(0),
        calculated_at: object
            .get("calculated_at")
            .and_then(Value::as_str)
            .map(str::to_string),
        data_quality_status: object
            .get("data_quality_status")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

pub fn parse_commune_total(row: &Value) -> CommuneTotal {
    CommuneTotal {
        commune: text_field(row, COMMUNE_NAME_KEYS).unwrap_or_else(|| UNKNOWN_COMMUNE.to_string()),
        total: count_field(row, COMMUNE_TOTAL_KEYS).unwrap_or(0),
    }
}

pub fn parse_resolution_row(row: &Value) -> ResolutionRow {
    ResolutionRow {
        commune: text_field(row, RESOLUTION_COMMUNE_KEYS)
            .unwrap_or_else(|| UNKNOWN_COMMUNE.to_string()),
        categorie: text_field(row, RESOLUTION_CATEGORY_KEYS)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        total_plaintes: count_field(row, RESOLUTION_TOTAL_KEYS).unwrap_or(0),
        resolue_plaintes: count_field(row, RESOLUTION_RESOLVED_KEYS).unwrap_or(0),
        taux_resolution: number_field(row, RESOLUTION_RATE_KEYS).unwrap_or(0.0),
    }
}

/// Project a snapshot onto the page layout
pub fn project(stats: &GlobalStats, page: PageType) -> ViewModel {
    let base = BaseView {
        total_plaintes: stats.total_plaintes,
        total_resolues: stats.total_resolues,
        taux_resolution: stats.taux_resolution_global,
        calculated_at: stats.calculated_at.clone(),
    };

    match page {
        PageType::Dashboard => ViewModel::Dashboard(DashboardView {
            summary: DashboardSummary {
                total_plaintes: stats.total_plaintes,
                total_resolues: stats.total_resolues,
                taux_resolution: stats.taux_resolution_global,
                nouveau_plaintes: 0,
                taux_croissance: 0.0,
                zones_performantes: stats.zones_count,
                total_plaintes_resolution: stats.total_plaintes,
                moyenne_priorite: stats.average_priority,
                plaintes_critiques: stats.critical_complaints,
            },
            top_communes: stats
                .top_communes
                .iter()
                .take(TOP_COMMUNES_LIMIT)
                .cloned()
                .collect(),
            resolution_data: stats.resolution_data.clone(),
            base,
        }),
        PageType::Resolution => ViewModel::Resolution(ResolutionView {
            summary_stats: ResolutionSummary {
                total_complaints: stats.total_plaintes,
                resolved_complaints: stats.total_resolues,
                avg_resolution: stats.taux_resolution_global,
                best_performer: best_performer(&stats.resolution_data).cloned(),
                worst_performer: worst_performer(&stats.resolution_data).cloned(),
            },
            resolution_data: stats.resolution_data.clone(),
            base,
        }),
        PageType::Stats => ViewModel::Stats(StatsView {
            top_communes: stats.top_communes.clone(),
            resolution_rows: stats.resolution_data.clone(),
            enhanced_summary: StatsSummary {
                total_complaints: stats.total_plaintes,
                avg_resolution_rate: stats.taux_resolution_global,
                communes_count: stats.zones_count,
                categories_count: stats.categories_count,
            },
            base,
        }),
        PageType::Geography | PageType::Complaints => ViewModel::Overview(base),
    }
}

/// Row with the highest resolution rate, first one on ties
pub fn best_performer(rows: &[ResolutionRow]) -> Option<&ResolutionRow> {
    let mut iter = rows.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, row| {
        if row.taux_resolution > best.taux_resolution {
            row
        } else {
            best
        }
    }))
}

/// Row with the lowest resolution rate, first one on ties
pub fn worst_performer(rows: &[ResolutionRow]) -> Option<&ResolutionRow> {
    let mut iter = rows.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |worst, row| {
        if row.taux_resolution < worst.taux_resolution {
            row
        } else {
            worst
        }
    }))
}

fn rows(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|row| row.is_object())
}

/// Non-negative JSON number as a count; floats are rounded
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

fn text_field(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| row.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn count_field(row: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| row.get(*key).and_then(as_count))
}

fn number_field(row: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| row.get(*key).and_then(Value::as_f64))
}
