use axum::{
    extract::{Query, State},
    response::Response,
};
use std::collections::HashMap;

use super::respond;
use crate::shared::AppState;

pub const DASHBOARD_PATH: &str = "/stats/dashboard";
pub const TRENDS_PATH: &str = "/stats/trends";
pub const COMMUNES_PATH: &str = "/stats/communes";
pub const TOP_COMMUNES_PATH: &str = "/stats/TopCommunes";
pub const RESOLUTION_PATH: &str = "/stats/resolution";
pub const HORAIRE_PATH: &str = "/stats/horaire";

/// GET /stats/dashboard?referenceDate=2024-01-31
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    tracing::info!(
        "D401 stub: dashboard on {:?}",
        params.get("referenceDate")
    );
    respond(&state, DASHBOARD_PATH, params).await
}

pub async fn get_trends(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, TRENDS_PATH, params).await
}

/// GET /stats/communes?since=
pub async fn get_communes(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, COMMUNES_PATH, params).await
}

pub async fn get_top_communes(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, TOP_COMMUNES_PATH, params).await
}

pub async fn get_resolution(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, RESOLUTION_PATH, params).await
}

pub async fn get_horaire(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, HORAIRE_PATH, params).await
}
