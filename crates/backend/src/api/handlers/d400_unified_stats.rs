use axum::{
    extract::{Query, State},
    response::Response,
};
use std::collections::HashMap;

use super::respond;
use crate::shared::AppState;

pub const GLOBAL_STATS_PATH: &str = "/debug/global-stats";
pub const DATA_CONSISTENCY_PATH: &str = "/debug/data-consistency";

/// GET /debug/global-stats?from=2024-01-01T00:00:00.000Z&to=...
pub async fn get_global_stats(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    tracing::info!(
        "D400 stub: global stats for {:?}..{:?}",
        params.get("from"),
        params.get("to")
    );
    respond(&state, GLOBAL_STATS_PATH, params).await
}

/// GET /debug/data-consistency?from=&to=
pub async fn get_data_consistency(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, DATA_CONSISTENCY_PATH, params).await
}
