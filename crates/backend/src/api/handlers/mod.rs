pub mod d400_unified_stats;
pub mod d401_legacy_stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;

use crate::shared::AppState;

/// Record the request, then answer with the fixture of `path`
pub(crate) async fn respond(
    state: &AppState,
    path: &str,
    params: HashMap<String, String>,
) -> Response {
    state.record(path, params);

    let Some(fixture) = state.fixtures().get(path).cloned() else {
        tracing::warn!("Stub: no fixture for {}", path);
        return StatusCode::NOT_FOUND.into_response();
    };

    if !fixture.delay().is_zero() {
        tokio::time::sleep(fixture.delay()).await;
    }

    let status =
        StatusCode::from_u16(fixture.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !status.is_success() {
        tracing::warn!("Stub: answering {} with {}", path, status);
    }
    (status, Json(fixture.body)).into_response()
}
