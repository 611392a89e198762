use axum::{routing::get, Router};

use crate::api::handlers::{d400_unified_stats as d400, d401_legacy_stats as d401};
use crate::shared::AppState;

/// Every stats endpoint the stub serves
pub const ENDPOINTS: [&str; 8] = [
    d400::GLOBAL_STATS_PATH,
    d400::DATA_CONSISTENCY_PATH,
    d401::DASHBOARD_PATH,
    d401::TRENDS_PATH,
    d401::COMMUNES_PATH,
    d401::TOP_COMMUNES_PATH,
    d401::RESOLUTION_PATH,
    d401::HORAIRE_PATH,
];

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D400 UNIFIED STATS
        // ========================================
        .route(d400::GLOBAL_STATS_PATH, get(d400::get_global_stats))
        .route(d400::DATA_CONSISTENCY_PATH, get(d400::get_data_consistency))
        // ========================================
        // D401 LEGACY STATS
        // ========================================
        .route(d401::DASHBOARD_PATH, get(d401::get_dashboard))
        .route(d401::TRENDS_PATH, get(d401::get_trends))
        .route(d401::COMMUNES_PATH, get(d401::get_communes))
        .route(d401::TOP_COMMUNES_PATH, get(d401::get_top_communes))
        .route(d401::RESOLUTION_PATH, get(d401::get_resolution))
        .route(d401::HORAIRE_PATH, get(d401::get_horaire))
        .with_state(state)
}
