use contracts::shared::DateRange;
use serde_json::Value;

use crate::shared::api_utils::{ApiClient, ApiError};
use crate::shared::cancel::CancelToken;
use crate::shared::date_utils::to_iso_param;

const GLOBAL_STATS_PATH: &str = "/debug/global-stats";
const DATA_CONSISTENCY_PATH: &str = "/debug/data-consistency";

fn range_query(range: &DateRange) -> [(&'static str, String); 2] {
    [
        ("from", to_iso_param(range.from())),
        ("to", to_iso_param(range.to())),
    ]
}

/// Получить единый снимок статистики за период (raw, not yet normalized)
pub async fn fetch_global_stats(
    client: &ApiClient,
    range: &DateRange,
    cancel: &CancelToken,
) -> Result<Value, ApiError> {
    client
        .get_json(GLOBAL_STATS_PATH, &range_query(range), cancel)
        .await
}

/// Backend cross-check report for the same period
pub async fn check_data_consistency(
    client: &ApiClient,
    range: &DateRange,
    cancel: &CancelToken,
) -> Result<Value, ApiError> {
    client
        .get_json(DATA_CONSISTENCY_PATH, &range_query(range), cancel)
        .await
}
