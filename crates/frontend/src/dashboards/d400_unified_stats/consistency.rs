use contracts::dashboards::d400_unified_stats::{ConsistencyOutcome, ConsistencyReport};
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;

/// Keys holding a total in object payloads, in priority order
pub const TOTAL_KEYS: &[&str] = &["totalPlaintes", "total_plaintes", "totalElements"];

/// Keys summed over array payloads, in priority order per item
pub const ITEM_TOTAL_KEYS: &[&str] = &["total", "count"];

/// Pull a complaint total out of an arbitrary payload
///
/// A number is its own total, an object exposes one of [`TOTAL_KEYS`], an
/// array sums its items. Anything else counts as 0.
pub fn extract_total(data: &Value) -> f64 {
    match data {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Object(map) => TOTAL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_f64))
            .unwrap_or_else(|| {
                tracing::warn!(
                    "D400 consistency: no total in payload (keys: {:?}), counting 0",
                    map.keys().collect::<Vec<_>>()
                );
                0.0
            }),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                ITEM_TOTAL_KEYS
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_f64))
                    .unwrap_or(0.0)
            })
            .sum(),
        _ => 0.0,
    }
}

/// Compare the totals of two independently fetched payloads.
///
/// Errors of either side end up in the outcome, never in the caller.
pub async fn check<P, S, E>(primary: P, secondary: S) -> ConsistencyOutcome
where
    P: Future<Output = Result<Value, E>>,
    S: Future<Output = Result<Value, E>>,
    E: Display,
{
    match futures::future::try_join(primary, secondary).await {
        Ok((primary, secondary)) => {
            let backend_status = secondary
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string);
            let report = ConsistencyReport::compare(extract_total(&primary), extract_total(&secondary))
                .with_backend_status(backend_status);

            if !report.is_consistent {
                tracing::warn!(
                    "Consistency check: {} vs {} ({}% drift)",
                    report.primary_total,
                    report.secondary_total,
                    report.percent_difference
                );
            }
            ConsistencyOutcome::Report(report)
        }
        Err(e) => {
            tracing::warn!("Consistency check failed: {}", e);
            ConsistencyOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::api_utils::ApiError;
    use serde_json::json;

    #[test]
    fn test_extract_total_shapes() {
        assert_eq!(extract_total(&json!(42)), 42.0);
        assert_eq!(extract_total(&json!({ "totalPlaintes": 12 })), 12.0);
        assert_eq!(extract_total(&json!({ "total_plaintes": 13 })), 13.0);
        assert_eq!(extract_total(&json!({ "totalElements": 63, "totalPages": 7 })), 63.0);
        assert_eq!(
            extract_total(&json!([{ "total": 3 }, { "count": 4 }, { "other": 1 }])),
            7.0
        );
        assert_eq!(extract_total(&json!("12")), 0.0);
        assert_eq!(extract_total(&json!({})), 0.0);
    }

    #[tokio::test]
    async fn test_check_reports_drift() {
        let outcome = check(
            async { Ok::<_, ApiError>(json!(100)) },
            async { Ok(json!({ "totalPlaintes": 103, "status": "INCONSISTENT" })) },
        )
        .await;

        let report = outcome.report().unwrap();
        assert!(!report.is_consistent);
        assert_eq!(report.percent_difference, 3.0);
        assert_eq!(report.backend_status.as_deref(), Some("INCONSISTENT"));
    }

    #[tokio::test]
    async fn test_check_within_tolerance() {
        let outcome = check(
            async { Ok::<_, ApiError>(json!(100)) },
            async { Ok(json!(100.5)) },
        )
        .await;
        assert!(outcome.is_consistent());
    }

    #[tokio::test]
    async fn test_status_only_report_counts_as_zero() {
        let outcome = check(
            async { Ok::<_, ApiError>(json!(100)) },
            async { Ok(json!({ "status": "CONSISTENT" })) },
        )
        .await;

        let report = outcome.report().unwrap();
        assert_eq!(report.secondary_total, 0.0);
        assert!(!report.is_consistent);
        assert_eq!(report.backend_status.as_deref(), Some("CONSISTENT"));
    }

    #[tokio::test]
    async fn test_secondary_failure_is_isolated() {
        let outcome = check(
            async { Ok(json!(100)) },
            async { Err(ApiError::Http { status: 503 }) },
        )
        .await;

        assert_eq!(
            outcome,
            ConsistencyOutcome::Failed {
                error: "HTTP error: 503".to_string()
            }
        );
    }
}
