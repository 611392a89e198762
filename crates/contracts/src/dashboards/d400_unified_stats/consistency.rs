use serde::{Deserialize, Serialize};

/// Result of comparing a primary total with an independently computed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub primary_total: f64,
    pub secondary_total: f64,
    pub absolute_difference: f64,
    /// Difference relative to the primary total, percent, one decimal
    pub percent_difference: f64,
    /// `status` reported by `/debug/data-consistency`, when it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_status: Option<String>,
}

impl ConsistencyReport {
    /// Largest absolute difference still reported as consistent
    pub const TOLERANCE: f64 = 1.0;

    pub fn compare(primary_total: f64, secondary_total: f64) -> Self {
        let absolute_difference = (primary_total - secondary_total).abs();
        let percent_difference = if primary_total > 0.0 {
            round_one_decimal(absolute_difference / primary_total * 100.0)
        } else {
            0.0
        };

        Self {
            is_consistent: absolute_difference <= Self::TOLERANCE,
            primary_total,
            secondary_total,
            absolute_difference,
            percent_difference,
            backend_status: None,
        }
    }

    pub fn with_backend_status(mut self, status: Option<String>) -> Self {
        self.backend_status = status;
        self
    }
}

/// Outcome of a consistency check: a report, or the error that prevented it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsistencyOutcome {
    Report(ConsistencyReport),
    Failed { error: String },
}

impl ConsistencyOutcome {
    pub fn is_consistent(&self) -> bool {
        matches!(self, ConsistencyOutcome::Report(report) if report.is_consistent)
    }

    pub fn report(&self) -> Option<&ConsistencyReport> {
        match self {
            ConsistencyOutcome::Report(report) => Some(report),
            ConsistencyOutcome::Failed { .. } => None,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
