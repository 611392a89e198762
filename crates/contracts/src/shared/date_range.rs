use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибка построения периода
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("invalid date range: from ({from}) is after to ({to})")]
    Inverted {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// Closed period `[from, to]` a view loads statistics for.
///
/// `from <= to` always holds: both the constructor and the deserializer
/// reject an inverted pair instead of swapping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeBounds")]
pub struct DateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

#[derive(Deserialize)]
struct DateRangeBounds {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TryFrom<DateRangeBounds> for DateRange {
    type Error = DateRangeError;

    fn try_from(bounds: DateRangeBounds) -> Result<Self, Self::Error> {
        DateRange::new(bounds.from, bounds.to)
    }
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// Period of `days` days ending at `to`
    pub fn last_days(to: DateTime<Utc>, days: i64) -> Self {
        let days = days.max(0);
        Self {
            from: to - Duration::days(days),
            to,
        }
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}
