use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Daily close taken from a kline's open time and close price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        PricePoint { timestamp, close }
    }
}

/// (min, max) of the close column, or None for an empty series.
pub fn close_range(points: &[PricePoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.close).fold(None, |acc: Option<(f64, f64)>, close| match acc {
        None => Some((close, close)),
        Some((lo, hi)) => Some((lo.min(close), hi.max(close))),
    })
}
