use chrono::{DateTime, Timelike, Utc};
use crate::error::{Error, Result};

/// Exchange timestamps are milliseconds since the Unix epoch.
pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidTimestamp(millis.to_string()))
}

pub fn parse_millis(raw: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = raw.trim()
        .parse()
        .map_err(|_| Error::InvalidTimestamp(raw.to_string()))?;
    from_millis(millis)
}

pub fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// True for the funding settlement that falls in the 00:00 UTC hour.
pub fn is_daily_settlement(ts: &DateTime<Utc>) -> bool {
    ts.hour() == 0
}
