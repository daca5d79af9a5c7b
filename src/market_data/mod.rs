pub mod connectors;
pub mod funding_history;
pub mod price_history;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use crate::error::{Error, Result};
use crate::types::timestamp::parse_millis;

pub use connectors::MarketDataSource;
pub use funding_history::{fetch_funding_history, FundingCursor};
pub use price_history::fetch_price_history;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KlineRequest {
    pub symbol: String,
    pub interval: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FundingHistoryRequest {
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: u32,
}

/// Kline fields arrive as strings from Bybit but some mirrors send numbers.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumericField {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericField {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumericField::Integer(v) => Some(*v),
            NumericField::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            NumericField::Float(_) => None,
            NumericField::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericField::Integer(v) => Some(*v as f64),
            NumericField::Float(v) => Some(*v),
            NumericField::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One row of `result.list` from the kline endpoint:
/// `[startTime, open, high, low, close, volume, turnover]`.
pub type KlineRow = Vec<NumericField>;

pub const KLINE_OPEN_TIME: usize = 0;
pub const KLINE_CLOSE: usize = 4;

/// Funding-history entry exactly as the exchange sends it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RawFundingRecord {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "fundingRate", deserialize_with = "string_or_number")]
    pub funding_rate: String,
    #[serde(rename = "fundingRateTimestamp", deserialize_with = "string_or_number")]
    pub funding_rate_timestamp: String,
}

impl RawFundingRecord {
    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        parse_millis(&self.funding_rate_timestamp)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumericField::deserialize(deserializer)? {
        NumericField::Integer(v) => v.to_string(),
        NumericField::Float(v) => v.to_string(),
        NumericField::Text(s) => s,
    })
}

pub(crate) fn kline_field(row: &KlineRow, index: usize) -> Result<&NumericField> {
    row.get(index).ok_or(Error::MalformedKline {
        expected: index + 1,
        found: row.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funding_record_accepts_string_or_numeric_timestamp() {
        let text: RawFundingRecord = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","fundingRate":"0.0001","fundingRateTimestamp":"1672531200000"}"#,
        ).unwrap();
        let number: RawFundingRecord = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","fundingRate":"0.0001","fundingRateTimestamp":1672531200000}"#,
        ).unwrap();
        assert_eq!(text, number);
        assert_eq!(text.timestamp().unwrap().timestamp_millis(), 1_672_531_200_000);
    }

    #[test]
    fn kline_row_mixes_strings_and_numbers() {
        let row: KlineRow = serde_json::from_str(
            r#"["1672531200000", "16540.5", "16600", "16500", 16625.1, "1000", "1.6e7"]"#,
        ).unwrap();
        assert_eq!(kline_field(&row, KLINE_OPEN_TIME).unwrap().as_i64(), Some(1_672_531_200_000));
        assert_eq!(kline_field(&row, KLINE_CLOSE).unwrap().as_f64(), Some(16625.1));
    }

    #[test]
    fn short_kline_row_is_malformed() {
        let row: KlineRow = vec![NumericField::Integer(1)];
        assert!(matches!(
            kline_field(&row, KLINE_CLOSE),
            Err(Error::MalformedKline { expected: 5, found: 1 })
        ));
    }
}
