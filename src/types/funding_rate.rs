use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::market_data::RawFundingRecord;
use crate::types::timestamp::parse_millis;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FundingRate(f64);

impl FundingRate {
    pub fn to_f64(&self) -> f64 {
        self.0
    }
}

impl FromStr for FundingRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim()
            .parse()
            .map_err(|_| Error::InvalidFundingRate(s.to_string()))?;
        if !value.is_finite() {
            return Err(Error::InvalidFundingRate(s.to_string()));
        }
        Ok(FundingRate(value))
    }
}

impl fmt::Display for FundingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRecord {
    pub timestamp: DateTime<Utc>,
    pub rate: FundingRate,
    pub symbol: String,
}

impl TryFrom<&RawFundingRecord> for FundingRecord {
    type Error = Error;

    fn try_from(raw: &RawFundingRecord) -> Result<Self> {
        Ok(FundingRecord {
            timestamp: parse_millis(&raw.funding_rate_timestamp)?,
            rate: raw.funding_rate.parse()?,
            symbol: raw.symbol.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFundingRecord {
    pub record: FundingRecord,
    pub normalized: f64,
}

impl NormalizedFundingRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.record.timestamp
    }
}
