use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::funding::normalizer::QuantileNormalizer;
use crate::market_data::RawFundingRecord;
use crate::types::funding_rate::{FundingRecord, NormalizedFundingRecord};
use crate::utils::helper::percentile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Signal {
    Overbought,
    Oversold,
    Neutral,
}

/// Strictly above `upper` is overbought, strictly below `lower` is oversold.
pub fn classify(normalized: f64, lower: f64, upper: f64) -> Signal {
    if normalized > upper {
        Signal::Overbought
    } else if normalized < lower {
        Signal::Oversold
    } else {
        Signal::Neutral
    }
}

/// Normalized funding series with its tail thresholds and flagged timestamps.
#[derive(Clone, Debug)]
pub struct FundingSignals {
    pub records: Vec<NormalizedFundingRecord>,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub overbought: Vec<DateTime<Utc>>,
    pub oversold: Vec<DateTime<Utc>>,
}

impl FundingSignals {
    pub fn from_raw(raw: &[RawFundingRecord], config: &AnalysisConfig) -> Result<Self> {
        Self::from_records(prepare_records(raw)?, config)
    }

    /// `records` must already be in ascending time order.
    pub fn from_records(records: Vec<FundingRecord>, config: &AnalysisConfig) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyInput);
        }

        let rates: Vec<f64> = records.iter().map(|r| r.rate.to_f64()).collect();
        let normalized = QuantileNormalizer::new(config).fit_transform(&rates)?;

        let lower_threshold = percentile(&normalized, config.lower_percentile)
            .ok_or(Error::EmptyInput)?;
        let upper_threshold = percentile(&normalized, config.upper_percentile)
            .ok_or(Error::EmptyInput)?;

        let records: Vec<NormalizedFundingRecord> = records
            .into_iter()
            .zip(normalized)
            .map(|(record, normalized)| NormalizedFundingRecord { record, normalized })
            .collect();

        let flagged = |wanted: Signal| -> Vec<DateTime<Utc>> {
            records
                .iter()
                .filter(|r| classify(r.normalized, lower_threshold, upper_threshold) == wanted)
                .map(|r| r.timestamp())
                .collect()
        };
        let overbought = flagged(Signal::Overbought);
        let oversold = flagged(Signal::Oversold);

        tracing::info!(
            "Funding thresholds: lower={:.4} upper={:.4}, {} overbought, {} oversold",
            lower_threshold,
            upper_threshold,
            overbought.len(),
            oversold.len()
        );

        Ok(FundingSignals {
            records,
            lower_threshold,
            upper_threshold,
            overbought,
            oversold,
        })
    }
}

/// Parses raw records, sorts them oldest first and drops repeated timestamps,
/// keeping the first one fetched. Pages overlap on their boundary record
/// because the funding endpoint's `endTime` is inclusive.
pub fn prepare_records(raw: &[RawFundingRecord]) -> Result<Vec<FundingRecord>> {
    let mut records = raw
        .iter()
        .map(FundingRecord::try_from)
        .collect::<Result<Vec<_>>>()?;

    records.sort_by_key(|r| r.timestamp);
    let before = records.len();
    records.dedup_by_key(|r| r.timestamp);
    if records.len() < before {
        tracing::debug!("Dropped {} duplicate funding timestamps", before - records.len());
    }
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        tracing::debug!(
            "Funding series: {} at {} through {} at {}",
            first.rate,
            first.timestamp,
            last.rate,
            last.timestamp
        );
    }
    Ok(records)
}
