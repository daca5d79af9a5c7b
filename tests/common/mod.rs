#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funding_chart::error::Result;
use funding_chart::market_data::{
    FundingHistoryRequest, KlineRequest, KlineRow, MarketDataSource, NumericField, RawFundingRecord,
};

pub const HOUR_MS: i64 = 3_600_000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// 2023-01-01T00:00:00Z
pub const START_MS: i64 = 1_672_531_200_000;

pub fn ts(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

pub fn funding(millis: i64, rate: f64) -> RawFundingRecord {
    RawFundingRecord {
        symbol: "BTCUSDT".to_string(),
        funding_rate: format!("{:.8}", rate),
        funding_rate_timestamp: millis.to_string(),
    }
}

pub fn kline(millis: i64, close: f64) -> KlineRow {
    let text = |v: String| NumericField::Text(v);
    vec![
        text(millis.to_string()),
        text(format!("{}", close - 10.0)),
        text(format!("{}", close + 20.0)),
        text(format!("{}", close - 30.0)),
        text(format!("{}", close)),
        text("1000".to_string()),
        text("16000000".to_string()),
    ]
}

/// Replays canned responses in order; an exhausted script answers with an
/// empty list.
#[derive(Default)]
pub struct ScriptedSource {
    klines: Mutex<VecDeque<Result<Vec<KlineRow>>>>,
    funding: Mutex<VecDeque<Result<Vec<RawFundingRecord>>>>,
    funding_requests: Mutex<Vec<FundingHistoryRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_klines(self, response: Result<Vec<KlineRow>>) -> Self {
        self.klines.lock().unwrap().push_back(response);
        self
    }

    pub fn with_funding_page(self, response: Result<Vec<RawFundingRecord>>) -> Self {
        self.funding.lock().unwrap().push_back(response);
        self
    }

    pub fn funding_requests(&self) -> Vec<FundingHistoryRequest> {
        self.funding_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn klines(&self, _request: &KlineRequest) -> Result<Vec<KlineRow>> {
        self.klines.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn funding_history(&self, request: &FundingHistoryRequest) -> Result<Vec<RawFundingRecord>> {
        self.funding_requests.lock().unwrap().push(request.clone());
        self.funding.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn source_id(&self) -> &str {
        "scripted"
    }
}

/// Serves a fixed funding history the way the exchange pages it: records in
/// `[startTime, endTime]`, newest first, at most `limit` of them.
pub struct HistorySource {
    history: Vec<RawFundingRecord>,
    requests: Mutex<usize>,
}

impl HistorySource {
    /// Settlements every `interval_ms` from `first_ms` to `last_ms` inclusive.
    pub fn every(first_ms: i64, last_ms: i64, interval_ms: i64) -> Self {
        let mut history: Vec<RawFundingRecord> = (0..)
            .map(|i| first_ms + i * interval_ms)
            .take_while(|&t| t <= last_ms)
            .map(|t| funding(t, (((t / interval_ms) % 17) as f64 - 8.0) * 1e-5))
            .collect();
        history.reverse();
        HistorySource { history, requests: Mutex::new(0) }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl MarketDataSource for HistorySource {
    async fn klines(&self, _request: &KlineRequest) -> Result<Vec<KlineRow>> {
        Ok(Vec::new())
    }

    async fn funding_history(&self, request: &FundingHistoryRequest) -> Result<Vec<RawFundingRecord>> {
        *self.requests.lock().unwrap() += 1;
        let start = request.start.timestamp_millis();
        let end = request.end.timestamp_millis();
        Ok(self
            .history
            .iter()
            .filter(|r| {
                let t: i64 = r.funding_rate_timestamp.parse().unwrap();
                start <= t && t <= end
            })
            .take(request.limit as usize)
            .cloned()
            .collect())
    }

    fn source_id(&self) -> &str {
        "history"
    }
}

/// Collects formatted log lines from the thread it is installed on.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
