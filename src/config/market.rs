use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which instruments to pull and how far back.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MarketConfig {
    pub price_symbol: String,
    pub funding_symbol: String,
    pub start: DateTime<Utc>,
    pub kline_interval: String,
    pub kline_limit: u32,
    pub funding_page_limit: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            price_symbol: "BTCUSDT".to_string(),
            funding_symbol: "BTCUSDT".to_string(),
            start: default_start(),
            kline_interval: "D".to_string(), // daily candles
            kline_limit: 1000,               // Bybit max per kline request
            funding_page_limit: 200,         // Bybit max per funding-history request
        }
    }
}

/// 2023-01-01T00:00:00Z
pub fn default_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
