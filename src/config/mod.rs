use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod loader;
pub mod market;

pub use analysis::AnalysisConfig;
pub use loader::AppConfig;
pub use market::MarketConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub category: String,
    pub request_timeout_secs: u64,
}

impl ExchangeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            base_url: "https://api.bybit.com".to_string(),
            category: "linear".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChartConfig {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            output_path: PathBuf::from("funding_rate_chart.svg"),
            width: 1200,
            height: 600,
            title: "Bybit BTC Normalized Funding Rate".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub json: bool,
}
