pub mod bybit;

use async_trait::async_trait;
use crate::error::Result;
use crate::market_data::{FundingHistoryRequest, KlineRequest, KlineRow, RawFundingRecord};

pub use bybit::BybitConnector;

/// A request/response market-data REST API.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// One window of candles, in whatever order the exchange returns them.
    async fn klines(&self, request: &KlineRequest) -> Result<Vec<KlineRow>>;
    /// One page of funding-rate history.
    async fn funding_history(&self, request: &FundingHistoryRequest) -> Result<Vec<RawFundingRecord>>;
    fn source_id(&self) -> &str;
}
