use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::Instrument;
use crate::config::MarketConfig;
use crate::market_data::connectors::MarketDataSource;
use crate::market_data::{FundingHistoryRequest, RawFundingRecord};
use crate::observability::tracing::trace_funding_fetch;
use crate::types::timestamp::is_daily_settlement;

/// Backward-walking window over the funding history.
///
/// Invariant: `window_start < window_end`. Each page moves `window_end` down
/// to the last timestamp it returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundingCursor {
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Next(FundingCursor),
    /// Last timestamp of the page is at or before `window_start`.
    NoProgress,
    /// Last timestamp of the page did not move below the previous `window_end`.
    Stuck,
}

impl FundingCursor {
    pub fn new(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Option<Self> {
        (window_start < window_end).then_some(FundingCursor { window_start, window_end })
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    pub fn request(&self, symbol: &str, limit: u32) -> FundingHistoryRequest {
        FundingHistoryRequest {
            symbol: symbol.to_string(),
            start: self.window_start,
            end: self.window_end,
            limit,
        }
    }

    pub fn advance(&self, last_timestamp: DateTime<Utc>) -> Advance {
        if last_timestamp <= self.window_start {
            Advance::NoProgress
        } else if last_timestamp >= self.window_end {
            Advance::Stuck
        } else {
            Advance::Next(FundingCursor {
                window_start: self.window_start,
                window_end: last_timestamp,
            })
        }
    }
}

/// Walks `/funding/history` backward from `end` to `market.start`, then keeps
/// only the 00:00 UTC settlements.
///
/// Records come back in accumulation order (page by page, newest page first)
/// and are not deduplicated. Any failed request ends the walk; whatever was
/// accumulated before it is still returned.
pub async fn fetch_funding_history(
    source: &dyn MarketDataSource,
    market: &MarketConfig,
    end: DateTime<Utc>,
) -> Vec<RawFundingRecord> {
    let symbol = market.funding_symbol.as_str();
    let limit = market.funding_page_limit;

    async {
        let Some(cursor) = FundingCursor::new(market.start, end) else {
            tracing::warn!("Empty funding window: start {} is not before end {}", market.start, end);
            return Vec::new();
        };

        let pages = stream::unfold(Some(cursor), move |state| async move {
            let cursor = state?;
            let page = next_page(source, &cursor, symbol, limit).await?;
            let next = page_successor(&cursor, &page);
            Some((page, next))
        });

        let fetched: Vec<RawFundingRecord> = pages.concat().await;
        tracing::info!("Fetched {} funding records in total", fetched.len());

        let daily = filter_daily_settlements(fetched);
        tracing::info!("Kept {} records settled at 00:00 UTC", daily.len());
        daily
    }
    .instrument(trace_funding_fetch(symbol))
    .await
}

async fn next_page(
    source: &dyn MarketDataSource,
    cursor: &FundingCursor,
    symbol: &str,
    limit: u32,
) -> Option<Vec<RawFundingRecord>> {
    let request = cursor.request(symbol, limit);
    match source.funding_history(&request).await {
        Ok(page) if page.is_empty() => {
            tracing::info!("No more data available from the API.");
            None
        }
        Ok(page) => {
            tracing::info!(
                "Retrieved {} funding records between {} and {}",
                page.len(),
                cursor.window_start(),
                cursor.window_end()
            );
            Some(page)
        }
        Err(e) => {
            tracing::error!("Error fetching data from {}: {}", source.source_id(), e);
            None
        }
    }
}

fn page_successor(cursor: &FundingCursor, page: &[RawFundingRecord]) -> Option<FundingCursor> {
    let last = page.last()?;
    let last_timestamp = match last.timestamp() {
        Ok(ts) => ts,
        Err(e) => {
            tracing::warn!("Cannot continue past unreadable cursor record: {}", e);
            return None;
        }
    };

    match cursor.advance(last_timestamp) {
        Advance::Next(next) => Some(next),
        Advance::NoProgress | Advance::Stuck => {
            tracing::warn!("No progress in data timestamps. Breaking loop.");
            None
        }
    }
}

/// Keeps records whose timestamp falls in the 00:00 UTC hour.
pub fn filter_daily_settlements(records: Vec<RawFundingRecord>) -> Vec<RawFundingRecord> {
    records
        .into_iter()
        .filter(|record| match record.timestamp() {
            Ok(ts) => is_daily_settlement(&ts),
            Err(e) => {
                tracing::debug!("Dropping funding record: {}", e);
                false
            }
        })
        .collect()
}
