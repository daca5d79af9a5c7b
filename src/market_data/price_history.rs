use chrono::{DateTime, Utc};
use tracing::Instrument;
use crate::config::MarketConfig;
use crate::error::{Error, Result};
use crate::market_data::connectors::MarketDataSource;
use crate::market_data::{kline_field, KlineRequest, KlineRow, KLINE_CLOSE, KLINE_OPEN_TIME};
use crate::observability::tracing::trace_price_fetch;
use crate::types::price::PricePoint;
use crate::types::timestamp::from_millis;

/// Single kline request from `market.start` to `end`.
///
/// Never fails: transport, status and payload errors are logged and yield an
/// empty series. The window is capped at `market.kline_limit` candles, older
/// candles beyond the cap are not requested.
pub async fn fetch_price_history(
    source: &dyn MarketDataSource,
    market: &MarketConfig,
    end: DateTime<Utc>,
) -> Vec<PricePoint> {
    let request = KlineRequest {
        symbol: market.price_symbol.clone(),
        interval: market.kline_interval.clone(),
        start: market.start,
        end,
        limit: market.kline_limit,
    };

    async {
        let rows = match source.klines(&request).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Error fetching data from {}: {}", source.source_id(), e);
                return Vec::new();
            }
        };

        if rows.is_empty() {
            tracing::warn!("No more data returned by API.");
        }
        tracing::info!(
            "Retrieved {} entries. Next start time: {}",
            rows.len(),
            request.start
        );

        match parse_klines(&rows) {
            Ok(points) => {
                if points.is_empty() {
                    tracing::warn!("No data fetched.");
                }
                points
            }
            Err(e) => {
                tracing::error!("Discarding kline response: {}", e);
                Vec::new()
            }
        }
    }
    .instrument(trace_price_fetch(&market.price_symbol))
    .await
}

/// Open time and close of each row, sorted oldest first.
pub fn parse_klines(rows: &[KlineRow]) -> Result<Vec<PricePoint>> {
    let mut points = rows
        .iter()
        .map(parse_kline)
        .collect::<Result<Vec<_>>>()?;
    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

fn parse_kline(row: &KlineRow) -> Result<PricePoint> {
    let open_time = kline_field(row, KLINE_OPEN_TIME)?;
    let close = kline_field(row, KLINE_CLOSE)?;

    let millis = open_time
        .as_i64()
        .ok_or_else(|| Error::InvalidTimestamp(format!("{:?}", open_time)))?;
    let close = close
        .as_f64()
        .filter(|c| c.is_finite())
        .ok_or_else(|| Error::InvalidPrice(format!("{:?}", close)))?;

    Ok(PricePoint::new(from_millis(millis)?, close))
}
