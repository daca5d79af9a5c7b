use chrono::Utc;
use crate::config::AppConfig;
use crate::market_data::{fetch_funding_history, fetch_price_history, MarketDataSource};
use crate::render::RenderOutcome;

pub mod config;
pub mod error;
pub mod funding;
pub mod market_data;
pub mod observability;
pub mod render;
pub mod types;
pub mod utils;

/// Fetch prices, fetch funding history, render. Fetch failures only shrink
/// the data; the renderer decides whether anything can be drawn.
pub async fn run(source: &dyn MarketDataSource, config: &AppConfig) -> error::Result<RenderOutcome> {
    let now = Utc::now();

    let prices = fetch_price_history(source, &config.market, now).await;
    let funding = fetch_funding_history(source, &config.market, now).await;

    render::plot_combined(&prices, &funding, &config.analysis, &config.chart)
}
