use anyhow::Context;
use funding_chart::config::AppConfig;
use funding_chart::market_data::connectors::BybitConnector;
use funding_chart::observability::tracing::init_tracing;
use funding_chart::render::RenderOutcome;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("FUNDING_CHART_ENV").unwrap_or_else(|_| "local".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;
    init_tracing(&config.logging).context("initialising logging")?;

    tracing::info!(
        "Fetching {} prices and {} funding history since {}",
        config.market.price_symbol,
        config.market.funding_symbol,
        config.market.start
    );

    let source = BybitConnector::new(&config.exchange).context("building HTTP client")?;

    match funding_chart::run(&source, &config).await {
        Ok(RenderOutcome::Rendered { path, overbought, oversold }) => {
            tracing::info!(
                "Rendered {} with {} overbought and {} oversold markers",
                path.display(),
                overbought,
                oversold
            );
        }
        Ok(RenderOutcome::Skipped(reason)) => {
            tracing::warn!("Chart skipped: {}", reason);
        }
        Err(e) => {
            tracing::error!("Rendering failed: {}", e);
        }
    }

    Ok(())
}
