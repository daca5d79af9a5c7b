use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("tracing init failed: {}", e)))
}

pub fn trace_price_fetch(symbol: &str) -> Span {
    tracing::info_span!(
        "price_fetch",
        symbol = %symbol,
    )
}

pub fn trace_funding_fetch(symbol: &str) -> Span {
    tracing::info_span!(
        "funding_fetch",
        symbol = %symbol,
    )
}

pub fn trace_render(path: &std::path::Path) -> Span {
    tracing::info_span!(
        "render",
        path = %path.display(),
    )
}
