use crate::config::*;
use crate::error::{Error, Result};
use chrono::Utc;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub market: MarketConfig,
    pub analysis: AnalysisConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layers built-in defaults, `config/default`, `config/{env}` and
    /// `FUNDING_CHART__*` environment variables, in that order.
    pub fn load(env: &str) -> Result<Self> {
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("FUNDING_CHART")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.start >= Utc::now() {
            return Err(Error::ConfigError(format!(
                "market.start {} is not in the past",
                self.market.start
            )));
        }
        if self.market.kline_limit == 0 || self.market.funding_page_limit == 0 {
            return Err(Error::ConfigError("request limits must be positive".to_string()));
        }

        let a = &self.analysis;
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !in_unit(a.lower_percentile) || !in_unit(a.upper_percentile)
            || a.lower_percentile >= a.upper_percentile
        {
            return Err(Error::ConfigError(format!(
                "percentiles must satisfy 0 <= lower < upper <= 1, got {} and {}",
                a.lower_percentile, a.upper_percentile
            )));
        }
        if a.max_quantiles == 0 || a.subsample == 0 {
            return Err(Error::ConfigError(
                "max_quantiles and subsample must be positive".to_string(),
            ));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(Error::ConfigError("chart dimensions must be positive".to_string()));
        }
        Ok(())
    }
}
