use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub max_quantiles: usize,
    pub subsample: usize,
    pub seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            lower_percentile: 0.025, // bottom 2.5%
            upper_percentile: 0.975, // top 2.5%
            max_quantiles: 1000,
            subsample: 10_000,
            seed: 42,
        }
    }
}
