pub mod normalizer;
pub mod signals;

pub use normalizer::{quantile_normalization, QuantileNormalizer};
pub use signals::{FundingSignals, Signal};
