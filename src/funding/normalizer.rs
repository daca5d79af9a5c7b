use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::{ContinuousCDF, Normal};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::utils::helper::{interp, percentile_sorted, sort_floats};

/// Distance from the outermost quantiles inside which a value is pinned to
/// probability 0 or 1.
pub const BOUNDS_THRESHOLD: f64 = 1e-7;

/// Rank-based transform onto a standard normal, fitted on the data it
/// transforms.
#[derive(Clone, Debug)]
pub struct QuantileNormalizer {
    max_quantiles: usize,
    subsample: usize,
    seed: u64,
}

impl Default for QuantileNormalizer {
    fn default() -> Self {
        QuantileNormalizer::new(&AnalysisConfig::default())
    }
}

impl QuantileNormalizer {
    pub fn new(config: &AnalysisConfig) -> Self {
        QuantileNormalizer {
            max_quantiles: config.max_quantiles.max(1),
            subsample: config.subsample.max(1),
            seed: config.seed,
        }
    }

    /// Estimates `min(max_quantiles, n)` evenly spaced quantiles. Inputs longer
    /// than `subsample` are fitted on a seeded sample drawn without
    /// replacement.
    pub fn fit(&self, values: &[f64]) -> Result<FittedQuantiles> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteValue(i));
        }

        let mut sample = if values.len() > self.subsample {
            let mut rng = StdRng::seed_from_u64(self.seed);
            rand::seq::index::sample(&mut rng, values.len(), self.subsample)
                .into_iter()
                .map(|i| values[i])
                .collect()
        } else {
            values.to_vec()
        };
        sort_floats(&mut sample);

        let n_quantiles = self.max_quantiles.min(values.len()).min(sample.len());
        let references = linspace_unit(n_quantiles);

        let mut quantiles = Vec::with_capacity(n_quantiles);
        let mut running_max = f64::NEG_INFINITY;
        for &r in &references {
            let q = percentile_sorted(&sample, r).ok_or(Error::EmptyInput)?;
            // Interpolation round-off can dip below the previous quantile.
            running_max = running_max.max(q);
            quantiles.push(running_max);
        }

        FittedQuantiles::new(quantiles, references)
    }

    pub fn fit_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let fitted = self.fit(values)?;
        Ok(values.iter().map(|&v| fitted.transform(v)).collect())
    }
}

/// Quantiles learned by [`QuantileNormalizer::fit`].
#[derive(Clone, Debug)]
pub struct FittedQuantiles {
    quantiles: Vec<f64>,
    references: Vec<f64>,
    neg_quantiles_rev: Vec<f64>,
    neg_references_rev: Vec<f64>,
    normal: Normal,
}

impl FittedQuantiles {
    fn new(quantiles: Vec<f64>, references: Vec<f64>) -> Result<Self> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| Error::NormalizationError(e.to_string()))?;
        let neg_quantiles_rev = quantiles.iter().rev().map(|q| -q).collect();
        let neg_references_rev = references.iter().rev().map(|r| -r).collect();

        Ok(FittedQuantiles {
            quantiles,
            references,
            neg_quantiles_rev,
            neg_references_rev,
            normal,
        })
    }

    /// Every fitted quantile is the same value.
    pub fn is_degenerate(&self) -> bool {
        match (self.quantiles.first(), self.quantiles.last()) {
            (Some(lo), Some(hi)) => lo >= hi,
            _ => true,
        }
    }

    /// Empirical CDF position of `value`, in [0, 1].
    pub fn rank(&self, value: f64) -> f64 {
        let lower = self.quantiles[0];
        let upper = self.quantiles[self.quantiles.len() - 1];

        if value - BOUNDS_THRESHOLD < lower {
            0.0
        } else if value + BOUNDS_THRESHOLD > upper {
            1.0
        } else {
            // Averaging the ascending and descending interpolations gives tied
            // quantiles the midpoint of their reference range.
            let forward = interp(value, &self.quantiles, &self.references);
            let backward = interp(-value, &self.neg_quantiles_rev, &self.neg_references_rev);
            0.5 * (forward - backward)
        }
    }

    /// Maps `value` onto the standard normal. Degenerate fits map everything
    /// to 0.
    pub fn transform(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let clip = BOUNDS_THRESHOLD - f64::EPSILON;
        let p = self.rank(value).clamp(clip, 1.0 - clip);
        self.normal.inverse_cdf(p)
    }
}

/// `n` evenly spaced points from 0 to 1 inclusive; `[0.0]` when `n == 1`.
fn linspace_unit(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Fits and transforms `rates` with the default settings (1000 quantiles,
/// seed 42).
pub fn quantile_normalization(rates: &[f64]) -> Result<Vec<f64>> {
    QuantileNormalizer::default().fit_transform(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_rates_share_an_output() {
        let rates = [0.0001, 0.0001, 0.0001, -0.0005, 0.0009];
        let out = quantile_normalization(&rates).unwrap();

        assert_eq!(out.len(), rates.len());
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert!(out[3] < out[0]);
        assert!(out[0] < out[4]);
        // The tie sits on the median.
        assert!(out[0].abs() < 1e-9);
    }

    #[test]
    fn extremes_are_clipped_to_finite_values() {
        let out = quantile_normalization(&[-0.0005, 0.0001, 0.0009]).unwrap();
        assert!(out.iter().all(|v| v.is_finite()));
        assert!(out[0] < -5.0 && out[0] > -5.3);
        assert!(out[2] > 5.0 && out[2] < 5.3);
        assert!((out[0] + out[2]).abs() < 1e-6);
    }

    #[test]
    fn single_value_maps_to_zero() {
        assert_eq!(quantile_normalization(&[0.0003]).unwrap(), vec![0.0]);
    }

    #[test]
    fn constant_series_maps_to_zero() {
        let out = quantile_normalization(&[0.0001; 8]).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(quantile_normalization(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(matches!(
            quantile_normalization(&[0.1, f64::NAN]),
            Err(Error::NonFiniteValue(1))
        ));
    }

    #[test]
    fn quantile_count_is_capped() {
        let values: Vec<f64> = (0..2500).map(|i| i as f64).collect();
        let fitted = QuantileNormalizer::default().fit(&values).unwrap();
        assert_eq!(fitted.quantiles.len(), 1000);
        assert_eq!(fitted.references.first(), Some(&0.0));
        assert_eq!(fitted.references.last(), Some(&1.0));

        let small = QuantileNormalizer::default().fit(&values[..7]).unwrap();
        assert_eq!(small.quantiles.len(), 7);
    }

    #[test]
    fn uniform_ranks_look_standard_normal() {
        let values: Vec<f64> = (0..1001).map(|i| i as f64 / 1000.0).collect();
        let out = quantile_normalization(&values).unwrap();
        let inner = &out[1..out.len() - 1];
        let mean = inner.iter().sum::<f64>() / inner.len() as f64;
        let var = inner.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / inner.len() as f64;
        assert!(mean.abs() < 1e-6);
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
        // Median maps to zero, the 97.5% rank to about 1.96.
        assert!(out[500].abs() < 1e-9);
        assert!((out[975] - 1.96).abs() < 0.01);
    }

    #[test]
    fn subsampled_fit_is_reproducible() {
        let config = AnalysisConfig {
            subsample: 50,
            ..AnalysisConfig::default()
        };
        let values: Vec<f64> = (0..400).map(|i| ((i * 37) % 400) as f64 * 1e-6).collect();
        let a = QuantileNormalizer::new(&config).fit_transform(&values).unwrap();
        let b = QuantileNormalizer::new(&config).fit_transform(&values).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), values.len());
    }
}
