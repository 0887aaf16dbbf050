//! Simulation-based calibration rank histograms.
//!
//! Draw `k` parameter values from the prior, simulate data from each, and run
//! the sampler on each dataset to obtain `L` posterior draws. If the sampler
//! is correct, the position of each true value among its posterior draws is
//! uniform, so a histogram of those positions over `B` bins has
//! Binomial(k, 1/B) counts. Bins outside the 99% binomial band flag a
//! miscalibrated sampler.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, DiscreteCDF};

use crate::constants::{SBC_BAND_95, SBC_BAND_99};
use crate::error::{ConfigError, DataError, NumericalError, Result};

/// How a true value is assigned to a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinningMode {
    /// Rank of the truth among its posterior draws, scaled to `B` bins.
    #[default]
    Ranked,
    /// Bin edges placed at empirical quantiles of the posterior draws.
    Empirical,
}

/// Configuration of [`rank_histogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SbcConfig {
    /// Number of bins; `None` uses `L + 1`.
    pub bins: Option<usize>,
    /// Binning mode.
    pub mode: BinningMode,
}

impl SbcConfig {
    /// Set the number of bins.
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Set the binning mode.
    pub fn mode(mut self, mode: BinningMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Histogram of truth positions with binomial acceptance bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankHistogram {
    /// Count per bin.
    pub counts: Vec<usize>,
    /// Expected count per bin, `k / B`.
    pub expected: f64,
    /// 0.5% quantile of Binomial(k, 1/B).
    pub lower_99: u64,
    /// 99.5% quantile of Binomial(k, 1/B).
    pub upper_99: u64,
    /// 2.5% quantile of Binomial(k, 1/B).
    pub lower_95: u64,
    /// 97.5% quantile of Binomial(k, 1/B).
    pub upper_95: u64,
    /// Bins whose count falls outside the 99% band.
    pub missed: usize,
}

impl RankHistogram {
    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Whether every bin lies inside the 99% band.
    pub fn is_calibrated(&self) -> bool {
        self.missed == 0
    }
}

/// Build the rank histogram of `truths` against their posterior draws.
///
/// `posterior` holds `L` consecutive draws for each of the `k` truths, in the
/// same order as `truths`.
///
/// # Errors
///
/// - `InsufficientData` if there are no truths or no posterior draws.
/// - `DimensionMismatch` if `posterior.len()` is not a multiple of `k`.
/// - `NonFinite` if any value is NaN or infinite.
/// - `InvalidBinCount` unless `2 <= B <= k`.
pub fn rank_histogram(truths: &[f64], posterior: &[f64], config: &SbcConfig) -> Result<RankHistogram> {
    let k = truths.len();
    if k == 0 || posterior.is_empty() {
        return Err(DataError::InsufficientData {
            needed: 1,
            actual: 0,
        }
        .into());
    }
    if posterior.len() % k != 0 {
        return Err(DataError::DimensionMismatch {
            expected: (posterior.len() / k + 1) * k,
            actual: posterior.len(),
        }
        .into());
    }
    if let Some(index) = truths.iter().position(|v| !v.is_finite()) {
        return Err(DataError::NonFinite { index }.into());
    }
    if let Some(index) = posterior.iter().position(|v| !v.is_finite()) {
        return Err(DataError::NonFinite { index }.into());
    }

    let l = posterior.len() / k;
    let bins = config.bins.unwrap_or(l + 1);
    if bins < 2 || bins > k {
        return Err(ConfigError::InvalidBinCount {
            max: k,
            actual: bins,
        }
        .into());
    }

    let mut counts = vec![0usize; bins];
    let mut draws = Vec::with_capacity(l);
    for (truth, chunk) in truths.iter().zip(posterior.chunks_exact(l)) {
        draws.clear();
        draws.extend_from_slice(chunk);
        draws.sort_by(f64::total_cmp);

        let bin = match config.mode {
            BinningMode::Ranked => ranked_bin(&draws, *truth, bins),
            BinningMode::Empirical => empirical_bin(&draws, *truth, bins),
        };
        counts[bin] += 1;
    }

    let binomial = Binomial::new(1.0 / bins as f64, k as u64)
        .map_err(|e| NumericalError::Distribution(e.to_string()))?;
    let lower_99 = binomial.inverse_cdf(SBC_BAND_99.0);
    let upper_99 = binomial.inverse_cdf(SBC_BAND_99.1);
    let lower_95 = binomial.inverse_cdf(SBC_BAND_95.0);
    let upper_95 = binomial.inverse_cdf(SBC_BAND_95.1);

    let missed = counts
        .iter()
        .filter(|&&c| (c as u64) < lower_99 || (c as u64) > upper_99)
        .count();

    tracing::debug!(k, l, bins, missed, "rank histogram");

    Ok(RankHistogram {
        counts,
        expected: k as f64 / bins as f64,
        lower_99,
        upper_99,
        lower_95,
        upper_95,
        missed,
    })
}

/// `rank * B / (L + 1)` where rank counts draws strictly below the truth.
fn ranked_bin(sorted_draws: &[f64], truth: f64, bins: usize) -> usize {
    let rank = sorted_draws.partition_point(|&d| d < truth);
    (rank * bins / (sorted_draws.len() + 1)).min(bins - 1)
}

/// Bin edges at midpoints between neighbouring draws at the quantiles
/// `(b + 1) / B`; the truth falls in the bin of the first edge not below it.
fn empirical_bin(sorted_draws: &[f64], truth: f64, bins: usize) -> usize {
    let l = sorted_draws.len();
    let last = l - 1;
    let edges_below = (0..bins - 1)
        .map(|b| {
            let m = (l * (b + 1) / bins).min(last);
            (sorted_draws[m] + sorted_draws[(m + 1).min(last)]) / 2.0
        })
        .filter(|&edge| edge < truth)
        .count();
    edges_below.min(bins - 1)
}
