//! Coverage of posterior HPD intervals.
//!
//! For `k` independent runs, each started from a true parameter value drawn
//! from the prior, a correct sampler puts the truth inside its 95% HPD
//! interval with probability 0.95. The number of covered truths is then
//! Binomial(k, 0.95), and a count outside the highest-density 95% region of
//! that distribution flags a miscalibrated sampler.
//!
//! Binary parameters have no interval; a run covers the truth when the
//! posterior mean does not put more than 95% of its mass on the wrong value.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete};

use crate::constants::COVERAGE_LEVEL;
use crate::error::{ConfigError, DataError, NumericalError, Result};

/// How the posterior estimate of a parameter is compared with its truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Real valued; covered when the truth lies inside the HPD interval.
    #[default]
    Continuous,
    /// Category index; treated like a continuous value.
    Categorical,
    /// 0/1 indicator; covered when the posterior mean is not confidently
    /// wrong.
    Binary,
}

impl FromStr for ParameterKind {
    type Err = ConfigError;

    /// Accepts the one-letter type codes `d`, `c` and `b` as well as the
    /// full names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "continuous" => Ok(ParameterKind::Continuous),
            "c" | "categorical" => Ok(ParameterKind::Categorical),
            "b" | "binary" => Ok(ParameterKind::Binary),
            _ => Err(ConfigError::UnknownParameterKind(s.to_string())),
        }
    }
}

/// Posterior summary of one parameter in one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HpdEstimate {
    /// Posterior mean.
    pub mean: f64,
    /// Lower bound of the 95% HPD interval.
    pub lower: f64,
    /// Upper bound of the 95% HPD interval.
    pub upper: f64,
    /// Effective sample size of the run, if a valid estimate exists.
    pub ess: Option<f64>,
}

/// Coverage of one parameter over all runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Number of runs.
    pub runs: usize,
    /// Runs whose estimate covers the truth.
    pub covered: usize,
    /// Runs whose truth exceeds the posterior mean. Always 0 for binary
    /// parameters.
    pub truth_above_mean: usize,
    /// Inclusive range of `covered` counts a calibrated sampler produces
    /// with 95% probability.
    pub acceptance: (usize, usize),
    /// Indices of the runs that missed.
    pub misses: Vec<usize>,
    /// Mean of the valid ESS values.
    pub mean_ess: Option<f64>,
    /// Smallest valid ESS value.
    pub min_ess: Option<f64>,
    /// Runs without a valid ESS.
    pub invalid_ess: usize,
}

impl CoverageReport {
    /// Whether `covered` lies inside the acceptance range.
    pub fn within_acceptance(&self) -> bool {
        let (lo, hi) = self.acceptance;
        (lo..=hi).contains(&self.covered)
    }
}

/// Highest-density region of Binomial(`runs`, `level`) holding at least
/// `level` of its mass.
///
/// Starts at `floor(level * runs)` and repeatedly extends towards the more
/// probable neighbour until the mass is reached.
///
/// # Errors
///
/// - `InvalidCoverageLevel` unless `0 < level < 1`.
/// - `InsufficientData` if `runs` is zero.
pub fn acceptance_interval(runs: usize, level: f64) -> Result<(usize, usize)> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ConfigError::InvalidCoverageLevel(level).into());
    }
    if runs == 0 {
        return Err(DataError::InsufficientData {
            needed: 1,
            actual: 0,
        }
        .into());
    }

    let binomial = Binomial::new(level, runs as u64)
        .map_err(|e| NumericalError::Distribution(e.to_string()))?;
    let pmf = |k: usize| binomial.pmf(k as u64);

    let mut lo = ((level * runs as f64) as usize).min(runs);
    let mut hi = lo;
    let mut mass = pmf(lo);
    while mass < level && (lo > 0 || hi < runs) {
        if hi == runs || (lo > 0 && pmf(lo - 1) > pmf(hi + 1)) {
            lo -= 1;
            mass += pmf(lo);
        } else {
            hi += 1;
            mass += pmf(hi);
        }
    }
    Ok((lo, hi))
}

/// Count how often the posterior summaries cover their true values.
///
/// `estimates[i]` summarises the run started from `truths[i]`.
///
/// # Errors
///
/// - `InsufficientData` if there are no runs.
/// - `DimensionMismatch` if the slices differ in length.
/// - `NonFinite` if a truth is NaN or infinite.
pub fn hpd_coverage(
    truths: &[f64],
    estimates: &[HpdEstimate],
    kind: ParameterKind,
) -> Result<CoverageReport> {
    if estimates.len() != truths.len() {
        return Err(DataError::DimensionMismatch {
            expected: truths.len(),
            actual: estimates.len(),
        }
        .into());
    }
    if let Some(index) = truths.iter().position(|v| !v.is_finite()) {
        return Err(DataError::NonFinite { index }.into());
    }
    let acceptance = acceptance_interval(truths.len(), COVERAGE_LEVEL)?;

    let mut covered = 0;
    let mut truth_above_mean = 0;
    let mut misses = Vec::new();
    for (i, (&truth, estimate)) in truths.iter().zip(estimates).enumerate() {
        let hit = match kind {
            ParameterKind::Binary if truth == 0.0 => estimate.mean < COVERAGE_LEVEL,
            ParameterKind::Binary => estimate.mean > 1.0 - COVERAGE_LEVEL,
            ParameterKind::Continuous | ParameterKind::Categorical => {
                if truth > estimate.mean {
                    truth_above_mean += 1;
                }
                estimate.lower <= truth && truth <= estimate.upper
            }
        };
        if hit {
            covered += 1;
        } else {
            misses.push(i);
        }
    }

    let valid_ess: Vec<f64> = estimates
        .iter()
        .filter_map(|e| e.ess)
        .filter(|v| v.is_finite())
        .collect();
    let invalid_ess = estimates.len() - valid_ess.len();
    if invalid_ess > 0 {
        tracing::warn!(invalid_ess, "runs without a valid ESS estimate");
    }
    let mean_ess = (!valid_ess.is_empty()).then(|| valid_ess.iter().sum::<f64>() / valid_ess.len() as f64);
    let min_ess = valid_ess.iter().copied().reduce(f64::min);

    tracing::debug!(
        runs = truths.len(),
        covered,
        lo = acceptance.0,
        hi = acceptance.1,
        "HPD coverage"
    );

    Ok(CoverageReport {
        runs: truths.len(),
        covered,
        truth_above_mean,
        acceptance,
        misses,
        mean_ess,
        min_ess,
        invalid_ess,
    })
}
