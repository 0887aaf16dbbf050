//! Likelihood-ratio test that a multivariate normal sample has zero mean.
//!
//! H0: `x ~ N(0, Σ)`, fitted by maximum likelihood as `Σ = M = (1/n) Σ xxᵀ`.
//! H1: `x ~ N(μ, Σ)`, fitted as `μ̂` and the population covariance `Ĉ`.
//!
//! `G = 2 (ℓ₁ - ℓ₀)` is asymptotically χ² with `d` degrees of freedom under
//! H0, so `p = 1 - F_χ²(d)(G)`.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{DataError, NumericalError, Result};
use crate::hypothesis::{check_groups, HypothesisTest};
use crate::result::{format_matrix, format_vector, Summary, TestResult};
use crate::statistics::SampleMoments;
use crate::types::{SampleGroup, TestArity, Vector};

use super::gaussian::GaussianModel;

/// Minimum number of observations.
const MIN_OBSERVATIONS: usize = 2;

/// One-sample likelihood-ratio test of a zero mean vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroMeanGaussianTest;

impl ZeroMeanGaussianTest {
    /// Create the test. It has no parameters.
    pub fn new() -> Self {
        Self
    }
}

impl HypothesisTest for ZeroMeanGaussianTest {
    fn name(&self) -> &str {
        "zero-mean-gaussian"
    }

    fn arity(&self) -> TestArity {
        TestArity::OneSample
    }

    fn perform_test(&self, groups: &[SampleGroup]) -> Result<TestResult> {
        check_groups(TestArity::OneSample, groups)?;
        let samples = &groups[0].samples;
        if samples.n_rows() < MIN_OBSERVATIONS {
            return Err(DataError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                actual: samples.n_rows(),
            }
            .into());
        }

        let moments = SampleMoments::from_samples(samples)?;
        let d = moments.dim();

        let null = GaussianModel::new(Vector::zeros(d), moments.second_moment.clone())?;
        let alternative = GaussianModel::new(moments.mean.clone(), moments.covariance.clone())?;

        let h0_log_likelihood = null.log_likelihood(samples)?;
        let h1_log_likelihood = alternative.log_likelihood(samples)?;
        let statistic = 2.0 * (h1_log_likelihood - h0_log_likelihood);

        let chi2 = ChiSquared::new(d as f64)
            .map_err(|e| NumericalError::Distribution(e.to_string()))?;
        let p_value = 1.0 - chi2.cdf(statistic.max(0.0));

        tracing::debug!(
            n = moments.n,
            d,
            statistic,
            p_value,
            "zero-mean likelihood-ratio test"
        );

        let mut summary = Summary::new();
        summary.insert("sampleMean", format_vector(moments.mean.iter().copied()));
        summary.insert("sampleCov", format_matrix(&moments.covariance));
        summary.insert("nullCov", format_matrix(&moments.second_moment));
        summary.insert("df", d);
        summary.insert("h0LogLikelihood", h0_log_likelihood);
        summary.insert("h1LogLikelihood", h1_log_likelihood);
        summary.insert("testStatistic", statistic);

        Ok(TestResult::new(statistic, p_value, summary))
    }
}
