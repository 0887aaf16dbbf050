//! Statistical building blocks shared by the hypothesis tests.
//!
//! - Two-sample Kolmogorov-Smirnov statistic and p-values
//! - Sample moments (mean, second moment, population covariance)
//! - Binomial coefficients for exact path counting
//! - Counter-based RNG streams for reproducible resampling

mod binomial;
mod ks;
mod moments;
mod rng;

pub use binomial::{binomial_coefficient, binomial_coefficient_f64};
pub use ks::{approximate_p, exact_p, ks_statistic, ks_sum, KsOutcome, PValueMethod, TwoSampleKs};
pub use moments::SampleMoments;
pub use rng::{counter_rng_seed, stream_rng};
