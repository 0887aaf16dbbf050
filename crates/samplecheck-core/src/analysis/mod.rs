//! Hypothesis tests and calibration diagnostics.
//!
//! - [`gaussian`]: multivariate normal density
//! - [`bootstrap`]: distribution-free multivariate two-sample test
//! - [`zero_mean`]: one-sample likelihood-ratio test of a zero mean
//! - [`ks_test`]: column-wise two-sample Kolmogorov-Smirnov test
//! - [`sbc`]: simulation-based calibration rank histograms
//! - [`coverage`]: coverage of posterior HPD intervals

pub mod bootstrap;
pub mod coverage;
pub mod gaussian;
pub mod sbc;
pub mod zero_mean;

pub use bootstrap::{BootstrapConfig, BootstrapTwoSampleTest, Criterion, DominanceTable};
pub use coverage::{acceptance_interval, hpd_coverage, CoverageReport, HpdEstimate, ParameterKind};
pub use gaussian::GaussianModel;
pub use ks_test::KolmogorovSmirnovTest;
pub use sbc::{rank_histogram, BinningMode, RankHistogram, SbcConfig};
pub use zero_mean::ZeroMeanGaussianTest;
