//! Numerical constants and configuration defaults used throughout the crate.

/// Default deterministic seed for RNG operations.
///
/// Same seed + same data = same p-value. The value `0x73616D706C65` is
/// "sample" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x73616D706C65;

/// Natural log of 2*pi, used in multivariate normal log-density computation.
pub const LOG_2PI: f64 = 1.8378770664093453;

// =============================================================================
// Kolmogorov-Smirnov
// =============================================================================

/// Below this value of `n * m` the exact KS distribution is used.
pub const LARGE_SAMPLE_PRODUCT: u64 = 10_000;

/// Stop summing the Kolmogorov series once a term drops below this value.
pub const KS_SUM_TOLERANCE: f64 = 1e-20;

/// Maximum number of terms of the Kolmogorov series.
pub const KS_SUM_MAX_ITERATIONS: u64 = 100_000;

/// Statistics closer than this are considered equal when deriving the
/// integral lattice bound for the exact p-value.
pub const KS_D_TOLERANCE: f64 = 1e-12;

/// Maximum rounds of jitter applied when breaking ties.
pub const MAX_TIE_BREAK_ATTEMPTS: usize = 1000;

// =============================================================================
// Linear algebra
// =============================================================================

/// Relative tolerance applied to covariance eigenvalues.
///
/// Eigenvalues below `-EIGEN_TOLERANCE * scale` make a matrix non positive
/// semi-definite, eigenvalues with magnitude below `EIGEN_TOLERANCE * scale`
/// make it singular, where `scale = max |λ|`.
pub const EIGEN_TOLERANCE: f64 = 1e-12;

/// Relative tolerance for the covariance symmetry check.
pub const SYMMETRY_TOLERANCE: f64 = 1e-10;

// =============================================================================
// Default configuration constants
// =============================================================================

/// Default number of bootstrap resamples.
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 1000;

/// Default cadence of bootstrap progress events.
pub const DEFAULT_BOOTSTRAP_PRINT_EVERY: usize = 100;

/// Binomial quantiles delimiting the 99% band of a calibration histogram.
pub const SBC_BAND_99: (f64, f64) = (0.005, 0.995);

/// Binomial quantiles delimiting the 95% band of a calibration histogram.
pub const SBC_BAND_95: (f64, f64) = (0.025, 0.975);

/// Nominal coverage of the posterior HPD intervals checked by coverage
/// analysis.
pub const COVERAGE_LEVEL: f64 = 0.95;
