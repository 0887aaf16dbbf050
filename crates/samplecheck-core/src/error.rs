//! Error taxonomy for hypothesis tests.
//!
//! Every failure belongs to one of three families:
//!
//! - [`ConfigError`]: the test or run was set up with invalid parameters.
//!   Detected before any computation.
//! - [`NumericalError`]: the computation itself broke down (non positive
//!   definite covariance, singular matrix, non-convergent series).
//! - [`DataError`]: the supplied samples cannot support the test.
//!
//! None of these mean "the hypothesis was rejected". They mean the
//! validation could not be completed.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration or test setup.
    Configuration,
    /// Numerical breakdown during computation.
    Numerical,
    /// Insufficient or malformed data.
    Data,
}

/// Any failure produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Numerical failure.
    #[error("numerical failure: {0}")]
    Numerical(#[from] NumericalError),

    /// Data failure.
    #[error("invalid data: {0}")]
    Data(#[from] DataError),
}

impl Error {
    /// Which family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Numerical(_) => ErrorKind::Numerical,
            Error::Data(_) => ErrorKind::Data,
        }
    }
}

/// Invalid configuration or test setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Significance level outside (0, 1).
    #[error("alpha must be in (0, 1), got {0}")]
    AlphaOutOfRange(f64),

    /// Bootstrap needs at least two resamples.
    #[error("n_boots must be greater than 1, got {0}")]
    TooFewBootstraps(usize),

    /// Criterion name not recognised.
    #[error("unknown criterion '{0}', expected 'ks' or 'cvm'")]
    UnknownCriterion(String),

    /// Progress cadence must be at least one when enabled.
    #[error("print_every must be 1 or greater")]
    InvalidPrintEvery,

    /// Number of sample groups does not match the test arity.
    #[error("test expects {expected} sample group(s) but {actual} were given")]
    ArityMismatch {
        /// Groups required by the test.
        expected: usize,
        /// Groups supplied.
        actual: usize,
    },

    /// Sample groups have different column counts.
    #[error("sample groups must share a dimension: '{first}' has {first_dim}, '{second}' has {second_dim}")]
    GroupDimensionMismatch {
        /// Name of the first group.
        first: String,
        /// Column count of the first group.
        first_dim: usize,
        /// Name of the offending group.
        second: String,
        /// Column count of the offending group.
        second_dim: usize,
    },

    /// A run needs at least one sampler.
    #[error("there must be at least one sampler")]
    NoSamplers,

    /// A run needs at least one feature extractor.
    #[error("there must be at least one feature extractor")]
    NoExtractors,

    /// Too few sampling iterations requested.
    #[error("n_samples must be at least {min}, got {actual}")]
    TooFewSamples {
        /// Minimum number of iterations.
        min: usize,
        /// Requested number of iterations.
        actual: usize,
    },

    /// Coverage level outside (0, 1).
    #[error("coverage level must be in (0, 1), got {0}")]
    InvalidCoverageLevel(f64),

    /// Parameter kind not recognised.
    #[error("unknown parameter kind '{0}', expected 'd', 'c' or 'b'")]
    UnknownParameterKind(String),

    /// Histogram bin count outside the admissible range.
    #[error("bin count must be in [2, {max}], got {actual}")]
    InvalidBinCount {
        /// Largest admissible bin count.
        max: usize,
        /// Requested bin count.
        actual: usize,
    },
}

/// Numerical breakdown during a computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    /// Covariance has a negative eigenvalue.
    #[error("matrix is not positive semi-definite: eigenvalue {index} is {eigenvalue:e}")]
    NonPositiveDefinite {
        /// Offending eigenvalue.
        eigenvalue: f64,
        /// Position of the eigenvalue in the decomposition.
        index: usize,
    },

    /// Covariance has a (numerically) zero eigenvalue and cannot be inverted.
    #[error("matrix is singular: eigenvalue {index} is {eigenvalue:e}")]
    SingularMatrix {
        /// Offending eigenvalue.
        eigenvalue: f64,
        /// Position of the eigenvalue in the decomposition.
        index: usize,
    },

    /// An infinite series did not converge within its iteration cap.
    #[error("series failed to converge within {iterations} iterations")]
    Convergence {
        /// Iteration cap that was reached.
        iterations: u64,
    },

    /// Ties survived every round of jitter.
    #[error("internal error: ties remain after {attempts} rounds of jitter")]
    TiesUnresolved {
        /// Rounds of jitter attempted.
        attempts: usize,
    },

    /// A reference distribution could not be constructed.
    #[error("reference distribution: {0}")]
    Distribution(String),
}

/// Insufficient or malformed data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Not enough observations for the requested computation.
    #[error("insufficient data: need at least {needed} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations.
        needed: usize,
        /// Observations supplied.
        actual: usize,
    },

    /// A vector or matrix has the wrong shape.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A covariance matrix is not symmetric.
    #[error("matrix is not symmetric at ({row}, {col})")]
    NotSymmetric {
        /// Row of the first asymmetric entry.
        row: usize,
        /// Column of the first asymmetric entry.
        col: usize,
    },

    /// Samples contain NaN or infinity.
    #[error("sample contains a non-finite value at position {index}")]
    NonFinite {
        /// Position of the first offending value.
        index: usize,
    },

    /// Feature vectors must have at least one component.
    #[error("samples must have at least one dimension")]
    ZeroDimension,
}
