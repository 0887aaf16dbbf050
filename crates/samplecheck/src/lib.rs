//! # samplecheck
//!
//! Statistical validation of stochastic samplers.
//!
//! A sampler under test is driven for a fixed number of iterations; after
//! each iteration one or more feature extractors turn its state into a
//! numeric vector. The stacked vectors are handed to a hypothesis test and
//! the run fails when the p-value drops below the significance level.
//!
//! - One-sample tests check a property of the target distribution (e.g.
//!   [`ZeroMeanGaussianTest`] for features with known zero mean).
//! - Two-sample tests compare the sampler under test with a reference
//!   sampler ([`BootstrapTwoSampleTest`], [`KolmogorovSmirnovTest`]).
//!
//! ## Quick Start
//!
//! ```ignore
//! use samplecheck::{BootstrapTwoSampleTest, RunConfig, ValidationRun};
//!
//! let mut run = ValidationRun::new(
//!     RunConfig::new().n_samples(2000),
//!     vec![Box::new(reference), Box::new(candidate)],
//!     vec![Box::new(reference_features), Box::new(candidate_features)],
//!     Box::new(BootstrapTwoSampleTest::default()),
//! )?;
//! let report = run.run()?;
//! println!("{}", samplecheck::output::format_report(&report));
//! assert!(report.passed());
//! ```
//!
//! Progress and diagnostics are emitted through `tracing`; install a
//! subscriber to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod run;

pub mod data;
pub mod output;

pub use config::{RunConfig, DEFAULT_ALPHA, DEFAULT_N_SAMPLES, DEFAULT_PRINT_EVERY};
pub use run::{BoxError, FeatureExtractor, RunError, Sampler, ValidationReport, ValidationRun, Verdict};

// Re-export the tests and core types so users need a single dependency
pub use samplecheck_core::analysis::{
    acceptance_interval, hpd_coverage, BootstrapConfig, BootstrapTwoSampleTest, CoverageReport,
    Criterion, GaussianModel, HpdEstimate, KolmogorovSmirnovTest, ParameterKind, ZeroMeanGaussianTest,
};
pub use samplecheck_core::{
    Error, ErrorKind, HypothesisTest, SampleGroup, SampleMatrix, Summary, TestArity, TestResult,
};
