//! Statistical core for validating stochastic samplers.
//!
//! A sampler is validated by collecting feature vectors from its output and
//! testing them against a reference: either a second sampler known to be
//! correct (two-sample tests) or a closed-form property of the target
//! distribution (one-sample tests). This crate holds the tests themselves;
//! the `samplecheck` crate drives samplers and renders verdicts.
//!
//! # Features
//!
//! - `parallel`: build the dominance table and run bootstrap resamples on
//!   the rayon pool. Results are identical to the sequential build.
//!
//! # Usage
//!
//! ```ignore
//! use samplecheck_core::{
//!     analysis::{BootstrapConfig, BootstrapTwoSampleTest, Criterion},
//!     HypothesisTest, SampleGroup, SampleMatrix,
//! };
//!
//! let test = BootstrapTwoSampleTest::new(BootstrapConfig::new().criterion(Criterion::Cvm))?;
//! let result = test.perform_test(&[reference, candidate])?;
//! println!("p = {}", result.p_value());
//! ```

pub mod analysis;
pub mod constants;
pub mod error;
pub mod hypothesis;
pub mod result;
pub mod statistics;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ConfigError, DataError, Error, ErrorKind, NumericalError, Result};
pub use hypothesis::{check_groups, HypothesisTest};
pub use result::{Summary, TestResult};
pub use types::{Matrix, SampleGroup, SampleMatrix, TestArity, Vector};
