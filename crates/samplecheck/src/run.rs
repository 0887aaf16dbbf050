//! Sampling loop and pass/fail decision.
//!
//! A [`ValidationRun`] advances every [`Sampler`] once per iteration, asks
//! every [`FeatureExtractor`] for a feature vector, and stacks those vectors
//! into one sample matrix per extractor. After the last iteration the
//! matrices go to a [`HypothesisTest`] and the p-value is compared against
//! the significance level.

use serde::Serialize;
use thiserror::Error;

use samplecheck_core::{
    ConfigError, DataError, Error, ErrorKind, HypothesisTest, SampleGroup, SampleMatrix,
    TestArity, TestResult,
};

use crate::config::RunConfig;

/// Error type returned by user-supplied samplers and extractors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Something that produces a new state on demand.
pub trait Sampler {
    /// Move to the state for iteration `sample_index`.
    fn next_state(&mut self, sample_index: usize) -> Result<(), BoxError>;
}

/// Something that turns the current state into a fixed-length feature vector.
pub trait FeatureExtractor {
    /// Label of the sample group built from this extractor.
    fn name(&self) -> &str {
        "features"
    }

    /// Length of every vector returned by
    /// [`extract_features`](Self::extract_features).
    fn dimension(&self) -> usize;

    /// Features of the state for iteration `sample_index`.
    fn extract_features(&mut self, sample_index: usize) -> Result<Vec<f64>, BoxError>;
}

/// Failure of a validation run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration, data or numerical failure.
    #[error(transparent)]
    Core(#[from] Error),

    /// A sampler returned an error.
    #[error("sampler {sampler} failed at sample {sample_index}: {source}")]
    Sampler {
        /// Position of the sampler in the run.
        sampler: usize,
        /// Iteration at which it failed.
        sample_index: usize,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// A feature extractor returned an error.
    #[error("feature extractor '{name}' failed at sample {sample_index}: {source}")]
    Extractor {
        /// Name of the extractor.
        name: String,
        /// Iteration at which it failed.
        sample_index: usize,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Core(e.into())
    }
}

impl From<DataError> for RunError {
    fn from(e: DataError) -> Self {
        RunError::Core(e.into())
    }
}

impl RunError {
    /// Family of a core error; `None` for sampler and extractor failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RunError::Core(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Outcome of the pass/fail decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// `p_value >= alpha`: no evidence against the sampler.
    Pass,
    /// `p_value < alpha`: the null hypothesis is rejected.
    Fail,
}

impl Verdict {
    /// Decide at significance level `alpha`.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASSED"),
            Verdict::Fail => write!(f, "FAILED"),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Name of the hypothesis test.
    pub test: String,
    /// Pass or fail.
    pub verdict: Verdict,
    /// Significance level used.
    pub alpha: f64,
    /// Rows per sample matrix.
    pub n_samples: usize,
    /// The test's statistic, p-value and diagnostics.
    pub result: TestResult,
}

impl ValidationReport {
    /// Whether the run passed.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// A configured validation run.
pub struct ValidationRun {
    config: RunConfig,
    samplers: Vec<Box<dyn Sampler>>,
    extractors: Vec<Box<dyn FeatureExtractor>>,
    test: Box<dyn HypothesisTest>,
}

impl std::fmt::Debug for ValidationRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRun")
            .field("config", &self.config)
            .field("samplers", &self.samplers.len())
            .field("extractors", &self.extractors.len())
            .field("test", &self.test.name())
            .finish()
    }
}

impl ValidationRun {
    /// Assemble a run, rejecting any inconsistent setup before sampling.
    ///
    /// # Errors
    ///
    /// `Configuration` if the config is out of range, there is no sampler
    /// or extractor, the number of extractors differs from the test arity,
    /// or two-sample extractors disagree on dimension. `Data` if an
    /// extractor has dimension zero.
    pub fn new(
        config: RunConfig,
        samplers: Vec<Box<dyn Sampler>>,
        extractors: Vec<Box<dyn FeatureExtractor>>,
        test: Box<dyn HypothesisTest>,
    ) -> Result<Self, RunError> {
        config.validate()?;
        if samplers.is_empty() {
            return Err(ConfigError::NoSamplers.into());
        }
        if extractors.is_empty() {
            return Err(ConfigError::NoExtractors.into());
        }

        let arity = test.arity();
        if extractors.len() != arity.group_count() {
            return Err(ConfigError::ArityMismatch {
                expected: arity.group_count(),
                actual: extractors.len(),
            }
            .into());
        }

        let first = &extractors[0];
        if first.dimension() == 0 {
            return Err(DataError::ZeroDimension.into());
        }
        if arity == TestArity::TwoSample {
            for other in &extractors[1..] {
                if other.dimension() != first.dimension() {
                    return Err(ConfigError::GroupDimensionMismatch {
                        first: first.name().to_string(),
                        first_dim: first.dimension(),
                        second: other.name().to_string(),
                        second_dim: other.dimension(),
                    }
                    .into());
                }
            }
        }

        Ok(Self {
            config,
            samplers,
            extractors,
            test,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Draw the samples, run the test and decide.
    pub fn run(&mut self) -> Result<ValidationReport, RunError> {
        let groups = self.collect()?;

        tracing::info!(test = self.test.name(), "performing test");
        let result = self.test.perform_test(&groups)?;
        let verdict = Verdict::from_p_value(result.p_value(), self.config.alpha);

        tracing::info!(
            test = self.test.name(),
            %verdict,
            p_value = result.p_value(),
            alpha = self.config.alpha,
            "validation complete"
        );

        Ok(ValidationReport {
            test: self.test.name().to_string(),
            verdict,
            alpha: self.config.alpha,
            n_samples: self.config.n_samples,
            result,
        })
    }

    /// Run the sampling loop, one matrix per extractor.
    fn collect(&mut self) -> Result<Vec<SampleGroup>, RunError> {
        let n_samples = self.config.n_samples;
        let mut matrices: Vec<SampleMatrix> = self
            .extractors
            .iter()
            .map(|e| SampleMatrix::with_capacity(e.dimension(), n_samples))
            .collect();

        tracing::info!(n_samples, samplers = self.samplers.len(), "sampling");

        for i in 0..n_samples {
            if self.config.print_every.is_some_and(|every| i % every == 0) {
                tracing::info!(sample = i + 1, n_samples, "sampling progress");
            }

            for (s, sampler) in self.samplers.iter_mut().enumerate() {
                sampler.next_state(i).map_err(|source| RunError::Sampler {
                    sampler: s,
                    sample_index: i,
                    source,
                })?;
            }

            for (extractor, matrix) in self.extractors.iter_mut().zip(&mut matrices) {
                let features =
                    extractor
                        .extract_features(i)
                        .map_err(|source| RunError::Extractor {
                            name: extractor.name().to_string(),
                            sample_index: i,
                            source,
                        })?;
                matrix.push_row(&features)?;
            }
        }

        Ok(self
            .extractors
            .iter()
            .zip(matrices)
            .map(|(e, samples)| SampleGroup::new(e.name(), samples))
            .collect())
    }
}
