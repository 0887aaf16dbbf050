//! Configuration of a validation run.

use serde::{Deserialize, Serialize};

use samplecheck_core::ConfigError;

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 1e-3;

/// Default number of sampling iterations.
pub const DEFAULT_N_SAMPLES: usize = 1000;

/// Default cadence of sampling progress events.
pub const DEFAULT_PRINT_EVERY: usize = 100;

/// Parameters of a [`ValidationRun`](crate::ValidationRun).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Significance level. The run fails iff `p_value < alpha`.
    ///
    /// Default: 1e-3. Must lie in (0, 1).
    pub alpha: f64,

    /// Number of sampling iterations, i.e. rows per sample matrix.
    ///
    /// Default: 1000. Must be at least 2.
    pub n_samples: usize,

    /// Emit a progress event every this many iterations; `None` disables it.
    ///
    /// Default: `Some(100)`.
    pub print_every: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            n_samples: DEFAULT_N_SAMPLES,
            print_every: Some(DEFAULT_PRINT_EVERY),
        }
    }
}

impl RunConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the number of sampling iterations.
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set the progress cadence.
    pub fn print_every(mut self, print_every: Option<usize>) -> Self {
        self.print_every = print_every;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Also rejects NaN.
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::AlphaOutOfRange(self.alpha));
        }
        if self.n_samples < 2 {
            return Err(ConfigError::TooFewSamples {
                min: 2,
                actual: self.n_samples,
            });
        }
        if self.print_every == Some(0) {
            return Err(ConfigError::InvalidPrintEvery);
        }
        Ok(())
    }
}
