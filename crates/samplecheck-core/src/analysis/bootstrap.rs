//! Distribution-free multivariate two-sample bootstrap test.
//!
//! Both groups are pooled into `N = n1 + n2` points. The multivariate
//! empirical CDF of a group at point `p` is the fraction of its points that
//! are componentwise `<= p`. The two CDFs are compared at every pooled
//! point:
//!
//! ```text
//! KS:  T = max_p |F1(p) - F2(p)|
//! CvM: T = Σ_p (F1(p) - F2(p))²
//! ```
//!
//! Under H0 the labels are exchangeable, so the null distribution of `T` is
//! approximated by drawing `n1` and `n2` indices with replacement from the
//! pooled sample and recomputing `T`. The p-value is the fraction of
//! resamples whose statistic strictly exceeds the observed one.
//!
//! Pairwise dominance is computed once into a [`DominanceTable`]; resamples
//! only index into it.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constants::{DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_BOOTSTRAP_PRINT_EVERY, DEFAULT_SEED};
use crate::error::{ConfigError, DataError, Result};
use crate::hypothesis::{check_groups, HypothesisTest};
use crate::result::{format_vector, Summary, TestResult};
use crate::statistics::stream_rng;
use crate::types::{SampleGroup, SampleMatrix, TestArity};

/// Discrepancy between the two empirical CDFs.
///
/// Deserializes through [`FromStr`], so `"KS"` and `"ks"` are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Criterion {
    /// Kolmogorov-Smirnov: largest absolute difference.
    #[default]
    Ks,
    /// Cramér-von Mises: sum of squared differences.
    Cvm,
}

impl FromStr for Criterion {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ks" => Ok(Criterion::Ks),
            "cvm" => Ok(Criterion::Cvm),
            _ => Err(ConfigError::UnknownCriterion(s.to_string())),
        }
    }
}

impl TryFrom<String> for Criterion {
    type Error = ConfigError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criterion::Ks => write!(f, "ks"),
            Criterion::Cvm => write!(f, "cvm"),
        }
    }
}

/// Configuration of [`BootstrapTwoSampleTest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples.
    ///
    /// Default: 1000. Must be greater than 1.
    pub n_boots: usize,

    /// CDF discrepancy measure.
    ///
    /// Default: [`Criterion::Ks`].
    pub criterion: Criterion,

    /// Emit a progress event every this many resamples; `None` disables it.
    ///
    /// Default: `Some(100)`.
    pub print_every: Option<usize>,

    /// Base seed of the per-resample RNG streams.
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_boots: DEFAULT_BOOTSTRAP_ITERATIONS,
            criterion: Criterion::default(),
            print_every: Some(DEFAULT_BOOTSTRAP_PRINT_EVERY),
            seed: DEFAULT_SEED,
        }
    }
}

impl BootstrapConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of resamples.
    pub fn n_boots(mut self, n_boots: usize) -> Self {
        self.n_boots = n_boots;
        self
    }

    /// Set the criterion.
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the progress cadence.
    pub fn print_every(mut self, print_every: Option<usize>) -> Self {
        self.print_every = print_every;
        self
    }

    /// Set the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.n_boots <= 1 {
            return Err(ConfigError::TooFewBootstraps(self.n_boots));
        }
        if self.print_every == Some(0) {
            return Err(ConfigError::InvalidPrintEvery);
        }
        Ok(())
    }
}

/// Pairwise componentwise dominance between pooled points.
///
/// Entry `(i, j)` is true iff every coordinate of point `i` is `<=` the
/// corresponding coordinate of point `j`. Points `0..n1` come from the first
/// group, `n1..N` from the second.
#[derive(Debug, Clone)]
pub struct DominanceTable {
    n: usize,
    cells: Vec<bool>,
}

impl DominanceTable {
    /// Build the table for the concatenation of `first` and `second`.
    pub fn from_groups(first: &SampleMatrix, second: &SampleMatrix) -> Self {
        let points: Vec<&[f64]> = first.rows().chain(second.rows()).collect();
        let n = points.len();
        let mut cells = vec![false; n * n];

        let fill_row = |i: usize, row: &mut [bool]| {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = points[i].iter().zip(points[j]).all(|(a, b)| a <= b);
            }
        };

        #[cfg(feature = "parallel")]
        cells
            .par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(i, row)| fill_row(i, row));

        #[cfg(not(feature = "parallel"))]
        cells
            .chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(i, row)| fill_row(i, row));

        Self { n, cells }
    }

    /// Number of pooled points.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether point `i` is componentwise `<=` point `j`.
    #[inline]
    pub fn dominated(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.n + j]
    }

    /// Fraction of `indices` whose point is componentwise `<=` point `at`.
    pub fn empirical_cdf(&self, indices: &[usize], at: usize) -> f64 {
        let count = indices.iter().filter(|&&k| self.dominated(k, at)).count();
        count as f64 / indices.len() as f64
    }

    /// Discrepancy between the CDFs of two index sets, evaluated at every
    /// point of `first` followed by every point of `second`.
    pub fn statistic(&self, criterion: Criterion, first: &[usize], second: &[usize]) -> f64 {
        let diffs = first
            .iter()
            .chain(second)
            .map(|&p| self.empirical_cdf(first, p) - self.empirical_cdf(second, p));
        match criterion {
            Criterion::Ks => diffs.fold(0.0, |acc, d| acc.max(d.abs())),
            Criterion::Cvm => diffs.map(|d| d * d).sum(),
        }
    }
}

/// Multivariate two-sample test with a bootstrapped null distribution.
#[derive(Debug, Clone)]
pub struct BootstrapTwoSampleTest {
    config: BootstrapConfig,
}

impl BootstrapTwoSampleTest {
    /// Create a test, validating the configuration.
    pub fn new(config: BootstrapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Statistic of the groups as labelled, without resampling.
    pub fn observed_statistic(&self, groups: &[SampleGroup]) -> Result<f64> {
        let (table, n1, n2) = self.prepare(groups)?;
        let (first, second) = true_labels(n1, n2);
        Ok(table.statistic(self.config.criterion, &first, &second))
    }

    fn prepare(&self, groups: &[SampleGroup]) -> Result<(DominanceTable, usize, usize)> {
        check_groups(TestArity::TwoSample, groups)?;
        for group in groups {
            if group.is_empty() {
                return Err(DataError::InsufficientData {
                    needed: 1,
                    actual: 0,
                }
                .into());
            }
            if let Some(index) = group.samples.first_non_finite() {
                return Err(DataError::NonFinite { index }.into());
            }
        }
        let (first, second) = (&groups[0].samples, &groups[1].samples);
        Ok((
            DominanceTable::from_groups(first, second),
            first.n_rows(),
            second.n_rows(),
        ))
    }

    /// Statistics of all resamples, indexed by iteration.
    fn resample(&self, table: &DominanceTable, n1: usize, n2: usize) -> Vec<f64> {
        let BootstrapConfig {
            n_boots,
            criterion,
            print_every,
            seed,
        } = self.config;
        let n = table.len();

        let one = |i: usize, first: &mut Vec<usize>, second: &mut Vec<usize>| {
            if print_every.is_some_and(|every| i % every == 0) {
                tracing::info!(iteration = i + 1, n_boots, "bootstrap resample");
            }
            let mut rng = stream_rng(seed, i as u64);
            first.clear();
            first.extend((0..n1).map(|_| rng.random_range(0..n)));
            second.clear();
            second.extend((0..n2).map(|_| rng.random_range(0..n)));
            table.statistic(criterion, first, second)
        };

        #[cfg(feature = "parallel")]
        let stats: Vec<f64> = (0..n_boots)
            .into_par_iter()
            .map_init(
                || (Vec::with_capacity(n1), Vec::with_capacity(n2)),
                |(first, second), i| one(i, first, second),
            )
            .collect();

        #[cfg(not(feature = "parallel"))]
        let stats: Vec<f64> = {
            let mut first = Vec::with_capacity(n1);
            let mut second = Vec::with_capacity(n2);
            (0..n_boots)
                .map(|i| one(i, &mut first, &mut second))
                .collect()
        };

        stats
    }
}

impl Default for BootstrapTwoSampleTest {
    fn default() -> Self {
        Self {
            config: BootstrapConfig::default(),
        }
    }
}

impl HypothesisTest for BootstrapTwoSampleTest {
    fn name(&self) -> &str {
        "bootstrap"
    }

    fn arity(&self) -> TestArity {
        TestArity::TwoSample
    }

    fn perform_test(&self, groups: &[SampleGroup]) -> Result<TestResult> {
        let (table, n1, n2) = self.prepare(groups)?;
        let (first, second) = true_labels(n1, n2);
        let observed = table.statistic(self.config.criterion, &first, &second);

        let boot_statistics = self.resample(&table, n1, n2);
        let exceedances = boot_statistics.iter().filter(|&&s| s > observed).count();
        let p_value = exceedances as f64 / self.config.n_boots as f64;

        tracing::debug!(
            criterion = %self.config.criterion,
            observed,
            exceedances,
            p_value,
            "bootstrap test complete"
        );

        let mut summary = Summary::new();
        summary.insert("criterion", self.config.criterion);
        summary.insert("statistic", observed);
        summary.insert("nBoots", self.config.n_boots);
        summary.insert("exceedances", exceedances);
        summary.insert("bootStatistics", format_vector(boot_statistics));

        Ok(TestResult::new(observed, p_value, summary))
    }
}

fn true_labels(n1: usize, n2: usize) -> (Vec<usize>, Vec<usize>) {
    ((0..n1).collect(), (n1..n1 + n2).collect())
}
