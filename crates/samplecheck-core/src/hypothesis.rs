//! Common contract of every hypothesis test.

use crate::error::{ConfigError, DataError, Result};
use crate::result::TestResult;
use crate::types::{SampleGroup, TestArity};

/// A statistical test that accepts sample groups and returns a [`TestResult`].
///
/// Implementations are configured at construction and immutable afterwards;
/// `perform_test` never mutates the test or its inputs, so one instance can
/// be shared across threads and invoked repeatedly.
pub trait HypothesisTest: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// How many sample groups the test consumes.
    fn arity(&self) -> TestArity;

    /// Run the test.
    ///
    /// # Errors
    ///
    /// `Configuration` if the groups do not match [`arity`](Self::arity),
    /// `Data` if the samples cannot support the test, `Numerical` if the
    /// computation breaks down.
    fn perform_test(&self, groups: &[SampleGroup]) -> Result<TestResult>;
}

/// Check that `groups` match `arity`: the right count, at least one column,
/// and a shared column count for two-sample tests.
pub fn check_groups(arity: TestArity, groups: &[SampleGroup]) -> Result<()> {
    let expected = arity.group_count();
    if groups.len() != expected {
        return Err(ConfigError::ArityMismatch {
            expected,
            actual: groups.len(),
        }
        .into());
    }

    let first = &groups[0];
    if first.dim() == 0 {
        return Err(DataError::ZeroDimension.into());
    }
    for other in &groups[1..] {
        if other.dim() != first.dim() {
            return Err(ConfigError::GroupDimensionMismatch {
                first: first.name.clone(),
                first_dim: first.dim(),
                second: other.name.clone(),
                second_dim: other.dim(),
            }
            .into());
        }
    }
    Ok(())
}
