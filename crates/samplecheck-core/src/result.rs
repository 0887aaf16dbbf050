//! Result of a hypothesis test.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered string-keyed diagnostics attached to a [`TestResult`].
///
/// Keys keep their insertion order so that reports list diagnostics in the
/// order the test produced them. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    entries: Vec<(String, String)>,
}

impl Summary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a diagnostic value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the summary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Outcome of one hypothesis test invocation.
///
/// Only produced by a completed test, so the p-value is always meaningful.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TestResult {
    statistic: f64,
    p_value: f64,
    summary: Summary,
}

impl TestResult {
    /// Bundle a statistic, its p-value and diagnostics.
    ///
    /// The p-value is clamped to [0, 1] to absorb floating-point round-off
    /// (e.g. `1 - 1.0000000000000002`).
    pub fn new(statistic: f64, p_value: f64, summary: Summary) -> Self {
        Self {
            statistic,
            p_value: p_value.clamp(0.0, 1.0),
            summary,
        }
    }

    /// The test statistic.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// The p-value, in [0, 1].
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Diagnostics for external logging or plotting.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Render a slice as `[a, b, c]`.
pub(crate) fn format_vector(values: impl IntoIterator<Item = f64>) -> String {
    let parts: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Render a matrix as nested rows, `[[a, b], [c, d]]`.
pub(crate) fn format_matrix(matrix: &crate::types::Matrix) -> String {
    let rows: Vec<String> = matrix
        .row_iter()
        .map(|row| format_vector(row.iter().copied()))
        .collect();
    format!("[{}]", rows.join(", "))
}
