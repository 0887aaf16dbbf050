//! Tab-separated trace logs.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use samplecheck_core::statistics::{stream_rng, TwoSampleKs};

use super::TraceError;

/// A trace log held column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLog {
    labels: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TraceLog {
    /// Column labels in file order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.labels.len()
    }

    /// Number of retained rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Values of column `i`.
    pub fn column(&self, i: usize) -> &[f64] {
        &self.columns[i]
    }

    /// Values of the column labelled `label`.
    pub fn trace(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Load a trace log from disk, discarding the first `burn_in_percentage`
/// percent of rows.
pub fn load_trace_log(path: &Path, burn_in_percentage: usize) -> Result<TraceLog, TraceError> {
    let file = File::open(path)?;
    parse_trace_log(BufReader::new(file), burn_in_percentage)
}

/// Parse a trace log from any buffered reader.
pub fn parse_trace_log<R: BufRead>(reader: R, burn_in_percentage: usize) -> Result<TraceLog, TraceError> {
    if burn_in_percentage >= 100 {
        return Err(TraceError::InvalidBurnIn(burn_in_percentage));
    }

    let mut labels: Option<Vec<String>> = None;
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim_end();

        // Skip empty lines and comments
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if labels.is_none() {
            columns = vec![Vec::new(); fields.len()];
            labels = Some(fields.iter().map(|s| s.to_string()).collect());
            continue;
        }

        if fields.len() != columns.len() {
            return Err(TraceError::RaggedRow {
                line: line_num + 1,
                expected: columns.len(),
                found: fields.len(),
            });
        }
        for (column, field) in columns.iter_mut().zip(&fields) {
            let value: f64 = field.parse().map_err(|_| TraceError::Parse {
                line: line_num + 1,
                value: field.to_string(),
            })?;
            column.push(value);
        }
    }

    let labels = labels.ok_or(TraceError::MissingHeader)?;
    let n_rows = columns.first().map_or(0, Vec::len);
    let burn_in = n_rows * burn_in_percentage / 100;
    for column in &mut columns {
        column.drain(..burn_in);
    }

    tracing::debug!(
        columns = labels.len(),
        rows = n_rows - burn_in,
        burn_in,
        "loaded trace log"
    );

    Ok(TraceLog { labels, columns })
}

/// KS comparison of one column pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnComparison {
    /// Label of the column in the first trace.
    pub label: String,
    /// KS statistic.
    pub statistic: f64,
    /// KS p-value.
    pub p_value: f64,
}

/// Two-sample KS test of every column of `a` against the same position in
/// `b`.
///
/// Columns are paired by position. Differing labels or column counts are
/// reported as warnings; surplus columns are ignored. Column `j` breaks ties
/// with RNG stream `j` of `seed`.
pub fn compare_traces(
    a: &TraceLog,
    b: &TraceLog,
    strict: bool,
    seed: u64,
) -> samplecheck_core::Result<Vec<ColumnComparison>> {
    if a.n_columns() != b.n_columns() {
        tracing::warn!(
            first = a.n_columns(),
            second = b.n_columns(),
            "trace logs have different column counts"
        );
    }

    let ks = TwoSampleKs::new(strict);
    a.labels
        .iter()
        .zip(&b.labels)
        .enumerate()
        .map(|(j, (label_a, label_b))| -> samplecheck_core::Result<ColumnComparison> {
            if label_a != label_b {
                tracing::warn!(first = %label_a, second = %label_b, "columns do not match");
            }
            let outcome = ks.test(a.column(j), b.column(j), &mut stream_rng(seed, j as u64))?;
            Ok(ColumnComparison {
                label: label_a.clone(),
                statistic: outcome.statistic,
                p_value: outcome.p_value,
            })
        })
        .collect()
}
