//! HPD coverage from a truth log and a per-run summary log.
//!
//! The truth log holds one row per run with the parameter values each run
//! was simulated from, usually after `skip` leading rows. The summary log
//! holds one row per run with `{label}.mean`, `{label}.95%HPDlo`,
//! `{label}.95%HPDup` and optionally `{label}.ESS` columns.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use samplecheck_core::analysis::{hpd_coverage, CoverageReport, HpdEstimate, ParameterKind};

use super::{TraceError, TraceLog};

/// Labels that never describe a simulated parameter.
const ALWAYS_EXCLUDED: [&str; 3] = ["posterior", "prior", "likelihood"];

/// Options for [`coverage_from_logs`].
#[derive(Debug, Clone)]
pub struct CoverageOptions {
    /// Leading truth rows without a matching run.
    pub skip: usize,
    /// Kind per label; unlisted labels are continuous.
    pub kinds: HashMap<String, ParameterKind>,
    /// Extra labels to leave out.
    pub exclude: HashSet<String>,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        Self {
            skip: 1,
            kinds: HashMap::new(),
            exclude: HashSet::new(),
        }
    }
}

impl CoverageOptions {
    /// Create options with one skipped truth row and no type overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of skipped truth rows.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Set the parameter kinds.
    pub fn kinds(mut self, kinds: HashMap<String, ParameterKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Leave `label` out of the analysis.
    pub fn exclude(mut self, label: impl Into<String>) -> Self {
        self.exclude.insert(label.into());
        self
    }

    fn kind_of(&self, label: &str) -> ParameterKind {
        self.kinds.get(label).copied().unwrap_or_default()
    }
}

/// Coverage of one truth log column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCoverage {
    /// Column label in the truth log.
    pub label: String,
    /// How estimates were compared with the truth.
    pub kind: ParameterKind,
    /// Coverage counts and ESS summary.
    pub report: CoverageReport,
}

/// Compute the HPD coverage of every truth column that has HPD bounds in
/// `summary`.
///
/// Run `j` of `summary` is matched with row `j + skip` of `truth`. When the
/// logs disagree on the number of runs the shorter one wins and a warning is
/// logged.
pub fn coverage_from_logs(
    truth: &TraceLog,
    summary: &TraceLog,
    options: &CoverageOptions,
) -> samplecheck_core::Result<Vec<LabelCoverage>> {
    let available = truth.n_rows().saturating_sub(options.skip);
    if available != summary.n_rows() {
        tracing::warn!(
            truth_runs = available,
            summary_runs = summary.n_rows(),
            "truth and summary logs have different numbers of runs"
        );
    }
    let runs = available.min(summary.n_rows());

    let mut results = Vec::new();
    for label in truth.labels() {
        if ALWAYS_EXCLUDED.contains(&label.as_str()) || options.exclude.contains(label) {
            continue;
        }
        let (Some(lower), Some(upper)) = (
            summary.trace(&format!("{label}.95%HPDlo")),
            summary.trace(&format!("{label}.95%HPDup")),
        ) else {
            tracing::warn!(%label, "skipping entry without HPD bounds");
            continue;
        };
        // Bounds without a mean column fall back to the interval midpoint.
        let means = summary.trace(&format!("{label}.mean"));
        let ess = summary.trace(&format!("{label}.ESS"));

        let estimates: Vec<HpdEstimate> = (0..runs)
            .map(|j| HpdEstimate {
                mean: means.map_or(0.5 * (lower[j] + upper[j]), |m| m[j]),
                lower: lower[j],
                upper: upper[j],
                ess: ess.map(|e| e[j]).filter(|v| !v.is_nan()),
            })
            .collect();
        let truths = truth
            .trace(label)
            .map(|t| &t[options.skip.min(t.len())..][..runs])
            .unwrap_or_default();

        let kind = options.kind_of(label);
        let report = hpd_coverage(truths, &estimates, kind)?;
        results.push(LabelCoverage {
            label: label.clone(),
            kind,
            report,
        });
    }

    tracing::debug!(runs, entries = results.len(), "computed HPD coverage");
    Ok(results)
}

/// Load parameter kinds from a tab-separated type file.
pub fn load_parameter_kinds(path: &Path) -> Result<HashMap<String, ParameterKind>, TraceError> {
    let file = File::open(path)?;
    parse_parameter_kinds(BufReader::new(file))
}

/// Parse `label<TAB>kind` lines, where kind is `d`, `c` or `b`.
///
/// Lines without exactly two fields are ignored, as are unknown kinds
/// (with a warning).
pub fn parse_parameter_kinds<R: BufRead>(reader: R) -> Result<HashMap<String, ParameterKind>, TraceError> {
    let mut kinds = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        let [label, code] = fields.as_slice() else {
            continue;
        };
        match code.parse::<ParameterKind>() {
            Ok(kind) => {
                kinds.insert(label.trim().to_string(), kind);
            }
            Err(e) => tracing::warn!(%label, error = %e, "ignoring parameter type"),
        }
    }
    Ok(kinds)
}
