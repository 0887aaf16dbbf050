//! Terminal output formatting with colors.

use colored::Colorize;

use crate::data::{ColumnComparison, LabelCoverage};
use crate::run::{ValidationReport, Verdict};

/// Format a report for human-readable terminal output.
///
/// ```text
/// Stochastic validation: bootstrap
///   Test PASSED
///   p value:    0.412 (alpha = 0.001)
///   statistic:  0.18
///   samples:    1000
///
///   Summary
///     criterion       ks
///     ...
/// ```
pub fn format_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let verdict = match report.verdict {
        Verdict::Pass => report.verdict.to_string().green().bold(),
        Verdict::Fail => report.verdict.to_string().red().bold(),
    };

    out.push_str(&format!("Stochastic validation: {}\n", report.test.bold()));
    out.push_str(&format!("  Test {}\n", verdict));
    out.push_str(&format!(
        "  p value:    {} (alpha = {})\n",
        report.result.p_value(),
        report.alpha
    ));
    out.push_str(&format!("  statistic:  {}\n", report.result.statistic()));
    out.push_str(&format!("  samples:    {}\n", report.n_samples));

    let summary = report.result.summary();
    if !summary.is_empty() {
        let width = summary.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        out.push_str(&format!("\n  {}\n", "Summary".bold()));
        for (key, value) in summary.iter() {
            out.push_str(&format!("    {:width$}  {}\n", key, value.dimmed(), width = width));
        }
    }

    out
}

/// Format per-column trace comparisons, highlighting p-values below `alpha`.
pub fn format_comparisons(columns: &[ColumnComparison], alpha: f64) -> String {
    let width = columns
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0)
        .max("Trace entry".len());

    let mut out = format!("{:width$}  p-value\n", "Trace entry", width = width);
    for column in columns {
        let p = if column.p_value < alpha {
            column.p_value.to_string().red().to_string()
        } else {
            column.p_value.to_string()
        };
        out.push_str(&format!("{:width$}  {}\n", column.label, p, width = width));
    }
    out
}

/// Format HPD coverage per entry.
///
/// Counts outside the 95% acceptance range are marked with `*`.
///
/// ```text
/// coverage should be from 91 to 99 of 100 runs
/// Entry  coverage  mean ESS  min ESS
/// mu           94     512.3     88.1
/// sigma        83 *   430.0     61.5
/// ```
pub fn format_coverage(entries: &[LabelCoverage]) -> String {
    let mut out = String::new();
    if let Some(first) = entries.first() {
        let (lo, hi) = first.report.acceptance;
        out.push_str(&format!(
            "coverage should be from {} to {} of {} runs\n",
            lo, hi, first.report.runs
        ));
    }

    let width = entries
        .iter()
        .map(|e| e.label.len())
        .max()
        .unwrap_or(0)
        .max("Entry".len());
    let ess = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |v| format!("{:.1}", v));

    out.push_str(&format!("{:width$}  coverage  mean ESS  min ESS\n", "Entry", width = width));
    for entry in entries {
        let report = &entry.report;
        let marker = if report.within_acceptance() {
            " ".normal()
        } else {
            "*".red().bold()
        };
        out.push_str(&format!(
            "{:width$}  {:>6} {}  {:>8}  {:>7}\n",
            entry.label,
            report.covered,
            marker,
            ess(report.mean_ess),
            ess(report.min_ess),
            width = width
        ));
    }
    out
}
