//! Tests for loading and comparing trace logs from disk.

use std::io::Write;
use std::path::Path;

use rand::Rng;
use samplecheck::data::{
    compare_traces, coverage_from_logs, load_parameter_kinds, load_trace_log, CoverageOptions,
    TraceError,
};
use samplecheck::output::{format_comparisons, format_coverage};
use samplecheck::ParameterKind;
use samplecheck_core::statistics::stream_rng;
use tempfile::NamedTempFile;

/// Write a log with columns `Sample`, `mu`, `sigma`, drawn uniformly and
/// shifted by `shift`.
fn write_log(rows: usize, shift: f64, seed: u64, labels: [&str; 3]) -> NamedTempFile {
    let mut rng = stream_rng(seed, 0);
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# test trace").unwrap();
    writeln!(file, "{}\t{}\t{}", labels[0], labels[1], labels[2]).unwrap();
    for i in 0..rows {
        let mu = rng.random::<f64>() + shift;
        let sigma = 1.0 + rng.random::<f64>() + shift;
        writeln!(file, "{}\t{}\t{}", i * 10, mu, sigma).unwrap();
    }
    file.flush().unwrap();
    file
}

const LABELS: [&str; 3] = ["Sample", "mu", "sigma"];

#[test]
fn load_applies_burn_in() {
    let file = write_log(200, 0.0, 1, LABELS);
    let log = load_trace_log(file.path(), 10).unwrap();

    assert_eq!(log.labels(), ["Sample", "mu", "sigma"]);
    assert_eq!(log.n_rows(), 180);
    assert_eq!(log.column(0)[0], 200.0);
}

#[test]
fn similar_traces_are_not_rejected() {
    let a = load_trace_log(write_log(200, 0.0, 2, LABELS).path(), 10).unwrap();
    let b = load_trace_log(write_log(200, 0.0, 3, LABELS).path(), 10).unwrap();

    let columns = compare_traces(&a, &b, true, 42).unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1].label, "mu");
    for column in &columns[1..] {
        assert!(column.p_value > 1e-3, "{}: p = {}", column.label, column.p_value);
    }
}

#[test]
fn shifted_traces_are_rejected() {
    let a = load_trace_log(write_log(150, 0.0, 4, LABELS).path(), 0).unwrap();
    let b = load_trace_log(write_log(150, 2.0, 5, LABELS).path(), 0).unwrap();

    let columns = compare_traces(&a, &b, true, 42).unwrap();
    // The Sample column is identical in both logs.
    assert_eq!(columns[0].statistic, 0.0);
    for column in &columns[1..] {
        assert_eq!(column.statistic, 1.0);
        assert!(column.p_value < 1e-6, "{}: p = {}", column.label, column.p_value);
    }
}

#[test]
fn mismatched_labels_still_compare_by_position() {
    let a = load_trace_log(write_log(50, 0.0, 6, LABELS).path(), 0).unwrap();
    let b = load_trace_log(write_log(50, 0.0, 7, ["Sample", "theta", "sigma"]).path(), 0).unwrap();

    let columns = compare_traces(&a, &b, true, 42).unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1].label, "mu");
}

#[test]
fn comparison_is_reproducible() {
    let a = load_trace_log(write_log(60, 0.0, 8, LABELS).path(), 0).unwrap();
    let b = load_trace_log(write_log(60, 0.1, 9, LABELS).path(), 0).unwrap();
    assert_eq!(
        compare_traces(&a, &b, true, 11).unwrap(),
        compare_traces(&a, &b, true, 11).unwrap()
    );
}

#[test]
fn missing_file_is_io_error() {
    let err = load_trace_log(Path::new("/nonexistent/trace.log"), 0).unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
    assert!(err.to_string().starts_with("IO error"));
}

#[test]
fn comparisons_render_as_table() {
    colored::control::set_override(false);
    let a = load_trace_log(write_log(40, 0.0, 10, LABELS).path(), 0).unwrap();
    let b = load_trace_log(write_log(40, 2.0, 11, LABELS).path(), 0).unwrap();
    let output = format_comparisons(&compare_traces(&a, &b, true, 42).unwrap(), 1e-3);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Trace entry"));
    assert!(lines[2].starts_with("mu"));
}

/// Truth log with a leading row that has no run, and a summary log with one
/// row per run. `rate` misses every twentieth run; `shape` never misses.
fn write_coverage_logs(runs: usize) -> (NamedTempFile, NamedTempFile) {
    let mut truth = NamedTempFile::new().unwrap();
    let mut summary = NamedTempFile::new().unwrap();
    writeln!(truth, "Sample\tposterior\trate\tshape\tisClock").unwrap();
    writeln!(truth, "0\t0.0\t0.0\t0.0\t0").unwrap();
    writeln!(
        summary,
        "rate.mean\trate.95%HPDlo\trate.95%HPDup\trate.ESS\t\
         shape.mean\tshape.95%HPDlo\tshape.95%HPDup\t\
         isClock.mean\tisClock.95%HPDlo\tisClock.95%HPDup"
    )
    .unwrap();
    for i in 0..runs {
        let t = i as f64 / runs as f64;
        let clock = i % 2;
        writeln!(truth, "{}\t-1.0\t{}\t{}\t{}", i + 1, t, t, clock).unwrap();
        let rate_centre = if i % 20 == 0 { t + 5.0 } else { t };
        let clock_mean = if clock == 1 { 0.8 } else { 0.1 };
        writeln!(
            summary,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t0\t1",
            rate_centre,
            rate_centre - 1.0,
            rate_centre + 1.0,
            100 + i,
            t,
            t - 1.0,
            t + 1.0,
            clock_mean
        )
        .unwrap();
    }
    truth.flush().unwrap();
    summary.flush().unwrap();
    (truth, summary)
}

#[test]
fn coverage_is_read_from_disk() {
    let (truth, summary) = write_coverage_logs(100);
    let mut types = NamedTempFile::new().unwrap();
    writeln!(types, "isClock\tb").unwrap();
    types.flush().unwrap();

    let options = CoverageOptions::new().kinds(load_parameter_kinds(types.path()).unwrap());
    let entries = coverage_from_logs(
        &load_trace_log(truth.path(), 0).unwrap(),
        &load_trace_log(summary.path(), 0).unwrap(),
        &options,
    )
    .unwrap();

    let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["rate", "shape", "isClock"]);

    let rate = &entries[0].report;
    assert_eq!(rate.runs, 100);
    assert_eq!(rate.acceptance, (91, 99));
    assert_eq!(rate.covered, 95);
    assert_eq!(rate.misses, [0, 20, 40, 60, 80]);
    assert!(rate.within_acceptance());
    assert_eq!(rate.min_ess, Some(100.0));

    // Too good to be true: every interval covers.
    assert_eq!(entries[1].report.covered, 100);
    assert!(!entries[1].report.within_acceptance());
    assert_eq!(entries[1].report.invalid_ess, 100);

    assert_eq!(entries[2].kind, ParameterKind::Binary);
    assert_eq!(entries[2].report.covered, 100);

    colored::control::set_override(false);
    let table = format_coverage(&entries);
    assert!(table.starts_with("coverage should be from 91 to 99 of 100 runs"));
    assert!(table.contains("100 *"));
}
