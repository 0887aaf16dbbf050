//! Loading and comparing sampler trace logs.
//!
//! Two samplers that target the same distribution should produce traces
//! whose columns are indistinguishable. This module reads tab-separated
//! trace logs and runs a two-sample Kolmogorov-Smirnov test on every column
//! pair. It also measures how often per-run HPD intervals cover the
//! parameter values the runs were simulated from.
//!
//! # Format
//!
//! ```text
//! # comment lines start with '#'
//! Sample	posterior	mu	sigma
//! 0	-12.3	0.1	1.0
//! 1000	-11.9	0.2	0.9
//! ```
//!
//! # Example
//!
//! ```ignore
//! use samplecheck::data::{compare_traces, load_trace_log};
//! use std::path::Path;
//!
//! let a = load_trace_log(Path::new("run1.log"), 10)?;
//! let b = load_trace_log(Path::new("run2.log"), 10)?;
//! for column in compare_traces(&a, &b, true, 42)? {
//!     println!("{}\t{}", column.label, column.p_value);
//! }
//! ```

mod coverage;
mod trace;

pub use coverage::{
    coverage_from_logs, load_parameter_kinds, parse_parameter_kinds, CoverageOptions, LabelCoverage,
};
pub use trace::{compare_traces, load_trace_log, parse_trace_log, ColumnComparison, TraceLog};

use std::fmt;

/// Errors that can occur while loading a trace log.
#[derive(Debug)]
pub enum TraceError {
    /// IO error reading the file.
    Io(std::io::Error),

    /// A value could not be parsed as a number.
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// The offending field.
        value: String,
    },

    /// A row has a different number of fields than the header.
    RaggedRow {
        /// Line number of the row (1-indexed).
        line: usize,
        /// Number of header labels.
        expected: usize,
        /// Number of fields in the row.
        found: usize,
    },

    /// The file has no header line.
    MissingHeader,

    /// Burn-in percentage must be below 100.
    InvalidBurnIn(usize),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "IO error: {}", e),
            TraceError::Parse { line, value } => {
                write!(f, "Parse error at line {}: '{}' is not a number", line, value)
            }
            TraceError::RaggedRow {
                line,
                expected,
                found,
            } => write!(
                f,
                "Row at line {} has {} fields, header has {}",
                line, found, expected
            ),
            TraceError::MissingHeader => write!(f, "Trace log has no header line"),
            TraceError::InvalidBurnIn(pct) => {
                write!(f, "Burn-in percentage must be below 100, got {}", pct)
            }
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TraceError {
    fn from(e: std::io::Error) -> Self {
        TraceError::Io(e)
    }
}
