//! Human-readable rendering of validation reports, trace comparisons and
//! coverage tables.

mod terminal;

pub use terminal::{format_comparisons, format_coverage, format_report};
