//! Sample containers and common types.

use nalgebra::DVector;

use crate::error::{DataError, Result};

/// Column vector used for means and feature vectors.
pub type Vector = DVector<f64>;

/// Dense matrix used for covariances.
pub type Matrix = nalgebra::DMatrix<f64>;

/// Number of sample groups a test consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TestArity {
    /// Exactly one group, tested against a reference distribution.
    OneSample,
    /// Exactly two groups of equal dimension, tested against each other.
    TwoSample,
}

impl TestArity {
    /// Number of groups required.
    pub fn group_count(self) -> usize {
        match self {
            TestArity::OneSample => 1,
            TestArity::TwoSample => 2,
        }
    }
}

impl std::fmt::Display for TestArity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestArity::OneSample => write!(f, "one-sample"),
            TestArity::TwoSample => write!(f, "two-sample"),
        }
    }
}

/// Row-major matrix of observations.
///
/// Each row is one observation of dimension `dim`; rows keep the order in
/// which they were pushed (the iteration order of the sampler that produced
/// them).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    /// Create an empty matrix for observations of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Create an empty matrix with room for `rows` observations.
    pub fn with_capacity(dim: usize, rows: usize) -> Self {
        Self {
            dim,
            data: Vec::with_capacity(dim * rows),
        }
    }

    /// Build a matrix from rows, checking they all have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let dim = rows.first().map_or(0, |r| r.as_ref().len());
        let mut matrix = Self::with_capacity(dim, rows.len());
        for row in rows {
            matrix.push_row(row.as_ref())?;
        }
        Ok(matrix)
    }

    /// Build a single-column matrix from scalar observations.
    pub fn from_column(values: &[f64]) -> Self {
        Self {
            dim: 1,
            data: values.to_vec(),
        }
    }

    /// Append one observation.
    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.dim {
            return Err(DataError::DimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            }
            .into());
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Dimension of each observation.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of observations.
    pub fn n_rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Whether the matrix holds no observations.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Observation `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows()`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate over observations in insertion order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size; an empty matrix has no rows
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows().map(|row| row[j]).collect()
    }

    /// Observation `i` as an nalgebra vector.
    pub fn row_vector(&self, i: usize) -> Vector {
        Vector::from_row_slice(self.row(i))
    }

    /// Position of the first non-finite entry, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.data.iter().position(|x| !x.is_finite())
    }
}

/// A named sample matrix handed to a hypothesis test.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup {
    /// Label used in diagnostics (typically the extractor name).
    pub name: String,
    /// The observations.
    pub samples: SampleMatrix,
}

impl SampleGroup {
    /// Create a named group.
    pub fn new(name: impl Into<String>, samples: SampleMatrix) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Dimension of the group's observations.
    pub fn dim(&self) -> usize {
        self.samples.dim()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.samples.n_rows()
    }

    /// Whether the group holds no observations.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
