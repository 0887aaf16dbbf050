//! First and second sample moments of multivariate observations.

use crate::error::{DataError, Result};
use crate::types::{Matrix, SampleMatrix, Vector};

/// Mean, raw second moment and population covariance of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMoments {
    /// Number of observations.
    pub n: usize,
    /// `μ̂ = (1/n) Σ x_i`.
    pub mean: Vector,
    /// `M = (1/n) Σ x_i x_iᵀ`, the covariance about zero.
    pub second_moment: Matrix,
    /// `Ĉ = M - μ̂ μ̂ᵀ` (divides by `n`, not `n - 1`).
    pub covariance: Matrix,
}

impl SampleMoments {
    /// Compute moments in one pass over the rows.
    ///
    /// # Errors
    ///
    /// `ZeroDimension` for zero-dimensional observations,
    /// `InsufficientData` for an empty sample, and `NonFinite` if any entry
    /// is NaN or infinite.
    pub fn from_samples(samples: &SampleMatrix) -> Result<Self> {
        let d = samples.dim();
        if d == 0 {
            return Err(DataError::ZeroDimension.into());
        }
        let n = samples.n_rows();
        if n == 0 {
            return Err(DataError::InsufficientData {
                needed: 1,
                actual: 0,
            }
            .into());
        }
        if let Some(index) = samples.first_non_finite() {
            return Err(DataError::NonFinite { index }.into());
        }

        let mut sum = Vector::zeros(d);
        let mut outer = Matrix::zeros(d, d);
        for row in samples.rows() {
            let x = Vector::from_row_slice(row);
            outer.ger(1.0, &x, &x, 1.0);
            sum += x;
        }

        let scale = 1.0 / n as f64;
        let mean = sum * scale;
        let second_moment = outer * scale;
        let covariance = &second_moment - &mean * mean.transpose();

        Ok(Self {
            n,
            mean,
            second_moment,
            covariance,
        })
    }

    /// Dimension of the observations.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}
