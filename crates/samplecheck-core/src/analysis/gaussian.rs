//! Multivariate normal distribution.
//!
//! The covariance is inverted through its symmetric eigendecomposition
//! `Σ = V Λ Vᵀ`, giving `Σ⁻¹ = V Λ⁻¹ Vᵀ` and `log|Σ| = Σ ln λ_i` without a
//! separate, possibly ill-conditioned, direct inversion.

use nalgebra::SymmetricEigen;

use crate::constants::{EIGEN_TOLERANCE, LOG_2PI, SYMMETRY_TOLERANCE};
use crate::error::{DataError, NumericalError, Result};
use crate::types::{Matrix, SampleMatrix, Vector};

/// Multivariate normal `N(μ, Σ)` with a precomputed precision matrix.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct GaussianModel {
    mean: Vector,
    covariance: Matrix,
    precision: Matrix,
    log_det: f64,
}

impl GaussianModel {
    /// Build a model from a mean vector and a symmetric covariance.
    ///
    /// # Errors
    ///
    /// - `ZeroDimension` if `mean` is empty.
    /// - `DimensionMismatch` if `covariance` is not `d x d`.
    /// - `NotSymmetric` if `covariance` is not symmetric.
    /// - `NonPositiveDefinite` if an eigenvalue is negative beyond tolerance.
    /// - `SingularMatrix` if an eigenvalue is numerically zero.
    ///
    /// Both tolerances are relative to the largest eigenvalue magnitude, so
    /// the outcome does not depend on the units of the features.
    pub fn new(mean: Vector, covariance: Matrix) -> Result<Self> {
        let d = mean.len();
        if d == 0 {
            return Err(DataError::ZeroDimension.into());
        }
        if covariance.nrows() != d || covariance.ncols() != d {
            return Err(DataError::DimensionMismatch {
                expected: d,
                actual: if covariance.nrows() != d {
                    covariance.nrows()
                } else {
                    covariance.ncols()
                },
            }
            .into());
        }
        check_symmetric(&covariance)?;

        let eigen = SymmetricEigen::new(covariance.clone());
        let scale = eigen
            .eigenvalues
            .iter()
            .fold(0.0_f64, |acc, l| acc.max(l.abs()));
        // A zero matrix gives tol = 0 and is reported as singular below.
        let tol = EIGEN_TOLERANCE * scale;

        for (index, &eigenvalue) in eigen.eigenvalues.iter().enumerate() {
            if eigenvalue < -tol {
                return Err(NumericalError::NonPositiveDefinite { eigenvalue, index }.into());
            }
            if eigenvalue.abs() <= tol {
                return Err(NumericalError::SingularMatrix { eigenvalue, index }.into());
            }
        }

        let inv_eigenvalues = eigen.eigenvalues.map(|l| 1.0 / l);
        let precision = &eigen.eigenvectors
            * Matrix::from_diagonal(&inv_eigenvalues)
            * eigen.eigenvectors.transpose();
        let log_det = eigen.eigenvalues.iter().map(|l| l.ln()).sum();

        Ok(Self {
            mean,
            covariance,
            precision,
            log_det,
        })
    }

    /// Dimension `d`.
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector.
    pub fn mean(&self) -> &Vector {
        &self.mean
    }

    /// Covariance matrix.
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Inverse covariance.
    pub fn inverse_covariance(&self) -> &Matrix {
        &self.precision
    }

    /// `ln |Σ|`.
    pub fn log_determinant(&self) -> f64 {
        self.log_det
    }

    /// `ln p(x) = -0.5 (d ln 2π + ln|Σ|) - 0.5 (x - μ)ᵀ Σ⁻¹ (x - μ)`.
    pub fn log_density(&self, x: &[f64]) -> Result<f64> {
        let d = self.dimension();
        if x.len() != d {
            return Err(DataError::DimensionMismatch {
                expected: d,
                actual: x.len(),
            }
            .into());
        }
        let diff = Vector::from_row_slice(x) - &self.mean;
        let qform = diff.dot(&(&self.precision * &diff));
        Ok(-0.5 * (d as f64 * LOG_2PI + self.log_det) - 0.5 * qform)
    }

    /// `p(x)`.
    pub fn density(&self, x: &[f64]) -> Result<f64> {
        Ok(self.log_density(x)?.exp())
    }

    /// Sum of log-densities over every row of `samples`.
    pub fn log_likelihood(&self, samples: &SampleMatrix) -> Result<f64> {
        samples.rows().map(|row| self.log_density(row)).sum()
    }
}

fn check_symmetric(m: &Matrix) -> Result<()> {
    let d = m.nrows();
    for row in 0..d {
        for col in (row + 1)..d {
            let (a, b) = (m[(row, col)], m[(col, row)]);
            let scale = a.abs().max(b.abs());
            if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                return Err(DataError::NotSymmetric { row, col }.into());
            }
        }
    }
    Ok(())
}
