//! Joint posterior covariance over the selection index space.
//!
//! [`JointCovariance`] wraps a symmetric positive semi-definite matrix and
//! supports Gaussian conditioning: the covariance of a target block given
//! an evidence block is the Schur complement
//! `K_TT - K_TE (K_EE + noise * I)^-1 K_ET`. Conditioning on a single
//! evidence point uses the closed-form rank-one update instead, so a
//! selection round costs O(dim^2) rather than O(dim^3).
//!
//! Near-singular evidence blocks are factored with escalating diagonal
//! jitter. Degeneracy is absorbed, not raised; errors are reserved for
//! contract violations (bad indices, negative noise).

use crate::error::{IndagarError, Result};
use crate::primitives::{CholeskyFactor, Matrix, Vector};
use std::collections::HashSet;

/// Starting jitter, as a fraction of the mean diagonal.
const JITTER_SCALE: f64 = 1e-12;

/// Jitter escalation attempts before giving up (x10 each step).
const JITTER_ATTEMPTS: u32 = 6;

/// Symmetric PSD covariance matrix over the full point index space.
///
/// # Examples
///
/// ```
/// use indagar::covariance::JointCovariance;
/// use indagar::primitives::Matrix;
///
/// let k = Matrix::from_vec(2, 2, vec![1.0, 0.8, 0.8, 1.0]).expect("2*2=4 elements");
/// let cov = JointCovariance::new(k).expect("matrix is square");
///
/// // Conditioning on index 1 shrinks the variance at index 0.
/// let block = cov.condition_on(&[1], &[0], 0.0).expect("valid indices");
/// assert!((block.get(0, 0) - 0.36).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JointCovariance {
    matrix: Matrix<f64>,
}

impl JointCovariance {
    /// Wraps a covariance matrix, forcing exact symmetry.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty or not square.
    pub fn new(matrix: Matrix<f64>) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        if rows == 0 {
            return Err(IndagarError::empty_input("covariance matrix"));
        }
        if rows != cols {
            return Err(IndagarError::dimension_mismatch("square rows", rows, cols));
        }
        Ok(Self {
            matrix: matrix.symmetrize()?,
        })
    }

    /// Size of the index space.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.matrix.n_rows()
    }

    /// Raw covariance entry at (i, j).
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix.get(i, j)
    }

    /// Returns the underlying matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }

    /// Returns the diagonal (marginal variances, unclamped).
    #[must_use]
    pub fn diag(&self) -> Vector<f64> {
        let data: Vec<f64> = (0..self.dim()).map(|i| self.matrix.get(i, i)).collect();
        Vector::from_vec(data)
    }

    /// Marginal variance at index i, clamped to be non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn variance(&self, i: usize) -> Result<f64> {
        if i >= self.dim() {
            return Err(IndagarError::index_out_of_bounds(i, self.dim()));
        }
        Ok(self.matrix.get(i, i).max(0.0))
    }

    /// Conditional covariance of `targets` given noisy observations at
    /// `evidence`.
    ///
    /// With empty evidence this is the plain `targets` block. Otherwise
    /// it is the Schur complement with `noise_variance` added to the
    /// evidence-block diagonal. The result is re-symmetrized.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of range, an index repeats
    /// within `evidence` or within `targets`, or the noise variance is
    /// negative or non-finite.
    pub fn condition_on(
        &self,
        evidence: &[usize],
        targets: &[usize],
        noise_variance: f64,
    ) -> Result<Matrix<f64>> {
        self.check_in_range(evidence)?;
        self.check_in_range(targets)?;
        check_unique(evidence)?;
        check_unique(targets)?;
        check_noise_variance(noise_variance)?;

        if evidence.is_empty() {
            return Ok(self.matrix.sub_matrix(targets, targets)?);
        }

        let k_tt = self.matrix.sub_matrix(targets, targets)?;
        let k_te = self.matrix.sub_matrix(targets, evidence)?;

        let (factor, _attempts) = self.noisy_evidence_factor(evidence, noise_variance)?;

        // correction = K_TE (K_EE + noise I)^-1 K_ET
        let solved = factor.solve_matrix(&k_te.transpose())?;
        let correction = k_te.matmul(&solved)?;

        Ok(k_tt.sub(&correction)?.symmetrize()?)
    }

    /// Full posterior covariance after observing the single point
    /// `evidence_index` with the given noise variance.
    ///
    /// Uses the rank-one update `K' = K - c c^T / (k(e,e) + noise)` where
    /// `c` is column `e` of K. When the denominator is zero (an already
    /// fully determined point observed noiselessly) the prior is returned
    /// unchanged. Diagonal entries of the result are clamped to be
    /// non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the noise
    /// variance is negative or non-finite.
    pub fn posterior(&self, evidence_index: usize, noise_variance: f64) -> Result<Self> {
        if evidence_index >= self.dim() {
            return Err(IndagarError::index_out_of_bounds(evidence_index, self.dim()));
        }
        check_noise_variance(noise_variance)?;

        let denom = self.matrix.get(evidence_index, evidence_index).max(0.0) + noise_variance;
        if denom <= 0.0 {
            return Ok(self.clone());
        }

        let n = self.dim();
        let c = self.matrix.column(evidence_index);
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(self.matrix.get(i, j) - c[i] * c[j] / denom);
            }
        }
        let mut matrix = Matrix::from_vec(n, n, data)?;
        for i in 0..n {
            let v = matrix.get(i, i);
            if v < 0.0 {
                matrix.set(i, i, 0.0);
            }
        }

        Ok(Self { matrix })
    }

    /// Cholesky factor of `K_EE + noise * I` with escalating jitter.
    ///
    /// Returns the factor together with the number of jitter escalations
    /// needed (0 when the block factored cleanly). Callers surface the
    /// count as a diagnostic.
    pub(crate) fn noisy_evidence_factor(
        &self,
        evidence: &[usize],
        noise_variance: f64,
    ) -> Result<(CholeskyFactor, u32)> {
        self.check_in_range(evidence)?;
        check_noise_variance(noise_variance)?;

        let k_ee = self.matrix.sub_matrix(evidence, evidence)?;
        let noisy = if noise_variance > 0.0 {
            k_ee.add(&Matrix::eye(evidence.len()).mul_scalar(noise_variance))?
        } else {
            k_ee
        };
        factor_with_jitter(&noisy)
    }

    fn check_in_range(&self, indices: &[usize]) -> Result<()> {
        let dim = self.dim();
        for &i in indices {
            if i >= dim {
                return Err(IndagarError::index_out_of_bounds(i, dim));
            }
        }
        Ok(())
    }
}

pub(crate) fn check_unique(indices: &[usize]) -> Result<()> {
    let mut seen = HashSet::with_capacity(indices.len());
    for &i in indices {
        if !seen.insert(i) {
            return Err(IndagarError::DuplicateIndex { index: i });
        }
    }
    Ok(())
}

pub(crate) fn check_noise_variance(noise_variance: f64) -> Result<()> {
    if !noise_variance.is_finite() || noise_variance < 0.0 {
        return Err(IndagarError::InvalidHyperparameter {
            param: "noise_variance".to_string(),
            value: format!("{noise_variance}"),
            constraint: "finite and non-negative".to_string(),
        });
    }
    Ok(())
}

/// Factors a symmetric block, adding escalating diagonal jitter when the
/// plain factorization fails.
///
/// Jitter starts at `JITTER_SCALE * mean(diag)` and multiplies by 10 per
/// attempt. The returned count is 0 when no jitter was needed.
fn factor_with_jitter(block: &Matrix<f64>) -> Result<(CholeskyFactor, u32)> {
    if let Ok(factor) = block.cholesky() {
        return Ok((factor, 0));
    }

    let n = block.n_rows();
    let mean_diag = {
        let mut sum = 0.0;
        for i in 0..n {
            sum += block.get(i, i);
        }
        let mean = sum / n as f64;
        if mean > 0.0 {
            mean
        } else {
            1.0
        }
    };

    let mut jitter = JITTER_SCALE * mean_diag;
    for attempt in 1..=JITTER_ATTEMPTS {
        let jittered = block.add(&Matrix::eye(n).mul_scalar(jitter))?;
        if let Ok(factor) = jittered.cholesky() {
            return Ok((factor, attempt));
        }
        jitter *= 10.0;
    }

    Err(IndagarError::Other(format!(
        "covariance block ({n} x {n}) is not positive definite even after {JITTER_ATTEMPTS} jitter escalations"
    )))
}

#[cfg(test)]
#[path = "covariance_tests.rs"]
mod tests;
