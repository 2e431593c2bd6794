//! Covariance oracles: sources of prior covariance blocks.
//!
//! An oracle answers "what is the prior covariance between these points?"
//! for arbitrary index subsets. Two backings are provided: an explicit
//! embedding matrix (covariance = Phi * Phi^T) and a pointwise kernel
//! function over raw feature rows. The capability is fixed at
//! construction; downstream code sees only the [`CovarianceOracle`] trait.

use crate::error::{IndagarError, Result};
use crate::kernel::Kernel;
use crate::primitives::Matrix;

/// Source of prior covariance blocks over an indexed point set.
///
/// Implementations must be consistent: the same index lists always
/// produce the same block for a fixed model state. Index lists may
/// overlap, repeat, or appear in any order.
pub trait CovarianceOracle {
    /// Number of points the oracle covers.
    fn len(&self) -> usize;

    /// Returns true when the oracle covers no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the covariance block for the given row and column indices.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of range.
    fn kernel_block(&self, rows: &[usize], cols: &[usize]) -> Result<Matrix<f64>>;

    /// Returns the full covariance matrix over all points.
    ///
    /// # Errors
    ///
    /// Returns an error if the block computation fails.
    fn full_matrix(&self) -> Result<Matrix<f64>> {
        let all: Vec<usize> = (0..self.len()).collect();
        self.kernel_block(&all, &all)
    }
}

fn check_indices(indices: &[usize], len: usize) -> Result<()> {
    for &i in indices {
        if i >= len {
            return Err(IndagarError::index_out_of_bounds(i, len));
        }
    }
    Ok(())
}

/// Oracle backed by an explicit embedding matrix.
///
/// Each row of the matrix is one point's embedding; the prior covariance
/// between points i and j is the dot product of their embedding rows.
///
/// # Examples
///
/// ```
/// use indagar::oracle::{CovarianceOracle, EmbeddingOracle};
/// use indagar::primitives::Matrix;
///
/// let phi = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 2.0]).expect("2*2=4 elements");
/// let oracle = EmbeddingOracle::new(phi).expect("embeddings are non-empty");
/// let block = oracle.kernel_block(&[0, 1], &[0, 1]).expect("indices in range");
/// assert_eq!(block.get(1, 1), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddingOracle {
    embeddings: Matrix<f64>,
}

impl EmbeddingOracle {
    /// Creates an oracle from an embedding matrix (one row per point).
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has no rows.
    pub fn new(embeddings: Matrix<f64>) -> Result<Self> {
        if embeddings.n_rows() == 0 {
            return Err(IndagarError::empty_input("embedding matrix"));
        }
        Ok(Self { embeddings })
    }

    /// Returns the embedding dimension.
    #[must_use]
    pub fn embedding_dim(&self) -> usize {
        self.embeddings.n_cols()
    }
}

impl CovarianceOracle for EmbeddingOracle {
    fn len(&self) -> usize {
        self.embeddings.n_rows()
    }

    fn kernel_block(&self, rows: &[usize], cols: &[usize]) -> Result<Matrix<f64>> {
        check_indices(rows, self.len())?;
        check_indices(cols, self.len())?;

        let d = self.embeddings.n_cols();
        let phi = self.embeddings.as_slice();
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for &i in rows {
            let xi = &phi[i * d..(i + 1) * d];
            for &j in cols {
                let xj = &phi[j * d..(j + 1) * d];
                data.push(xi.iter().zip(xj.iter()).map(|(a, b)| a * b).sum());
            }
        }

        Ok(Matrix::from_vec(rows.len(), cols.len(), data)?)
    }
}

/// Oracle backed by a kernel function over raw feature rows.
///
/// The prior covariance between points i and j is `kernel.eval(row_i, row_j)`.
#[derive(Debug, Clone)]
pub struct KernelOracle<K> {
    data: Matrix<f64>,
    kernel: K,
}

impl<K: Kernel> KernelOracle<K> {
    /// Creates an oracle from a data matrix (one row per point) and a kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has no rows.
    pub fn new(data: Matrix<f64>, kernel: K) -> Result<Self> {
        if data.n_rows() == 0 {
            return Err(IndagarError::empty_input("data matrix"));
        }
        Ok(Self { data, kernel })
    }

    /// Returns a reference to the kernel.
    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> CovarianceOracle for KernelOracle<K> {
    fn len(&self) -> usize {
        self.data.n_rows()
    }

    fn kernel_block(&self, rows: &[usize], cols: &[usize]) -> Result<Matrix<f64>> {
        check_indices(rows, self.len())?;
        check_indices(cols, self.len())?;

        let d = self.data.n_cols();
        let raw = self.data.as_slice();
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for &i in rows {
            let xi = &raw[i * d..(i + 1) * d];
            for &j in cols {
                let xj = &raw[j * d..(j + 1) * d];
                data.push(self.kernel.eval(xi, xj));
            }
        }

        Ok(Matrix::from_vec(rows.len(), cols.len(), data)?)
    }
}
