//! High-level batch loader: data in, informative batches out.
//!
//! [`ActiveDataLoader`] is the front door for callers who don't want to
//! assemble oracles and selectors by hand. It owns the pool rows, an
//! oracle choice, a selector configuration, and optionally a growing
//! [`TargetSet`] that is re-sampled on every call.

use crate::acquisition::AcquisitionScorer;
use crate::dedup::NormScan;
use crate::error::{IndagarError, Result};
use crate::kernel::Rbf;
use crate::oracle::{EmbeddingOracle, KernelOracle};
use crate::primitives::Matrix;
use crate::selection::{SelectionMode, SequentialSelector};
use crate::sink::MetricsSink;
use crate::target::TargetSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the loader turns feature rows into prior covariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OracleChoice {
    /// Rows are embeddings; covariance is their Gram matrix.
    Embedding,
    /// RBF kernel over raw rows with the given lengthscale.
    Rbf {
        /// Kernel lengthscale, finite and positive.
        lengthscale: f64,
    },
}

/// Batch-producing loader over a fixed candidate pool.
///
/// # Examples
///
/// ```
/// use indagar::loader::ActiveDataLoader;
/// use indagar::primitives::Matrix;
/// use indagar::target::TargetSet;
///
/// let pool = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 0.7, 0.7])
///     .expect("3*2=6 elements");
/// let targets = TargetSet::new(
///     Matrix::from_vec(1, 2, vec![0.0, 1.0]).expect("1*2=2 elements"),
/// );
///
/// let loader = ActiveDataLoader::new(pool, 2)
///     .with_noise_variance(0.01)
///     .with_target_set(targets);
/// let batch = loader.next_batch().expect("valid configuration");
/// assert_eq!(batch[0], 1); // candidate aligned with the target
/// ```
pub struct ActiveDataLoader {
    data: Matrix<f64>,
    oracle: OracleChoice,
    selector: SequentialSelector,
    batch_size: usize,
    target_set: Option<TargetSet>,
}

impl fmt::Debug for ActiveDataLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveDataLoader")
            .field("pool_len", &self.data.n_rows())
            .field("oracle", &self.oracle)
            .field("batch_size", &self.batch_size)
            .field("targets", &self.target_set.as_ref().map(TargetSet::len))
            .finish_non_exhaustive()
    }
}

impl ActiveDataLoader {
    /// Creates a loader over pool rows with the embedding oracle, the
    /// information-gain scorer, unit noise variance, and no targets.
    #[must_use]
    pub fn new(data: Matrix<f64>, batch_size: usize) -> Self {
        Self {
            data,
            oracle: OracleChoice::Embedding,
            selector: SequentialSelector::new(1.0),
            batch_size,
            target_set: None,
        }
    }

    /// Sets the oracle backing.
    #[must_use]
    pub fn with_oracle(mut self, oracle: OracleChoice) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replaces the acquisition scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Box<dyn AcquisitionScorer + Send + Sync>) -> Self {
        self.selector = self.selector.with_scorer(scorer);
        self
    }

    /// Sets the observation noise variance.
    #[must_use]
    pub fn with_noise_variance(mut self, noise_variance: f64) -> Self {
        self.selector = self.selector.with_noise_variance(noise_variance);
        self
    }

    /// Sets the selection mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.selector = self.selector.with_mode(mode);
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn MetricsSink + Send + Sync>) -> Self {
        self.selector = self.selector.with_sink(sink);
        self
    }

    /// Replaces the duplicate-detection tolerances.
    #[must_use]
    pub fn with_detector(mut self, detector: NormScan) -> Self {
        self.selector = self.selector.with_detector(detector);
        self
    }

    /// Attaches a target set, re-sampled on every call.
    #[must_use]
    pub fn with_target_set(mut self, target_set: TargetSet) -> Self {
        self.target_set = Some(target_set);
        self
    }

    /// Appends target rows, creating the target set on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the column counts disagree.
    pub fn add_target_points(&mut self, points: &Matrix<f64>) -> Result<()> {
        match &mut self.target_set {
            Some(set) => set.add_points(points),
            None => {
                self.target_set = Some(TargetSet::new(points.clone()));
                Ok(())
            }
        }
    }

    /// Configured batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Current target set, if any.
    #[must_use]
    pub fn target_set(&self) -> Option<&TargetSet> {
        self.target_set.as_ref()
    }

    /// Runs one full selection and returns the picked pool indices.
    ///
    /// The target set (when present and non-empty) is re-sampled for
    /// this call; without one the selection runs undirected over the
    /// pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is empty, the target rows' width
    /// disagrees with the pool's, or the selector configuration is
    /// invalid.
    pub fn next_batch(&self) -> Result<Vec<usize>> {
        let pool_len = self.data.n_rows();
        let sampled = self.target_set.as_ref().map(TargetSet::sample);

        let (joint_data, target_indices) = match sampled {
            Some(targets) if targets.n_rows() > 0 => {
                if targets.n_cols() != self.data.n_cols() {
                    return Err(IndagarError::dimension_mismatch(
                        "target columns",
                        self.data.n_cols(),
                        targets.n_cols(),
                    ));
                }
                let rows = pool_len + targets.n_rows();
                let mut data = self.data.as_slice().to_vec();
                data.extend_from_slice(targets.as_slice());
                let joint = Matrix::from_vec(rows, self.data.n_cols(), data)?;
                let indices: Vec<usize> = (pool_len..rows).collect();
                (joint, indices)
            }
            _ => (self.data.clone(), Vec::new()),
        };

        match self.oracle {
            OracleChoice::Embedding => {
                let oracle = EmbeddingOracle::new(joint_data.clone())?;
                self.selector.select(
                    &oracle,
                    &joint_data,
                    pool_len,
                    &target_indices,
                    self.batch_size,
                )
            }
            OracleChoice::Rbf { lengthscale } => {
                let oracle = KernelOracle::new(joint_data.clone(), Rbf::new(lengthscale)?)?;
                self.selector.select(
                    &oracle,
                    &joint_data,
                    pool_len,
                    &target_indices,
                    self.batch_size,
                )
            }
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
