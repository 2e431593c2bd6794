//! Batch selection: the greedy loop over scorer and state.
//!
//! [`SequentialSelector`] joins the pieces: it materializes the joint
//! covariance from an oracle, builds the round state, and repeats
//! score / argmax / observe until the batch is full or the pool holds no
//! distinct point worth picking. Every pick re-conditions the posterior,
//! which is what makes the batches diverse; `Nonsequential` mode skips
//! the re-conditioning and simply takes the top-k of a single pass.

use crate::acquisition::{AcquisitionScorer, TransductiveScorer};
use crate::covariance::{check_unique, JointCovariance};
use crate::dedup::NormScan;
use crate::error::{IndagarError, Result};
use crate::oracle::CovarianceOracle;
use crate::primitives::{Matrix, Vector};
use crate::sink::{MetricsSink, NoOpSink};
use crate::state::SelectionState;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Whether picks re-condition the posterior between selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Greedy loop; each pick updates the posterior before the next.
    Sequential,
    /// One scoring pass; the k best finite scores win as-is.
    Nonsequential,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::Sequential
    }
}

/// Batch selector over a covariance oracle.
///
/// # Examples
///
/// ```
/// use indagar::oracle::EmbeddingOracle;
/// use indagar::primitives::Matrix;
/// use indagar::selection::SequentialSelector;
///
/// // Three candidates; the last row is the prediction target.
/// let data = Matrix::from_vec(4, 2, vec![
///     1.0, 0.0,
///     0.0, 1.0,
///     0.7, 0.7,
///     0.0, 1.0,
/// ]).expect("4*2=8 elements");
/// let oracle = EmbeddingOracle::new(data.clone()).expect("non-empty");
///
/// let batch = SequentialSelector::new(0.01)
///     .select(&oracle, &data, 3, &[3], 2)
///     .expect("valid selection request");
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch[0], 1); // the candidate aligned with the target
/// ```
pub struct SequentialSelector {
    scorer: Box<dyn AcquisitionScorer + Send + Sync>,
    noise_variance: f64,
    mode: SelectionMode,
    sink: Box<dyn MetricsSink + Send + Sync>,
    detector: NormScan,
}

impl fmt::Debug for SequentialSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialSelector")
            .field("noise_variance", &self.noise_variance)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SequentialSelector {
    /// Creates a selector with the information-gain scorer, sequential
    /// mode, a no-op sink, and default duplicate tolerances.
    #[must_use]
    pub fn new(noise_variance: f64) -> Self {
        Self {
            scorer: Box::new(TransductiveScorer::itl()),
            noise_variance,
            mode: SelectionMode::Sequential,
            sink: Box::new(NoOpSink),
            detector: NormScan::default(),
        }
    }

    /// Replaces the acquisition scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Box<dyn AcquisitionScorer + Send + Sync>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Sets the observation noise variance.
    #[must_use]
    pub fn with_noise_variance(mut self, noise_variance: f64) -> Self {
        self.noise_variance = noise_variance;
        self
    }

    /// Sets the selection mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn MetricsSink + Send + Sync>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the duplicate-detection tolerances.
    #[must_use]
    pub fn with_detector(mut self, detector: NormScan) -> Self {
        self.detector = detector;
        self
    }

    /// Returns the configured mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selects up to `batch_size` pool indices.
    ///
    /// The oracle's first `pool_size` points form the candidate pool;
    /// `target_indices` designate prediction targets anywhere in the
    /// oracle's space (they may coincide with pool points). With no
    /// targets the pool itself is the target space. `data` holds one raw
    /// feature row per oracle point and is used for duplicate detection.
    ///
    /// Returns the picked pool indices in pick order. The batch is
    /// shorter than requested when the pool runs out of distinct points;
    /// that is exhaustion, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle and data sizes disagree, the pool
    /// is empty or larger than the oracle, a target index is out of
    /// range or repeated, or the noise variance is invalid.
    pub fn select(
        &self,
        oracle: &dyn CovarianceOracle,
        data: &Matrix<f64>,
        pool_size: usize,
        target_indices: &[usize],
        batch_size: usize,
    ) -> Result<Vec<usize>> {
        if oracle.len() != data.n_rows() {
            return Err(IndagarError::dimension_mismatch(
                "oracle points",
                oracle.len(),
                data.n_rows(),
            ));
        }
        if pool_size == 0 {
            return Err(IndagarError::empty_input("candidate pool"));
        }
        if pool_size > oracle.len() {
            return Err(IndagarError::index_out_of_bounds(pool_size, oracle.len() + 1));
        }
        for &t in target_indices {
            if t >= oracle.len() {
                return Err(IndagarError::index_out_of_bounds(t, oracle.len()));
            }
        }
        check_unique(target_indices)?;

        // Joint index space: pool slots first, then one slot per target.
        let mut joint: Vec<usize> = (0..pool_size).collect();
        joint.extend_from_slice(target_indices);

        let covariance = JointCovariance::new(oracle.kernel_block(&joint, &joint)?)?;
        let all_cols: Vec<usize> = (0..data.n_cols()).collect();
        let joint_data = data.sub_matrix(&joint, &all_cols)?;

        let mut state = SelectionState::new(covariance, joint_data, pool_size, self.noise_variance)?
            .with_detector(Box::new(self.detector.clone()));

        match self.mode {
            SelectionMode::Sequential => self.run_sequential(&mut state, batch_size),
            SelectionMode::Nonsequential => self.run_nonsequential(&state, batch_size),
        }
    }

    fn run_sequential(&self, state: &mut SelectionState, batch_size: usize) -> Result<Vec<usize>> {
        let mut batch = Vec::with_capacity(batch_size.min(state.pool_len()));
        while batch.len() < batch_size {
            let scores = self.scorer.score(state, self.sink.as_ref())?;
            let Some(pick) = argmax_finite(&scores) else {
                break;
            };
            state.observe(pick)?;
            batch.push(pick);
        }
        Ok(batch)
    }

    fn run_nonsequential(&self, state: &SelectionState, batch_size: usize) -> Result<Vec<usize>> {
        let scores = self.scorer.score(state, self.sink.as_ref())?;
        let mut ranked: Vec<(usize, f64)> = (0..scores.len())
            .filter(|&i| scores[i].is_finite())
            .map(|i| (i, scores[i]))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(batch_size);
        Ok(ranked.into_iter().map(|(i, _)| i).collect())
    }
}

/// Largest finite score, ties to the lowest index.
fn argmax_finite(scores: &Vector<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..scores.len() {
        let s = scores[i];
        if !s.is_finite() {
            continue;
        }
        match best {
            None => best = Some((i, s)),
            Some((_, top)) if s > top => best = Some((i, s)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// One-call batch selection with the information-gain scorer.
///
/// Convenience wrapper over [`SequentialSelector`] with default
/// settings. An empty `target_indices` slice selects undirected:
/// the pool doubles as the target space.
///
/// # Errors
///
/// Same contract as [`SequentialSelector::select`].
pub fn select_batch(
    oracle: &dyn CovarianceOracle,
    data: &Matrix<f64>,
    pool_size: usize,
    target_indices: &[usize],
    noise_variance: f64,
    batch_size: usize,
) -> Result<Vec<usize>> {
    SequentialSelector::new(noise_variance).select(oracle, data, pool_size, target_indices, batch_size)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
