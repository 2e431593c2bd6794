//! Per-batch selection state: the role arena and its covariance.
//!
//! Every point in a selection call lives at a stable index in one arena.
//! A slot's [`PointRole`] says what the point currently is: a `Pool`
//! candidate, a prediction `Target`, or an `Observed` pick. Roles replace
//! the implicit "first n rows are the pool" slicing convention; indices
//! never shift, only roles change, and the three sets are disjoint by
//! construction.

use crate::covariance::{check_noise_variance, JointCovariance};
use crate::dedup::{DuplicateDetector, NormScan};
use crate::error::{IndagarError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a slot in the selection arena currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointRole {
    /// Candidate available for selection.
    Pool,
    /// Prediction target; scored against, never selected.
    Target,
    /// Already selected in this batch.
    Observed,
}

/// State for one batch-selection call.
///
/// Owns the joint covariance, the raw feature rows aligned to the index
/// space, and the role of every slot. Built once per `select` call,
/// mutated in place by [`SelectionState::observe`] after each pick, and
/// discarded when the batch completes.
pub struct SelectionState {
    roles: Vec<PointRole>,
    covariance: JointCovariance,
    joint_data: Matrix<f64>,
    observed_points: Vec<Vector<f64>>,
    noise_variance: f64,
    detector: Box<dyn DuplicateDetector + Send + Sync>,
}

impl fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionState")
            .field("dim", &self.dim())
            .field("pool_len", &self.pool_len())
            .field("observed", &self.observed_points.len())
            .field("noise_variance", &self.noise_variance)
            .finish_non_exhaustive()
    }
}

impl SelectionState {
    /// Creates a state whose first `pool_size` slots are pool candidates
    /// and whose remaining slots are prediction targets.
    ///
    /// `joint_data` holds one raw feature row per slot and is used only
    /// for duplicate detection.
    ///
    /// # Errors
    ///
    /// Returns an error if `pool_size` is zero or exceeds the joint
    /// dimension, if the covariance and data dimensions disagree, or if
    /// the noise variance is negative or non-finite.
    pub fn new(
        covariance: JointCovariance,
        joint_data: Matrix<f64>,
        pool_size: usize,
        noise_variance: f64,
    ) -> Result<Self> {
        let dim = covariance.dim();
        if joint_data.n_rows() != dim {
            return Err(IndagarError::dimension_mismatch(
                "joint data rows",
                dim,
                joint_data.n_rows(),
            ));
        }
        if pool_size == 0 {
            return Err(IndagarError::empty_input("candidate pool"));
        }
        if pool_size > dim {
            return Err(IndagarError::index_out_of_bounds(pool_size, dim + 1));
        }
        check_noise_variance(noise_variance)?;

        let roles = (0..dim)
            .map(|i| {
                if i < pool_size {
                    PointRole::Pool
                } else {
                    PointRole::Target
                }
            })
            .collect();

        Ok(Self {
            roles,
            covariance,
            joint_data,
            observed_points: Vec::new(),
            noise_variance,
            detector: Box::new(NormScan::default()),
        })
    }

    /// Creates a state with no designated targets: every slot is a pool
    /// candidate and the pool itself serves as the target space.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`SelectionState::new`].
    pub fn undirected(
        covariance: JointCovariance,
        joint_data: Matrix<f64>,
        noise_variance: f64,
    ) -> Result<Self> {
        let dim = covariance.dim();
        Self::new(covariance, joint_data, dim, noise_variance)
    }

    /// Replaces the duplicate-detection strategy.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn DuplicateDetector + Send + Sync>) -> Self {
        self.detector = detector;
        self
    }

    /// Size of the joint index space.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.roles.len()
    }

    /// Role of slot `i`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn role(&self, i: usize) -> PointRole {
        self.roles[i]
    }

    /// Raw feature row of slot `i`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn point(&self, i: usize) -> Vector<f64> {
        self.joint_data.row(i)
    }

    /// Current joint covariance.
    #[must_use]
    pub fn covariance(&self) -> &JointCovariance {
        &self.covariance
    }

    /// Observation noise variance.
    #[must_use]
    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    /// Raw vectors of the points observed so far, in pick order.
    #[must_use]
    pub fn observed_points(&self) -> &[Vector<f64>] {
        &self.observed_points
    }

    /// Number of slots still in the pool.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.roles.iter().filter(|r| **r == PointRole::Pool).count()
    }

    /// Original pool size: pool slots plus slots already observed.
    ///
    /// Pool slots occupy the arena prefix, so scorers index their output
    /// by slot for every `i < pool_capacity()`.
    #[must_use]
    pub fn pool_capacity(&self) -> usize {
        self.roles
            .iter()
            .filter(|r| **r != PointRole::Target)
            .count()
    }

    /// Indices of slots currently in the pool, ascending.
    #[must_use]
    pub fn pool_indices(&self) -> Vec<usize> {
        self.indices_with_role(PointRole::Pool)
    }

    /// Indices of target slots, ascending.
    #[must_use]
    pub fn target_indices(&self) -> Vec<usize> {
        self.indices_with_role(PointRole::Target)
    }

    /// Indices of observed slots, ascending.
    #[must_use]
    pub fn observed_indices(&self) -> Vec<usize> {
        self.indices_with_role(PointRole::Observed)
    }

    /// True when the state carries designated targets.
    #[must_use]
    pub fn has_targets(&self) -> bool {
        self.roles.iter().any(|r| *r == PointRole::Target)
    }

    /// True when slot `i` has been observed, either directly or through a
    /// near-duplicate of an observed vector.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn is_effectively_observed(&self, i: usize) -> bool {
        if self.roles[i] == PointRole::Observed {
            return true;
        }
        if self.observed_points.is_empty() {
            return false;
        }
        self.detector
            .is_duplicate(&self.point(i), &self.observed_points)
    }

    /// Target space used when scoring candidate `i`: target slots (the
    /// remaining pool, when no targets are designated), excluding slots
    /// already covered by an observation and excluding `i` itself.
    ///
    /// Ascending and duplicate-free by construction.
    #[must_use]
    pub fn adapted_target_space(&self, candidate: usize) -> Vec<usize> {
        let base_role = if self.has_targets() {
            PointRole::Target
        } else {
            PointRole::Pool
        };

        (0..self.dim())
            .filter(|&t| self.roles[t] == base_role)
            .filter(|&t| t != candidate)
            .filter(|&t| !self.is_effectively_observed(t))
            .collect()
    }

    /// Records the pick of slot `i`: conditions the covariance on a noisy
    /// observation at `i` (rank-one posterior), transitions the role
    /// `Pool -> Observed`, and stores the raw vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the slot is not
    /// currently in the pool.
    pub fn observe(&mut self, i: usize) -> Result<()> {
        if i >= self.dim() {
            return Err(IndagarError::index_out_of_bounds(i, self.dim()));
        }
        match self.roles[i] {
            PointRole::Pool => {}
            PointRole::Observed => return Err(IndagarError::DuplicateIndex { index: i }),
            PointRole::Target => {
                return Err(IndagarError::Other(format!(
                    "slot {i} is a prediction target, not a pool candidate"
                )))
            }
        }

        self.covariance = self.covariance.posterior(i, self.noise_variance)?;
        self.roles[i] = PointRole::Observed;
        self.observed_points.push(self.joint_data.row(i));
        Ok(())
    }

    fn indices_with_role(&self, role: PointRole) -> Vec<usize> {
        (0..self.dim()).filter(|&i| self.roles[i] == role).collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
