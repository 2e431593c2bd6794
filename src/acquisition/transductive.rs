//! Covariance-driven scorers: information gain, variance reduction,
//! correlation.
//!
//! All three walk the same loop: for each pool candidate `i`, form the
//! adapted target space (targets still carrying uncertainty, minus `i`),
//! then reduce the candidate/target covariance structure to one utility:
//!
//! - **InformationGain**: `0.5 * max(0, ln(var_i / cond_var_i))`, the
//!   mutual information between a noisy observation at `i` and the
//!   targets, where `cond_var_i` is the variance of `i` after
//!   conditioning on the targets.
//! - **TotalVariance**: `sum_a k(a,i)^2 / (k(i,i) + noise)`, the drop in
//!   summed target variance caused by observing `i`.
//! - **Correlation**: `max(0, mean_a corr(i, a))`, cosine-weighted
//!   relevance of `i` to the targets.
//!
//! In a directed state every candidate shares one target space, so the
//! evidence block `K_AA + noise * I` is factored once per round and
//! reused across candidates. Without designated targets the space
//! excludes the candidate itself, so each candidate factors its own
//! block.

use super::{emit_score_extremes, AcquisitionScorer};
use crate::error::Result;
use crate::primitives::{CholeskyFactor, Vector};
use crate::sink::MetricsSink;
use crate::state::SelectionState;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Floor applied to conditional variances inside the information-gain
/// ratio. Keeps a perfectly informative noiseless candidate at a large
/// finite score instead of `inf`.
pub const MIN_CONDITIONAL_VARIANCE: f64 = 1e-15;

/// How candidate/target covariance reduces to a scalar utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UncertaintyReduction {
    /// Mutual information between a noisy observation at the candidate
    /// and the target values (log variance ratio).
    InformationGain,
    /// Reduction of the summed target variance.
    TotalVariance,
    /// Mean correlation between candidate and targets.
    Correlation,
}

/// Scorer driven by the joint posterior covariance.
///
/// # Examples
///
/// ```
/// use indagar::acquisition::{AcquisitionScorer, TransductiveScorer};
/// use indagar::covariance::JointCovariance;
/// use indagar::primitives::Matrix;
/// use indagar::sink::NoOpSink;
/// use indagar::state::SelectionState;
///
/// // Two pool rows, one target row; the second pool row matches the target.
/// let data = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0])
///     .expect("3*2=6 elements");
/// let gram = data.matmul(&data.transpose()).expect("compatible dims");
/// let cov = JointCovariance::new(gram).expect("square");
/// let state = SelectionState::new(cov, data, 2, 0.01).expect("valid state");
///
/// let scores = TransductiveScorer::itl()
///     .score(&state, &NoOpSink)
///     .expect("state is well formed");
/// // The aligned candidate is the more informative one.
/// assert!(scores[1] > scores[0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransductiveScorer {
    reduction: UncertaintyReduction,
}

impl TransductiveScorer {
    /// Creates a scorer with the given reduction.
    #[must_use]
    pub fn new(reduction: UncertaintyReduction) -> Self {
        Self { reduction }
    }

    /// Information-based transductive scorer (mutual information).
    #[must_use]
    pub fn itl() -> Self {
        Self::new(UncertaintyReduction::InformationGain)
    }

    /// Variance-based transductive scorer (trace reduction).
    #[must_use]
    pub fn vtl() -> Self {
        Self::new(UncertaintyReduction::TotalVariance)
    }

    /// Correlation-based transductive scorer.
    #[must_use]
    pub fn ctl() -> Self {
        Self::new(UncertaintyReduction::Correlation)
    }

    /// Returns the configured reduction.
    #[must_use]
    pub fn reduction(&self) -> UncertaintyReduction {
        self.reduction
    }

    fn candidate_score(
        &self,
        state: &SelectionState,
        i: usize,
        shared_space: Option<&[usize]>,
        shared_factor: Option<&CholeskyFactor>,
    ) -> Result<(f64, u32)> {
        if state.is_effectively_observed(i) {
            return Ok((f64::NEG_INFINITY, 0));
        }

        let owned_space;
        let adapted: &[usize] = match shared_space {
            Some(space) => space,
            None => {
                owned_space = state.adapted_target_space(i);
                &owned_space
            }
        };

        let variance = state.covariance().variance(i)?;

        match self.reduction {
            UncertaintyReduction::InformationGain => {
                if adapted.is_empty() {
                    return Ok((0.0, 0));
                }
                let (conditional, attempts) = match shared_factor {
                    Some(factor) => (conditional_variance(state, i, adapted, factor)?, 0),
                    None => {
                        let (factor, attempts) = state
                            .covariance()
                            .noisy_evidence_factor(adapted, state.noise_variance())?;
                        (conditional_variance(state, i, adapted, &factor)?, attempts)
                    }
                };
                let ratio = variance / conditional.max(MIN_CONDITIONAL_VARIANCE);
                Ok(((0.5 * ratio.ln()).max(0.0), attempts))
            }
            UncertaintyReduction::TotalVariance => {
                let denom = variance + state.noise_variance();
                if denom <= 0.0 {
                    return Ok((0.0, 0));
                }
                let cov = state.covariance();
                let sum: f64 = adapted
                    .iter()
                    .map(|&a| {
                        let k = cov.get(a, i);
                        k * k
                    })
                    .sum();
                Ok((sum / denom, 0))
            }
            UncertaintyReduction::Correlation => {
                if adapted.is_empty() {
                    return Ok((0.0, 0));
                }
                let cov = state.covariance();
                let mean = adapted
                    .iter()
                    .map(|&a| {
                        let scale = (variance * cov.get(a, a).max(0.0)).sqrt();
                        if scale > 0.0 {
                            cov.get(i, a) / scale
                        } else {
                            0.0
                        }
                    })
                    .sum::<f64>()
                    / adapted.len() as f64;
                Ok((mean.max(0.0), 0))
            }
        }
    }
}

impl AcquisitionScorer for TransductiveScorer {
    fn score(&self, state: &SelectionState, sink: &dyn MetricsSink) -> Result<Vector<f64>> {
        let capacity = state.pool_capacity();

        // Directed states share one target space across candidates (pool
        // slots are never target slots), so it is computed once.
        let shared_space = if state.has_targets() {
            Some(state.adapted_target_space(0))
        } else {
            None
        };

        let shared_factor = match &shared_space {
            Some(space)
                if !space.is_empty()
                    && self.reduction == UncertaintyReduction::InformationGain =>
            {
                Some(
                    state
                        .covariance()
                        .noisy_evidence_factor(space, state.noise_variance())?,
                )
            }
            _ => None,
        };

        let score_one = |i: usize| -> Result<(f64, u32)> {
            self.candidate_score(
                state,
                i,
                shared_space.as_deref(),
                shared_factor.as_ref().map(|(factor, _)| factor),
            )
        };

        #[cfg(feature = "parallel")]
        let collected: Result<Vec<(f64, u32)>> =
            (0..capacity).into_par_iter().map(score_one).collect();
        #[cfg(not(feature = "parallel"))]
        let collected: Result<Vec<(f64, u32)>> = (0..capacity).map(score_one).collect();
        let collected = collected?;

        let mut scores = Vec::with_capacity(capacity);
        let mut jitter_total = shared_factor.as_ref().map_or(0, |&(_, attempts)| attempts);
        for (score, attempts) in collected {
            scores.push(score);
            jitter_total += attempts;
        }

        if jitter_total > 0 {
            sink.record("cholesky_jitter_attempts", f64::from(jitter_total));
        }
        emit_score_extremes(sink, &scores);

        Ok(Vector::from_vec(scores))
    }
}

/// Variance of candidate `i` after conditioning on the adapted target
/// space, using a pre-computed factor of `K_AA + noise * I`.
fn conditional_variance(
    state: &SelectionState,
    i: usize,
    adapted: &[usize],
    factor: &CholeskyFactor,
) -> Result<f64> {
    let cov = state.covariance();
    let k_ai = Vector::from_vec(adapted.iter().map(|&a| cov.get(a, i)).collect());
    let solved = factor.solve(&k_ai)?;
    let conditional = cov.get(i, i).max(0.0) - k_ai.dot(&solved);
    Ok(conditional.max(0.0))
}

#[cfg(test)]
#[path = "transductive_tests.rs"]
mod tests;
