//! Acquisition scorers: rank pool candidates for selection.
//!
//! A scorer maps the frozen round state to one score per pool slot.
//! Larger is better; `-inf` marks a slot the selector must never pick
//! (observed points and their near-duplicates). Every finite score is
//! non-negative.
//!
//! The transductive family ([`TransductiveScorer`]) drives scores from
//! the posterior covariance between candidates and prediction targets.
//! The baselines ([`RandomScorer`], [`MarginalVariance`], [`MaxDist`])
//! ignore the targets and exist for comparison runs.

mod baseline;
mod transductive;

pub use baseline::{MarginalVariance, MaxDist, RandomScorer};
pub use transductive::{TransductiveScorer, UncertaintyReduction, MIN_CONDITIONAL_VARIANCE};

use crate::error::Result;
use crate::primitives::Vector;
use crate::sink::MetricsSink;
use crate::state::SelectionState;

/// Scores every pool slot of the given round state.
pub trait AcquisitionScorer {
    /// Returns one score per slot in `0..state.pool_capacity()`.
    ///
    /// Observed slots and near-duplicates of observed points score
    /// `-inf`. Emits the max/min finite score to the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the state violates the scorer's contract
    /// (conditioning on malformed index sets, dimension mismatches).
    fn score(&self, state: &SelectionState, sink: &dyn MetricsSink) -> Result<Vector<f64>>;
}

/// Records the extreme finite scores, if any exist.
pub(crate) fn emit_score_extremes(sink: &dyn MetricsSink, scores: &[f64]) {
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut any = false;
    for &s in scores {
        if s.is_finite() {
            any = true;
            max = max.max(s);
            min = min.min(s);
        }
    }
    if any {
        sink.record("max_score", max);
        sink.record("min_score", min);
    }
}
