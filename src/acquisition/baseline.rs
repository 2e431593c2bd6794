//! Target-agnostic baseline scorers for comparison runs.

use super::{emit_score_extremes, AcquisitionScorer};
use crate::error::Result;
use crate::primitives::Vector;
use crate::sink::MetricsSink;
use crate::state::SelectionState;
use serde::{Deserialize, Serialize};

/// Uniform-random scores in [0, 1).
///
/// Seeded construction makes the scorer deterministic: every call with
/// the same seed draws the same scores, which under sequential selection
/// yields a fixed random permutation of the pool.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RandomScorer {
    seed: Option<u64>,
}

impl RandomScorer {
    /// Creates an unseeded scorer (fresh draws per call).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a seeded, reproducible scorer.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl AcquisitionScorer for RandomScorer {
    fn score(&self, state: &SelectionState, sink: &dyn MetricsSink) -> Result<Vector<f64>> {
        use rand::Rng;
        use rand::SeedableRng;

        let capacity = state.pool_capacity();
        let mut scores = vec![0.0; capacity];
        if let Some(seed) = self.seed {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            for score in &mut scores {
                *score = rng.gen::<f64>();
            }
        } else {
            let mut rng = rand::thread_rng();
            for score in &mut scores {
                *score = rng.gen::<f64>();
            }
        }

        for (i, score) in scores.iter_mut().enumerate() {
            if state.is_effectively_observed(i) {
                *score = f64::NEG_INFINITY;
            }
        }

        emit_score_extremes(sink, &scores);
        Ok(Vector::from_vec(scores))
    }
}

/// Scores each candidate by its current (marginal) posterior variance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarginalVariance;

impl AcquisitionScorer for MarginalVariance {
    fn score(&self, state: &SelectionState, sink: &dyn MetricsSink) -> Result<Vector<f64>> {
        let capacity = state.pool_capacity();
        let mut scores = Vec::with_capacity(capacity);
        for i in 0..capacity {
            if state.is_effectively_observed(i) {
                scores.push(f64::NEG_INFINITY);
            } else {
                scores.push(state.covariance().variance(i)?);
            }
        }

        emit_score_extremes(sink, &scores);
        Ok(Vector::from_vec(scores))
    }
}

/// Scores each candidate by its distance to the nearest observed point.
///
/// Before anything has been observed there is no reference set, so the
/// first round scores distance from the pool centroid (the most outlying
/// candidate wins, deterministically).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MaxDist;

impl AcquisitionScorer for MaxDist {
    fn score(&self, state: &SelectionState, sink: &dyn MetricsSink) -> Result<Vector<f64>> {
        let capacity = state.pool_capacity();
        let observed = state.observed_points();
        let mut scores = Vec::with_capacity(capacity);

        if observed.is_empty() {
            let centroid = pool_centroid(state, capacity);
            for i in 0..capacity {
                scores.push((&state.point(i) - &centroid).norm());
            }
        } else {
            for i in 0..capacity {
                if state.is_effectively_observed(i) {
                    scores.push(f64::NEG_INFINITY);
                } else {
                    let x = state.point(i);
                    let nearest = observed
                        .iter()
                        .map(|seen| (&x - seen).norm())
                        .fold(f64::INFINITY, f64::min);
                    scores.push(nearest);
                }
            }
        }

        emit_score_extremes(sink, &scores);
        Ok(Vector::from_vec(scores))
    }
}

fn pool_centroid(state: &SelectionState, capacity: usize) -> Vector<f64> {
    let mut centroid = state.point(0);
    for i in 1..capacity {
        centroid = &centroid + &state.point(i);
    }
    centroid.mul_scalar(1.0 / capacity as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::JointCovariance;
    use crate::primitives::Matrix;
    use crate::sink::NoOpSink;

    fn pool_only_state() -> SelectionState {
        let data = Matrix::from_vec(3, 2, vec![0.0, 0.0, 4.0, 0.0, 0.0, 2.0])
            .expect("test data has correct dimensions: 3*2=6 elements");
        let gram = data
            .matmul(&data.transpose())
            .expect("dimensions are compatible");
        let cov = JointCovariance::new(gram).expect("gram matrix is square");
        SelectionState::undirected(cov, data, 0.1).expect("valid state")
    }

    #[test]
    fn test_random_scorer_seeded_is_deterministic() {
        let state = pool_only_state();
        let scorer = RandomScorer::with_seed(42);
        let a = scorer.score(&state, &NoOpSink).expect("scores");
        let b = scorer.score(&state, &NoOpSink).expect("scores");
        assert_eq!(a, b);
        for i in 0..a.len() {
            assert!(a[i] >= 0.0 && a[i] < 1.0);
        }
    }

    #[test]
    fn test_random_scorer_masks_observed() {
        let mut state = pool_only_state();
        state.observe(1).expect("slot 1 is in the pool");
        let scores = RandomScorer::with_seed(7)
            .score(&state, &NoOpSink)
            .expect("scores");
        assert_eq!(scores[1], f64::NEG_INFINITY);
        assert!(scores[0].is_finite());
        assert!(scores[2].is_finite());
    }

    #[test]
    fn test_marginal_variance_equals_clamped_diagonal() {
        let state = pool_only_state();
        let scores = MarginalVariance.score(&state, &NoOpSink).expect("scores");
        // Linear-kernel variances are the squared row norms: 0, 16, 4.
        assert_eq!(scores.as_slice(), &[0.0, 16.0, 4.0]);
    }

    #[test]
    fn test_max_dist_first_round_uses_centroid() {
        let state = pool_only_state();
        let scores = MaxDist.score(&state, &NoOpSink).expect("scores");
        // Centroid is (4/3, 2/3).
        let centroid = Vector::from_slice(&[4.0 / 3.0, 2.0 / 3.0]);
        for i in 0..3 {
            let expected = (&state.point(i) - &centroid).norm();
            assert!((scores[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_max_dist_tracks_nearest_observed() {
        let mut state = pool_only_state();
        state.observe(0).expect("slot 0 is in the pool");
        let scores = MaxDist.score(&state, &NoOpSink).expect("scores");
        assert_eq!(scores[0], f64::NEG_INFINITY);
        assert!((scores[1] - 4.0).abs() < 1e-12);
        assert!((scores[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_baselines_finite_scores_non_negative() {
        let state = pool_only_state();
        let scorers: Vec<Box<dyn AcquisitionScorer>> = vec![
            Box::new(RandomScorer::with_seed(1)),
            Box::new(MarginalVariance),
            Box::new(MaxDist),
        ];
        for scorer in &scorers {
            let scores = scorer.score(&state, &NoOpSink).expect("scores");
            for i in 0..scores.len() {
                assert!(scores[i] >= 0.0);
            }
        }
    }
}
