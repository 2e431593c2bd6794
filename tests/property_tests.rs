//! Property-based tests for batch selection.
//!
//! Uses proptest to verify invariants across many random inputs.

use indagar::acquisition::{AcquisitionScorer, TransductiveScorer};
use indagar::covariance::JointCovariance;
use indagar::dedup::NormScan;
use indagar::oracle::EmbeddingOracle;
use indagar::primitives::{Matrix, Vector};
use indagar::selection::select_batch;
use indagar::sink::NoOpSink;
use indagar::state::SelectionState;
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies
// ============================================================================

/// Random embedding matrix with 2..=max_rows rows of the given width.
fn embedding_matrix(max_rows: usize, cols: usize) -> impl Strategy<Value = Matrix<f64>> {
    (2..=max_rows).prop_flat_map(move |rows| {
        prop::collection::vec(-2.0..2.0f64, rows * cols)
            .prop_map(move |data| Matrix::from_vec(rows, cols, data).expect("rows*cols elements"))
    })
}

/// Undirected selection state over the Gram matrix of random embeddings.
fn undirected_state(data: &Matrix<f64>, noise_variance: f64) -> SelectionState {
    let gram = data
        .matmul(&data.transpose())
        .expect("dimensions are compatible");
    let covariance = JointCovariance::new(gram).expect("gram matrix is square");
    SelectionState::undirected(covariance, data.clone(), noise_variance).expect("valid state")
}

// ============================================================================
// Batch invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_batch_is_unique_and_in_range(
        data in embedding_matrix(7, 3),
        batch_size in 1usize..5,
        noise in 0.01..1.0f64,
    ) {
        let oracle = EmbeddingOracle::new(data.clone()).unwrap();
        let pool = data.n_rows();

        let batch = select_batch(&oracle, &data, pool, &[], noise, batch_size).unwrap();

        prop_assert!(batch.len() <= batch_size);
        let mut seen = HashSet::new();
        for &i in &batch {
            prop_assert!(i < pool, "pick {} outside pool of {}", i, pool);
            prop_assert!(seen.insert(i), "pick {} repeated", i);
        }
    }

    #[test]
    fn prop_finite_scores_are_nonnegative(
        data in embedding_matrix(6, 3),
        noise in 0.0..1.0f64,
    ) {
        let state = undirected_state(&data, noise);

        for scorer in [
            TransductiveScorer::itl(),
            TransductiveScorer::vtl(),
            TransductiveScorer::ctl(),
        ] {
            let scores = scorer.score(&state, &NoOpSink).unwrap();
            prop_assert_eq!(scores.len(), data.n_rows());
            for i in 0..scores.len() {
                let s = scores[i];
                prop_assert!(!s.is_nan(), "score {} is NaN", i);
                if s.is_finite() {
                    prop_assert!(s >= 0.0, "score {} is {}", i, s);
                }
            }
        }
    }

    #[test]
    fn prop_exhaustion_truncates_identical_pool(
        row in prop::collection::vec(0.5..2.0f64, 3),
        copies in 2usize..7,
    ) {
        let mut flat = Vec::with_capacity(copies * 3);
        for _ in 0..copies {
            flat.extend_from_slice(&row);
        }
        let data = Matrix::from_vec(copies, 3, flat).unwrap();
        let oracle = EmbeddingOracle::new(data.clone()).unwrap();

        // Every copy after the first is a near-duplicate, so the batch
        // truncates to a single pick regardless of the requested size.
        let batch = select_batch(&oracle, &data, copies, &[], 0.01, copies).unwrap();
        prop_assert_eq!(batch, vec![0]);
    }
}

// ============================================================================
// Covariance invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_posterior_diag_never_exceeds_prior(
        data in embedding_matrix(6, 3),
        noise in 0.01..1.0f64,
        pick in 0usize..6,
    ) {
        let gram = data.matmul(&data.transpose()).unwrap();
        let prior = JointCovariance::new(gram).unwrap();
        let evidence = pick % prior.dim();

        let posterior = prior.posterior(evidence, noise).unwrap();
        for i in 0..prior.dim() {
            prop_assert!(
                posterior.get(i, i) <= prior.get(i, i) + 1e-9,
                "variance of {} grew after conditioning",
                i
            );
            prop_assert!(posterior.get(i, i) >= 0.0);
        }
    }

    #[test]
    fn prop_condition_on_single_evidence_matches_rank_one_update(
        data in embedding_matrix(6, 3),
        noise in 0.01..1.0f64,
        pick in 0usize..6,
    ) {
        let gram = data.matmul(&data.transpose()).unwrap();
        let prior = JointCovariance::new(gram).unwrap();
        let evidence = pick % prior.dim();
        let others: Vec<usize> = (0..prior.dim()).filter(|&i| i != evidence).collect();

        let block = prior.condition_on(&[evidence], &others, noise).unwrap();
        let updated = prior.posterior(evidence, noise).unwrap();

        for (row, &i) in others.iter().enumerate() {
            prop_assert!(
                (block.get(row, row) - updated.get(i, i)).abs() < 1e-8,
                "conditioned variance of {} disagrees with rank-one update",
                i
            );
        }
    }
}

// ============================================================================
// Duplicate detection invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_closeness_scales_with_vector_norm(
        entries in prop::collection::vec(0.5..2.0f64, 2..5),
    ) {
        let detector = NormScan::with_tolerances(1e-6, 0.0);
        let x = Vector::from_vec(entries);

        // A relative perturbation well inside the tolerance stays close;
        // one well outside does not, at any scale.
        let close = x.mul_scalar(1.0 + 3e-7);
        let far = x.mul_scalar(1.0 + 1e-5);
        prop_assert!(detector.is_close(&x, &close));
        prop_assert!(!detector.is_close(&x, &far));

        let x_large = x.mul_scalar(1e6);
        let close_large = x_large.mul_scalar(1.0 + 3e-7);
        let far_large = x_large.mul_scalar(1.0 + 1e-5);
        prop_assert!(detector.is_close(&x_large, &close_large));
        prop_assert!(!detector.is_close(&x_large, &far_large));
    }
}
