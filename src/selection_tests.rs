pub(crate) use super::*;
use crate::acquisition::RandomScorer;
use crate::oracle::EmbeddingOracle;
use crate::sink::MemorySink;

/// Pool rows: two copies of [0,1] and one [1,0]; the target matches the
/// duplicated pair.
fn duplicated_pool() -> (EmbeddingOracle, Matrix<f64>) {
    let data = Matrix::from_vec(4, 2, vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0])
        .expect("test data has correct dimensions: 4*2=8 elements");
    let oracle = EmbeddingOracle::new(data.clone()).expect("non-empty");
    (oracle, data)
}

#[test]
fn test_sequential_skips_duplicate_and_moves_on() {
    let (oracle, data) = duplicated_pool();
    let batch = SequentialSelector::new(0.01)
        .select(&oracle, &data, 3, &[3], 2)
        .expect("valid request");
    // Slot 0 wins (tie with its twin resolves to the lowest index), the
    // twin is ruled out as a duplicate, so slot 2 completes the batch.
    assert_eq!(batch, vec![0, 2]);
}

#[test]
fn test_nonsequential_takes_top_k_without_reconditioning() {
    let (oracle, data) = duplicated_pool();
    let batch = SequentialSelector::new(0.01)
        .with_mode(SelectionMode::Nonsequential)
        .select(&oracle, &data, 3, &[3], 2)
        .expect("valid request");
    // Without conditioning between picks the identical twins both keep
    // their first-pass scores and both get picked.
    assert_eq!(batch, vec![0, 1]);
}

#[test]
fn test_exhaustion_truncates_batch() {
    let (oracle, data) = duplicated_pool();
    let batch = SequentialSelector::new(0.01)
        .select(&oracle, &data, 3, &[3], 10)
        .expect("valid request");
    // Only two distinct pool points exist.
    assert_eq!(batch, vec![0, 2]);
}

#[test]
fn test_batch_indices_unique_and_in_pool_range() {
    let (oracle, data) = duplicated_pool();
    let batch = SequentialSelector::new(0.01)
        .select(&oracle, &data, 3, &[3], 3)
        .expect("valid request");
    let mut seen = std::collections::HashSet::new();
    for &i in &batch {
        assert!(i < 3);
        assert!(seen.insert(i), "index {i} picked twice");
    }
}

#[test]
fn test_zero_batch_size_returns_empty() {
    let (oracle, data) = duplicated_pool();
    let batch = SequentialSelector::new(0.01)
        .select(&oracle, &data, 3, &[3], 0)
        .expect("valid request");
    assert!(batch.is_empty());
}

#[test]
fn test_empty_targets_run_undirected() {
    let data = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.8, 0.6, 0.0, 1.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let oracle = EmbeddingOracle::new(data.clone()).expect("non-empty");
    let batch = SequentialSelector::new(0.1)
        .select(&oracle, &data, 3, &[], 3)
        .expect("valid request");
    assert_eq!(batch.len(), 3);
}

#[test]
fn test_contract_violations_are_errors() {
    let (oracle, data) = duplicated_pool();
    let selector = SequentialSelector::new(0.01);

    // Oracle and data sizes disagree.
    let short = Matrix::zeros(2, 2);
    assert!(selector.select(&oracle, &short, 2, &[], 1).is_err());

    // Empty pool.
    assert!(selector.select(&oracle, &data, 0, &[], 1).is_err());

    // Pool larger than the oracle.
    assert!(selector.select(&oracle, &data, 5, &[], 1).is_err());

    // Target index out of range.
    assert_eq!(
        selector.select(&oracle, &data, 3, &[4], 1).unwrap_err(),
        "index 4 out of bounds (len=4)"
    );

    // Repeated target index.
    assert_eq!(
        selector.select(&oracle, &data, 3, &[3, 3], 1).unwrap_err(),
        "duplicate index 3 in index list"
    );

    // Negative noise variance.
    assert!(SequentialSelector::new(-1.0)
        .select(&oracle, &data, 3, &[3], 1)
        .is_err());
}

#[test]
fn test_ties_resolve_to_lowest_index() {
    // Fully symmetric pool; every round ties.
    let data = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0])
        .expect("test data has correct dimensions: 2*2=4 elements");
    let oracle = EmbeddingOracle::new(data.clone()).expect("non-empty");
    let batch = SequentialSelector::new(0.1)
        .select(&oracle, &data, 2, &[], 2)
        .expect("valid request");
    assert_eq!(batch, vec![0, 1]);
}

#[test]
fn test_seeded_random_selection_is_reproducible() {
    let (oracle, data) = duplicated_pool();
    let run = || {
        SequentialSelector::new(0.01)
            .with_scorer(Box::new(RandomScorer::with_seed(9)))
            .select(&oracle, &data, 3, &[], 2)
            .expect("valid request")
    };
    assert_eq!(run(), run());
}

#[test]
fn test_sink_is_wired_through_selection() {
    let (oracle, data) = duplicated_pool();
    let sink = std::sync::Arc::new(MemorySink::new());
    let selector = SequentialSelector::new(0.01).with_sink(Box::new(std::sync::Arc::clone(&sink)));
    let batch = selector
        .select(&oracle, &data, 3, &[3], 1)
        .expect("valid request");
    assert_eq!(batch, vec![0]);
    assert!(sink.last("max_score").is_some());
    assert!(sink.last("min_score").is_some());
}

#[test]
fn test_select_batch_convenience_wrapper() {
    let (oracle, data) = duplicated_pool();
    let batch =
        select_batch(&oracle, &data, 3, &[3], 0.01, 2).expect("valid request");
    assert_eq!(batch, vec![0, 2]);
}

#[test]
fn test_argmax_finite_behavior() {
    let all_neg_inf = Vector::from_slice(&[f64::NEG_INFINITY, f64::NEG_INFINITY]);
    assert_eq!(argmax_finite(&all_neg_inf), None);

    let tied = Vector::from_slice(&[1.0, 1.0, 0.5]);
    assert_eq!(argmax_finite(&tied), Some(0));

    let mixed = Vector::from_slice(&[f64::NEG_INFINITY, 0.0, 2.0, f64::NAN]);
    assert_eq!(argmax_finite(&mixed), Some(2));
}
