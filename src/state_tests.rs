pub(crate) use super::*;

/// Pool rows [1,0] and [0,1], target rows [1,0] (a copy of pool slot 0)
/// and [1,1], linear-kernel covariance.
fn directed_state() -> SelectionState {
    let joint_data = Matrix::from_vec(4, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0])
        .expect("test data has correct dimensions: 4*2=8 elements");
    let gram = joint_data
        .matmul(&joint_data.transpose())
        .expect("dimensions are compatible");
    let covariance = JointCovariance::new(gram).expect("gram matrix is square");
    SelectionState::new(covariance, joint_data, 2, 0.1).expect("valid state")
}

fn undirected_state() -> SelectionState {
    let joint_data = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let gram = joint_data
        .matmul(&joint_data.transpose())
        .expect("dimensions are compatible");
    let covariance = JointCovariance::new(gram).expect("gram matrix is square");
    SelectionState::undirected(covariance, joint_data, 0.1).expect("valid state")
}

#[test]
fn test_roles_assigned_by_pool_size() {
    let state = directed_state();
    assert_eq!(state.dim(), 4);
    assert_eq!(state.role(0), PointRole::Pool);
    assert_eq!(state.role(1), PointRole::Pool);
    assert_eq!(state.role(2), PointRole::Target);
    assert_eq!(state.role(3), PointRole::Target);
    assert!(state.has_targets());
}

#[test]
fn test_role_sets_are_disjoint_and_cover_arena() {
    let mut state = directed_state();
    state.observe(0).expect("slot 0 is in the pool");
    let pool = state.pool_indices();
    let targets = state.target_indices();
    let observed = state.observed_indices();
    assert_eq!(pool, vec![1]);
    assert_eq!(targets, vec![2, 3]);
    assert_eq!(observed, vec![0]);
    assert_eq!(pool.len() + targets.len() + observed.len(), state.dim());
}

#[test]
fn test_undirected_state_has_no_targets() {
    let state = undirected_state();
    assert!(!state.has_targets());
    assert_eq!(state.pool_len(), 3);
    assert_eq!(state.target_indices(), Vec::<usize>::new());
}

#[test]
fn test_observe_updates_covariance_and_records_vector() {
    let mut state = directed_state();
    let before = state.covariance().variance(3).expect("in range");
    state.observe(0).expect("slot 0 is in the pool");

    assert_eq!(state.role(0), PointRole::Observed);
    assert_eq!(state.pool_len(), 1);
    assert_eq!(state.observed_points().len(), 1);
    assert_eq!(state.observed_points()[0].as_slice(), &[1.0, 0.0]);

    let after = state.covariance().variance(3).expect("in range");
    assert!(after < before);
}

#[test]
fn test_observe_rejects_non_pool_slots() {
    let mut state = directed_state();
    state.observe(0).expect("slot 0 is in the pool");

    let again = state.observe(0).unwrap_err();
    assert_eq!(again, "duplicate index 0 in index list");

    assert!(state.observe(2).is_err());
    assert!(state.observe(9).is_err());
}

#[test]
fn test_is_effectively_observed_covers_near_duplicates() {
    let mut state = directed_state();
    assert!(!state.is_effectively_observed(0));
    state.observe(0).expect("slot 0 is in the pool");

    // Slot 0 directly, slot 2 because its row equals slot 0's row.
    assert!(state.is_effectively_observed(0));
    assert!(state.is_effectively_observed(2));
    assert!(!state.is_effectively_observed(1));
    assert!(!state.is_effectively_observed(3));
}

#[test]
fn test_adapted_target_space_directed() {
    let state = directed_state();
    // All targets; the candidate is a pool slot, never a target slot.
    assert_eq!(state.adapted_target_space(0), vec![2, 3]);
    assert_eq!(state.adapted_target_space(1), vec![2, 3]);
}

#[test]
fn test_adapted_target_space_excludes_observed_duplicates() {
    let mut state = directed_state();
    state.observe(0).expect("slot 0 is in the pool");
    // Target slot 2 duplicates the observed vector and drops out.
    assert_eq!(state.adapted_target_space(1), vec![3]);
}

#[test]
fn test_adapted_target_space_undirected() {
    let mut state = undirected_state();
    // Pool doubles as the target space, minus the candidate itself.
    assert_eq!(state.adapted_target_space(0), vec![1, 2]);
    assert_eq!(state.adapted_target_space(2), vec![0, 1]);

    state.observe(1).expect("slot 1 is in the pool");
    assert_eq!(state.adapted_target_space(0), vec![2]);
}

#[test]
fn test_new_validates_dimensions() {
    let joint_data = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let small = JointCovariance::new(Matrix::eye(2)).expect("square");
    assert!(SelectionState::new(small, joint_data.clone(), 1, 0.1).is_err());

    let cov = JointCovariance::new(Matrix::eye(3)).expect("square");
    assert!(SelectionState::new(cov.clone(), joint_data.clone(), 0, 0.1).is_err());
    assert!(SelectionState::new(cov.clone(), joint_data.clone(), 4, 0.1).is_err());
    assert!(SelectionState::new(cov, joint_data, 1, -0.5).is_err());
}

#[test]
fn test_custom_detector_is_used() {
    let joint_data = Matrix::from_vec(2, 1, vec![0.0, 0.4])
        .expect("test data has correct dimensions: 2*1=2 elements");
    let cov = JointCovariance::new(Matrix::eye(2)).expect("square");
    let mut state = SelectionState::undirected(cov, joint_data, 0.0)
        .expect("valid state")
        .with_detector(Box::new(NormScan::with_tolerances(0.0, 0.5)));

    state.observe(0).expect("slot 0 is in the pool");
    // With a 0.5 absolute tolerance, slot 1 (distance 0.4) is a duplicate.
    assert!(state.is_effectively_observed(1));
}
