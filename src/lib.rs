//! Indagar: Transductive active learning in pure Rust.
//!
//! Indagar selects informative batches from a candidate pool by tracking
//! a Gaussian posterior covariance and greedily picking the candidate
//! whose observation tells the most about a set of prediction targets.
//!
//! # Quick Start
//!
//! ```
//! use indagar::prelude::*;
//!
//! // Three candidates; the second lines up with the prediction target.
//! let pool = Matrix::from_vec(3, 2, vec![
//!     1.0, 0.0,
//!     0.0, 1.0,
//!     0.7, 0.7,
//! ]).unwrap();
//! let targets = TargetSet::new(Matrix::from_vec(1, 2, vec![0.0, 1.0]).unwrap());
//!
//! let loader = ActiveDataLoader::new(pool, 2)
//!     .with_noise_variance(0.01)
//!     .with_target_set(targets);
//! let batch = loader.next_batch().unwrap();
//! assert_eq!(batch[0], 1);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`covariance`]: Joint covariance with conditioning and posterior updates
//! - [`oracle`]: Covariance oracles (embedding Gram matrix, kernel-backed)
//! - [`kernel`]: Kernel functions (RBF, linear)
//! - [`state`]: Selection state with point roles and observation updates
//! - [`acquisition`]: Acquisition scorers (information gain, variance and
//!   correlation reduction, baselines)
//! - [`selection`]: Sequential batch selection
//! - [`target`]: Growing prediction-target sets with subsampling
//! - [`loader`]: High-level batch loader
//! - [`dedup`]: Near-duplicate detection between feature vectors
//! - [`sink`]: Diagnostic metrics sinks
//! - [`error`]: Error types

pub mod acquisition;
pub mod covariance;
pub mod dedup;
pub mod error;
pub mod kernel;
pub mod loader;
pub mod oracle;
pub mod prelude;
pub mod primitives;
pub mod selection;
pub mod sink;
pub mod state;
pub mod target;

pub use acquisition::AcquisitionScorer;
pub use error::{IndagarError, Result};
pub use oracle::CovarianceOracle;
pub use primitives::{Matrix, Vector};
pub use selection::select_batch;
