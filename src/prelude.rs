//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use indagar::prelude::*;
//! ```

pub use crate::primitives::{Matrix, Vector};
pub use crate::error::{IndagarError, Result};
pub use crate::oracle::{CovarianceOracle, EmbeddingOracle, KernelOracle};
pub use crate::kernel::{Kernel, Linear, Rbf};
pub use crate::covariance::JointCovariance;
pub use crate::state::{PointRole, SelectionState};
pub use crate::acquisition::{
    AcquisitionScorer, MarginalVariance, MaxDist, RandomScorer, TransductiveScorer,
    UncertaintyReduction,
};
pub use crate::selection::{select_batch, SelectionMode, SequentialSelector};
pub use crate::target::TargetSet;
pub use crate::loader::{ActiveDataLoader, OracleChoice};
pub use crate::dedup::{DuplicateDetector, NormScan};
pub use crate::sink::{MemorySink, MetricsSink, NoOpSink};
