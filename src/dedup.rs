//! Near-duplicate detection over raw feature vectors.
//!
//! Once a point has been observed, the selector must never pick it (or a
//! numerically indistinguishable twin) again: a duplicate carries no new
//! information and a noiseless duplicate would make the evidence block
//! exactly singular. Detection is a pluggable strategy so a spatial index
//! can replace the linear scan for large observed sets.

use crate::primitives::Vector;
use serde::{Deserialize, Serialize};

/// Default relative tolerance for the closeness test.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Default absolute tolerance for the closeness test.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 0.0;

/// Decides whether a candidate vector duplicates an already observed one.
pub trait DuplicateDetector {
    /// Returns true when `candidate` is a near-duplicate of any vector in
    /// `observed`.
    fn is_duplicate(&self, candidate: &Vector<f64>, observed: &[Vector<f64>]) -> bool;
}

/// Linear scan using a norm-based closeness test.
///
/// Two vectors are close when
/// `||x - y|| <= max(rel_tol * max(||x||, ||y||), abs_tol)`.
///
/// # Examples
///
/// ```
/// use indagar::dedup::NormScan;
/// use indagar::primitives::Vector;
///
/// let scan = NormScan::default();
/// let x = Vector::from_slice(&[1.0, 2.0]);
/// assert!(scan.is_close(&x, &x.clone()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormScan {
    relative_tolerance: f64,
    absolute_tolerance: f64,
}

impl Default for NormScan {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
        }
    }
}

impl NormScan {
    /// Creates a scan with explicit tolerances.
    #[must_use]
    pub fn with_tolerances(relative_tolerance: f64, absolute_tolerance: f64) -> Self {
        Self {
            relative_tolerance,
            absolute_tolerance,
        }
    }

    /// Norm-based closeness test.
    ///
    /// Points exactly on the tolerance boundary count as close.
    ///
    /// # Panics
    ///
    /// Panics if the vectors have different lengths.
    #[must_use]
    pub fn is_close(&self, x: &Vector<f64>, y: &Vector<f64>) -> bool {
        let dist = (x - y).norm();
        let scale = x.norm().max(y.norm());
        dist <= (self.relative_tolerance * scale).max(self.absolute_tolerance)
    }
}

impl DuplicateDetector for NormScan {
    fn is_duplicate(&self, candidate: &Vector<f64>, observed: &[Vector<f64>]) -> bool {
        observed.iter().any(|seen| self.is_close(candidate, seen))
    }
}
