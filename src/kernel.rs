//! Kernel functions over embedding vectors.
//!
//! A kernel turns raw feature vectors into prior covariance entries.
//! [`crate::oracle::KernelOracle`] applies one of these pointwise to
//! build covariance blocks on demand.

use crate::error::{IndagarError, Result};
use serde::{Deserialize, Serialize};

/// A positive semi-definite kernel over feature vectors.
pub trait Kernel {
    /// Evaluates k(x, y).
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    fn eval(&self, x: &[f64], y: &[f64]) -> f64;
}

/// Radial basis function (squared exponential) kernel.
///
/// k(x, y) = exp(-||x - y||^2 / (2 * lengthscale^2))
///
/// # Examples
///
/// ```
/// use indagar::kernel::{Kernel, Rbf};
///
/// let k = Rbf::new(1.0).expect("lengthscale is positive");
/// assert!((k.eval(&[0.0], &[0.0]) - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rbf {
    lengthscale: f64,
}

impl Rbf {
    /// Creates an RBF kernel with the given lengthscale.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengthscale is not finite and positive.
    pub fn new(lengthscale: f64) -> Result<Self> {
        if !lengthscale.is_finite() || lengthscale <= 0.0 {
            return Err(IndagarError::InvalidHyperparameter {
                param: "lengthscale".to_string(),
                value: format!("{lengthscale}"),
                constraint: "finite and positive".to_string(),
            });
        }
        Ok(Self { lengthscale })
    }

    /// Returns the lengthscale.
    #[must_use]
    pub fn lengthscale(&self) -> f64 {
        self.lengthscale
    }
}

impl Kernel for Rbf {
    fn eval(&self, x: &[f64], y: &[f64]) -> f64 {
        assert_eq!(x.len(), y.len(), "Kernel inputs must have same length");
        let sq_dist: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        (-sq_dist / (2.0 * self.lengthscale * self.lengthscale)).exp()
    }
}

/// Linear (dot product) kernel.
///
/// k(x, y) = <x, y>. This is the kernel induced by treating the feature
/// vectors themselves as the embedding map.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Linear;

impl Kernel for Linear {
    fn eval(&self, x: &[f64], y: &[f64]) -> f64 {
        assert_eq!(x.len(), y.len(), "Kernel inputs must have same length");
        x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbf_at_zero_distance() {
        let k = Rbf::new(0.5).expect("lengthscale is positive");
        assert!((k.eval(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rbf_known_value() {
        // ||x - y||^2 = 4, lengthscale 1 => exp(-2)
        let k = Rbf::new(1.0).expect("lengthscale is positive");
        let expected = (-2.0_f64).exp();
        assert!((k.eval(&[0.0, 0.0], &[2.0, 0.0]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rbf_symmetry() {
        let k = Rbf::new(2.0).expect("lengthscale is positive");
        let x = [1.0, -0.5, 3.0];
        let y = [0.2, 0.7, -1.0];
        assert!((k.eval(&x, &y) - k.eval(&y, &x)).abs() < 1e-12);
    }

    #[test]
    fn test_rbf_rejects_bad_lengthscale() {
        assert!(Rbf::new(0.0).is_err());
        assert!(Rbf::new(-1.0).is_err());
        assert!(Rbf::new(f64::NAN).is_err());
    }

    #[test]
    fn test_linear_is_dot_product() {
        let k = Linear;
        assert!((k.eval(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]) - 32.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_eval_length_mismatch_panics() {
        let k = Linear;
        let _ = k.eval(&[1.0], &[1.0, 2.0]);
    }
}
