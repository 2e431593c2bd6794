//! Prediction-target bookkeeping between selection calls.
//!
//! A [`TargetSet`] owns the target rows and can grow as new targets
//! arrive between batches. Large target sets are subsampled per call:
//! a fraction of the rows, capped at a maximum, drawn without
//! replacement, reproducibly when seeded.

use crate::error::{IndagarError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Growable set of prediction-target rows with per-call subsampling.
///
/// # Examples
///
/// ```
/// use indagar::primitives::Matrix;
/// use indagar::target::TargetSet;
///
/// let rows = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("4*1=4 elements");
/// let targets = TargetSet::new(rows)
///     .with_subsampled_fraction(0.5)
///     .expect("fraction in (0, 1]")
///     .with_seed(7);
/// assert_eq!(targets.sample().n_rows(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSet {
    points: Matrix<f64>,
    fraction: f64,
    max_size: Option<usize>,
    seed: Option<u64>,
}

impl TargetSet {
    /// Creates a target set from a matrix of rows (possibly zero rows).
    #[must_use]
    pub fn new(points: Matrix<f64>) -> Self {
        Self {
            points,
            fraction: 1.0,
            max_size: None,
            seed: None,
        }
    }

    /// Sets the fraction of rows drawn per sample.
    ///
    /// # Errors
    ///
    /// Returns an error unless the fraction lies in (0, 1].
    pub fn with_subsampled_fraction(mut self, fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(IndagarError::InvalidHyperparameter {
                param: "subsampled_fraction".to_string(),
                value: format!("{fraction}"),
                constraint: "within (0, 1]".to_string(),
            });
        }
        self.fraction = fraction;
        Ok(self)
    }

    /// Caps the number of rows drawn per sample.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Seeds the subsampling, making `sample` reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of target rows currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.n_rows()
    }

    /// True when no target rows are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature dimension of the target rows.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.points.n_cols()
    }

    /// Appends target rows (online growth).
    ///
    /// # Errors
    ///
    /// Returns an error if the column counts disagree.
    pub fn add_points(&mut self, points: &Matrix<f64>) -> Result<()> {
        if points.n_rows() == 0 {
            return Ok(());
        }
        if self.len() > 0 && points.n_cols() != self.n_cols() {
            return Err(IndagarError::dimension_mismatch(
                "target columns",
                self.n_cols(),
                points.n_cols(),
            ));
        }

        let rows = self.len() + points.n_rows();
        let mut data = self.points.as_slice().to_vec();
        data.extend_from_slice(points.as_slice());
        self.points = Matrix::from_vec(rows, points.n_cols(), data)?;
        Ok(())
    }

    /// Draws the subsampled target rows for one selection call.
    ///
    /// Draws `max(1, ceil(fraction * len))` rows, capped at the
    /// configured maximum, without replacement, in ascending original
    /// order. An empty set yields an empty matrix.
    #[must_use]
    pub fn sample(&self) -> Matrix<f64> {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let len = self.len();
        if len == 0 {
            return self.points.clone();
        }

        let mut draw = ((self.fraction * len as f64).ceil() as usize).max(1);
        if let Some(cap) = self.max_size {
            draw = draw.min(cap);
        }
        if draw >= len {
            return self.points.clone();
        }

        let mut indices: Vec<usize> = (0..len).collect();
        if let Some(seed) = self.seed {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        } else {
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }
        indices.truncate(draw);
        indices.sort_unstable();

        let all_cols: Vec<usize> = (0..self.n_cols()).collect();
        self.points
            .sub_matrix(&indices, &all_cols)
            .expect("sampled indices are within the target set")
    }
}
