//! Core compute primitives (Vector, Matrix).
//!
//! These types provide the foundation for the covariance and
//! acquisition machinery in the rest of the crate.

mod matrix;
mod vector;

pub use matrix::{CholeskyFactor, Matrix};
pub use vector::Vector;
