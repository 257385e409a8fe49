//! Linear algebra and interpolation used by the flow and wall solvers.
//!
//! Both the flow system and the radial wall system are assembled as
//! [`nalgebra`] matrices and handed to [`solve_linear`].

mod interpolation;
mod linear;

use thiserror::Error;

pub use interpolation::{Interpolator, InterpolatorError};
pub use linear::{solve_linear, tridiagonal};

/// Failure of a direct linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LinearAlgebraError {
    /// A factor had a zero pivot, so no unique solution exists.
    #[error("no solution found: matrix is singular")]
    Singular,

    /// The solution contained non-finite values.
    #[error("no solution found: non-finite value in row {row}")]
    NonFinite { row: usize },

    /// The matrix and right-hand side disagree in size.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
