//! Building blocks shared by the pipeline models.
//!
//! - [`constraint`]: sign invariants checked at construction
//! - [`numerics`]: direct and least-squares linear solves, and interpolation
//! - [`thermo`]: gas composition, equations of state and correlations
//! - [`units`]: small extensions to [`uom`]

pub mod constraint;
pub mod numerics;
pub mod thermo;
pub mod units;
