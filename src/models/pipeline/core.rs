//! Transient compressible flow in a single pipe.
//!
//! A step runs bottom-up through:
//!
//! - [`discretizer`]: finite-difference stencils of the governing equations
//! - [`matrix`]: the linear system built from the stencils and the active
//!   boundary conditions
//! - [`solver`]: the outer iteration that repeats both until the flow field
//!   settles
//! - [`heat_transfer`]: the wall heat flux for the converged field
//! - [`batch_tracking`]: composition fronts moved with the gas
//! - [`physics`]: the driver that couples all of the above
//!
//! Physical inputs are [`uom`] quantities at construction; per-grid arrays
//! in [`PipeState`] are SI `f64`.

mod config;
mod error;
mod geometry;
mod state;

pub mod batch_tracking;
pub mod boundary;
pub mod discretizer;
pub mod friction;
pub mod heat_transfer;
pub mod matrix;
pub mod physics;
pub mod solver;

#[cfg(test)]
mod test_support;

pub use config::{Config, FrictionConfig, Formulation, HeatCoupling, SolverConfig, ToleranceKind};
pub use error::{ConfigError, ConvergenceLoop, InputError, StepError};
pub use geometry::Pipe;
pub use state::{DerivedProperties, PipeState};
