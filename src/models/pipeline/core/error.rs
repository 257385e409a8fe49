use thiserror::Error;
use twine_solvers::equation::bisection;

use crate::support::{
    constraint::ConstraintError,
    numerics::{InterpolatorError, LinearAlgebraError},
    thermo::{EosError, RangeError},
};

use super::batch_tracking::BatchTrackingError;

/// The iteration that ran out of passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceLoop {
    /// Outer loop of the governing-equation solver.
    Flow,
    /// Fixed-point passes between the flow solve and heat transfer.
    HeatCoupling,
    /// Newton iteration for density inside an equation of state.
    Density,
    /// Colebrook–White root search.
    Friction,
}

/// Malformed input detected before or during a step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{what} has {actual} entries, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("at least 3 active boundary conditions are required, got {active}")]
    TooFewBoundaryConditions { active: usize },

    #[error(transparent)]
    Batch(#[from] BatchTrackingError),

    #[error("physics has not been initialized with a state")]
    NotInitialized,

    #[error("non-physical value: {context}")]
    NonPhysical { context: String },
}

/// Failure of a single time step.
///
/// Errors propagate unchanged; the caller decides whether to retry with a
/// smaller step or different boundary conditions.
#[derive(Debug, Error)]
pub enum StepError {
    /// A state variable left a model's valid domain.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// The linear system had no solution.
    #[error("no solution found")]
    LinearAlgebra(#[from] LinearAlgebraError),

    /// An iteration hit its cap.
    #[error("{stage:?} iteration did not converge after {iterations} iterations")]
    NoConvergence {
        stage: ConvergenceLoop,
        iterations: usize,
    },

    /// The friction-factor bisection failed.
    #[error("friction factor solve failed")]
    Friction(#[from] bisection::Error),

    #[error("invalid input")]
    InvalidInput(#[from] InputError),
}

impl From<EosError> for StepError {
    fn from(error: EosError) -> Self {
        match error {
            EosError::OutOfRange(range) => Self::Range(range),
            EosError::NoConvergence { iterations } => Self::NoConvergence {
                stage: ConvergenceLoop::Density,
                iterations,
            },
            EosError::Calculation { context } => {
                Self::InvalidInput(InputError::NonPhysical { context })
            }
        }
    }
}

impl From<BatchTrackingError> for StepError {
    fn from(error: BatchTrackingError) -> Self {
        Self::InvalidInput(InputError::Batch(error))
    }
}

/// Errors raised while building a pipe, a wall or a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{what}: {source}")]
    Constraint {
        what: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error("a grid needs at least 2 points, got {0}")]
    TooFewGridPoints(usize),

    #[error("elevation profile")]
    Elevation(#[from] InterpolatorError),

    #[error("a pipe wall needs at least one layer")]
    EmptyWall,

    /// A numeric setting outside its allowed range.
    #[error("invalid {what}: {value}")]
    InvalidSetting { what: &'static str, value: f64 },

    /// The surroundings fall outside the outer film correlation.
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("{what} has {actual} entries, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ConfigError {
    pub(crate) fn constraint(what: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::Constraint { what, source }
    }
}
