use thiserror::Error;
use uom::si::f64::{Pressure, ThermodynamicTemperature};

/// A state variable fell outside a model's validated domain.
///
/// Raised by equations of state and heat-transfer correlations. Values are
/// never clamped into range; the caller decides how to recover (typically by
/// shortening the time step or correcting a boundary condition).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RangeError {
    #[error("pressure out of range: {value:?} not in [{min:?}, {max:?}]")]
    Pressure {
        value: Pressure,
        min: Pressure,
        max: Pressure,
    },

    #[error("temperature out of range: {value:?} not in [{min:?}, {max:?}]")]
    Temperature {
        value: ThermodynamicTemperature,
        min: ThermodynamicTemperature,
        max: ThermodynamicTemperature,
    },

    /// A film-coefficient correlation was queried outside its Reynolds range.
    #[error("Reynolds number out of range: {value} not in [{min}, {max}]")]
    ReynoldsNumber { value: f64, min: f64, max: f64 },
}

/// Errors from evaluating an equation of state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EosError {
    /// Pressure or temperature outside the model's domain.
    #[error(transparent)]
    OutOfRange(#[from] RangeError),

    /// The density iteration hit its cap.
    #[error("density iteration did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// The calculation produced a non-physical or non-finite value.
    #[error("calculation error: {context}")]
    Calculation { context: String },
}
