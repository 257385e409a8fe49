//! Gas mixture thermodynamics for pipeline modeling.
//!
//! Provides the ten-component [`Composition`], the [`EquationOfState`]
//! models that turn pressure, temperature and composition into
//! compressibility and heat capacities, and the empirical property
//! [`correlations`] used alongside them.

mod composition;
mod error;

pub mod correlations;
pub mod eos;

pub use composition::{COMPONENT_COUNT, Component, Composition, CompositionError};
pub use eos::{
    Bwrs, BwrsParameters, CriticalProperties, DummyGas, Eos, EosProperties, EquationOfState,
    IdealGas, PengRobinson, ValidDomain,
};
pub use error::{EosError, RangeError};
