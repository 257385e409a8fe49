//! Heat exchange between the gas and its surroundings.
//!
//! A [`HeatTransfer`] model turns the gas conditions at a grid point into a
//! heat flux through the bore, in W/m² and positive when the gas cools.
//! The radial models build the wall from concentric [`Shell`]s: the layers
//! of a [`PipeWall`] followed, for a buried pipe, by equivalent shells of the
//! burial medium. The outermost shell exchanges heat with an
//! [`AmbientFluid`] through a film coefficient fixed at construction.
//!
//! [`Unsteady`] is the only model with memory. Its shell temperatures live
//! in a [`HeatTransferState`] per grid point, owned by the caller between
//! steps.

mod fixed;
mod radial;
mod steady;
mod unsteady;
mod wall;

pub use fixed::{FixedQ, FixedU};
pub use radial::{
    BURIAL_SHELLS, RadialWall, Shell, equivalent_burial_radius, gas_conductivity,
    inner_film_coefficient, log_spaced_widths, outer_film_coefficient,
};
pub use steady::SteadyState;
pub use unsteady::Unsteady;
pub use wall::{AmbientFluid, Burial, Material, PipeWall, WallLayer};

use super::{ConfigError, InputError, PipeState, StepError};

/// Gas and ambient values at one grid point, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasConditions {
    /// K.
    pub temperature: f64,
    /// Pa.
    pub pressure: f64,
    pub reynolds: f64,
    /// J/(kg·K).
    pub cp: f64,
    /// Pa·s.
    pub viscosity: f64,
    /// K.
    pub ambient_temperature: f64,
}

impl GasConditions {
    /// Reads grid point `i` of a state with derived properties.
    #[must_use]
    pub fn at(state: &PipeState, i: usize) -> Self {
        Self {
            temperature: state.temperature[i],
            pressure: state.pressure[i],
            reynolds: state.derived.reynolds[i],
            cp: state.derived.cp[i],
            viscosity: state.derived.viscosity[i],
            ambient_temperature: state.ambient_temperature[i],
        }
    }
}

/// Heat flux and wall temperatures at one grid point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatTransferState {
    /// W/m², positive when the gas cools.
    pub heat_flux: f64,
    /// K, from the bore outwards. Empty for models without wall storage.
    pub shell_temperatures: Vec<f64>,
}

impl HeatTransferState {
    #[must_use]
    pub fn from_heat_flux(heat_flux: f64) -> Self {
        Self {
            heat_flux,
            shell_temperatures: Vec::new(),
        }
    }
}

/// The heat transfer model used along the whole pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum HeatTransfer {
    FixedQ(FixedQ),
    FixedU(FixedU),
    SteadyState(SteadyState),
    Unsteady(Unsteady),
}

impl Default for HeatTransfer {
    /// Adiabatic.
    fn default() -> Self {
        Self::FixedQ(FixedQ::default())
    }
}

impl HeatTransfer {
    /// Steady radial model with the default wall, unburied, in seawater.
    ///
    /// # Errors
    ///
    /// Fails when the outer diameter is too small for the outer film
    /// correlation.
    pub fn steady_state(diameter: f64) -> Result<Self, ConfigError> {
        Ok(Self::SteadyState(SteadyState::new(
            diameter,
            &PipeWall::default(),
            &Burial::none(),
            &AmbientFluid::default(),
        )?))
    }

    /// Unsteady radial model with the default wall, unburied, in seawater.
    ///
    /// # Errors
    ///
    /// Fails when the outer diameter is too small for the outer film
    /// correlation.
    pub fn unsteady(diameter: f64) -> Result<Self, ConfigError> {
        Ok(Self::Unsteady(Unsteady::new(
            diameter,
            &PipeWall::default(),
            &Burial::none(),
            &AmbientFluid::default(),
        )?))
    }

    /// State to start a run from.
    ///
    /// Unsteady walls start at the ambient temperature.
    #[must_use]
    pub fn initial_state(&self, gas: &GasConditions) -> HeatTransferState {
        match self {
            Self::FixedQ(model) => HeatTransferState::from_heat_flux(model.heat_flux()),
            Self::FixedU(model) => HeatTransferState::from_heat_flux(model.heat_flux(gas)),
            Self::SteadyState(model) => HeatTransferState::from_heat_flux(model.heat_flux(gas)),
            Self::Unsteady(model) => model.initial_state(gas),
        }
    }

    /// Heat transfer after `dt` seconds at the given gas conditions.
    ///
    /// # Errors
    ///
    /// Only [`Unsteady`] can fail; see [`Unsteady::evaluate`].
    pub fn evaluate(
        &self,
        current: &HeatTransferState,
        gas: &GasConditions,
        dt: f64,
    ) -> Result<HeatTransferState, StepError> {
        match self {
            Self::Unsteady(model) => model.evaluate(current, gas, dt),
            _ => Ok(self.initial_state(gas)),
        }
    }

    /// Moves an unsteady wall to its steady profile. Other models return
    /// `current` unchanged.
    ///
    /// # Errors
    ///
    /// See [`Unsteady::evaluate`].
    pub fn thermalize(
        &self,
        current: &HeatTransferState,
        gas: &GasConditions,
    ) -> Result<HeatTransferState, StepError> {
        match self {
            Self::Unsteady(model) => model.evaluate(current, gas, f64::INFINITY),
            _ => Ok(current.clone()),
        }
    }
}
