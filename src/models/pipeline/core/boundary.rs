//! Inlet and outlet boundary conditions.

use uom::si::{
    f64::{MassRate, Pressure, ThermodynamicTemperature},
    mass_rate::kilogram_per_second,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
};

use crate::support::thermo::Composition;

use super::{InputError, PipeState};

/// A solved variable, in the order used by the flow system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Flow = 0,
    Pressure = 1,
    Temperature = 2,
}

impl Variable {
    pub const ALL: [Self; 3] = [Self::Flow, Self::Pressure, Self::Temperature];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One end value, imposed on the solve only when `active`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SingleCondition {
    /// Value in SI units.
    pub value: f64,
    pub active: bool,
}

impl SingleCondition {
    #[must_use]
    pub fn active(value: f64) -> Self {
        Self {
            value,
            active: true,
        }
    }

    #[must_use]
    pub fn inactive(value: f64) -> Self {
        Self {
            value,
            active: false,
        }
    }
}

/// Conditions at one end of the pipe.
///
/// The composition is only used at the inlet, where it feeds batch tracking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EndConditions {
    pub flow: SingleCondition,
    pub pressure: SingleCondition,
    pub temperature: SingleCondition,
    pub composition: Composition,
}

impl EndConditions {
    /// All variables free, with the given composition.
    #[must_use]
    pub fn new(composition: Composition) -> Self {
        Self {
            composition,
            ..Self::default()
        }
    }

    /// Imposes a mass flow.
    #[must_use]
    pub fn with_flow(mut self, flow: MassRate) -> Self {
        self.flow = SingleCondition::active(flow.get::<kilogram_per_second>());
        self
    }

    /// Imposes a pressure.
    #[must_use]
    pub fn with_pressure(mut self, pressure: Pressure) -> Self {
        self.pressure = SingleCondition::active(pressure.get::<pascal>());
        self
    }

    /// Imposes a temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.temperature = SingleCondition::active(temperature.get::<kelvin>());
        self
    }

    /// The condition for a variable.
    #[must_use]
    pub fn get(&self, variable: Variable) -> SingleCondition {
        match variable {
            Variable::Flow => self.flow,
            Variable::Pressure => self.pressure,
            Variable::Temperature => self.temperature,
        }
    }

    /// Number of active conditions at this end.
    #[must_use]
    pub fn active_count(&self) -> usize {
        Variable::ALL
            .iter()
            .filter(|&&variable| self.get(variable).active)
            .count()
    }
}

/// Which end(s) a variable is imposed at when deriving conditions from a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundarySetting {
    #[default]
    None,
    Inlet,
    Outlet,
    Both,
}

impl BoundarySetting {
    fn at_inlet(self) -> bool {
        matches!(self, Self::Inlet | Self::Both)
    }

    fn at_outlet(self) -> bool {
        matches!(self, Self::Outlet | Self::Both)
    }
}

/// Conditions at both ends of the pipe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundaryConditions {
    pub inlet: EndConditions,
    pub outlet: EndConditions,
}

impl BoundaryConditions {
    #[must_use]
    pub fn new(inlet: EndConditions, outlet: EndConditions) -> Self {
        Self { inlet, outlet }
    }

    /// Takes end values from a state, activating each variable where its
    /// setting says so.
    ///
    /// Settings are ordered `[flow, pressure, temperature]`. Compositions are
    /// taken from the first and last grid points.
    ///
    /// # Errors
    ///
    /// Fails if the state has no grid points.
    pub fn from_state(state: &PipeState, settings: [BoundarySetting; 3]) -> Result<Self, InputError> {
        let n = state.len();
        if n == 0 {
            return Err(InputError::SizeMismatch {
                what: "state",
                expected: 2,
                actual: 0,
            });
        }

        let end = |i: usize, active: &dyn Fn(BoundarySetting) -> bool| {
            let condition = |value: f64, setting: BoundarySetting| SingleCondition {
                value,
                active: active(setting),
            };
            EndConditions {
                flow: condition(state.flow[i], settings[0]),
                pressure: condition(state.pressure[i], settings[1]),
                temperature: condition(state.temperature[i], settings[2]),
                composition: state.composition[i],
            }
        };

        Ok(Self {
            inlet: end(0, &BoundarySetting::at_inlet),
            outlet: end(n - 1, &BoundarySetting::at_outlet),
        })
    }

    /// Total number of active conditions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inlet.active_count() + self.outlet.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::pressure::bar;

    use crate::models::pipeline::core::test_support::uniform_state;

    #[test]
    fn builder_activates_conditions() {
        let inlet = EndConditions::new(Composition::default())
            .with_pressure(Pressure::new::<bar>(50.0))
            .with_temperature(ThermodynamicTemperature::new::<kelvin>(300.0));
        let outlet =
            EndConditions::default().with_flow(MassRate::new::<kilogram_per_second>(20.0));

        let bc = BoundaryConditions::new(inlet, outlet);
        assert_eq!(bc.active_count(), 3);
        assert!(!bc.inlet.flow.active);
        assert_relative_eq!(bc.inlet.pressure.value, 50e5);
        assert_relative_eq!(bc.outlet.flow.value, 20.0);
    }

    #[test]
    fn derived_from_state() {
        let mut state = uniform_state(5, 10.0, 50e5, 290.0);
        state.pressure[4] = 49e5;

        let bc = BoundaryConditions::from_state(
            &state,
            [
                BoundarySetting::Outlet,
                BoundarySetting::Inlet,
                BoundarySetting::Both,
            ],
        )
        .expect("state is not empty");

        assert_eq!(bc.active_count(), 4);
        assert!(bc.outlet.flow.active);
        assert!(!bc.outlet.pressure.active);
        assert_relative_eq!(bc.outlet.pressure.value, 49e5);
        assert!(bc.inlet.temperature.active && bc.outlet.temperature.active);
    }
}
