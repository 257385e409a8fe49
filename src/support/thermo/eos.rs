//! Equations of state for natural gas mixtures.
//!
//! An equation of state maps `(pressure, temperature, composition)` to the
//! compressibility factor `Z`, three of its partial derivatives and the two
//! heat capacities. Evaluation is a pure function of its inputs: models keep
//! no cache between calls, so the same inputs always give the same outputs.
//!
//! Each model declares a [`ValidDomain`] and fails with a
//! [`RangeError`] outside it rather than clamping.
//!
//! Four models are provided:
//!
//! - [`IdealGas`]: `Z = 1` with correlation-based heat capacities
//! - [`Bwrs`]: Benedict–Webb–Rubin–Starling with mixing rules, on the
//!   Starling, Calsep or JFH [`CriticalProperties`]
//! - [`PengRobinson`]: the Peng–Robinson cubic
//! - [`DummyGas`]: fixed outputs, for exercising the numerical core
//!
//! [`Eos`] selects one of them at runtime.

mod bwrs;
mod critical;
mod dummy;
mod ideal_gas;
mod peng_robinson;

use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::pascal,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermodynamic_temperature::kelvin,
};

pub use bwrs::{Bwrs, BwrsParameters};
pub use critical::CriticalProperties;
pub use dummy::DummyGas;
pub use ideal_gas::IdealGas;
pub use peng_robinson::PengRobinson;

use super::{
    COMPONENT_COUNT, Composition, EosError, RangeError,
    correlations::{GAS_CONSTANT, STANDARD_PRESSURE, STANDARD_TEMPERATURE, specific_gas_constant},
};
use crate::support::units::SpecificGasConstant;

/// Properties returned by an [`EquationOfState`].
///
/// All values are SI. Heat capacities are specific (per kg) and the molar
/// mass is in g/mol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EosProperties {
    /// Compressibility factor.
    pub z: f64,
    /// `∂Z/∂T` at constant pressure, 1/K.
    pub dz_dt_p: f64,
    /// `∂Z/∂p` at constant temperature, 1/Pa.
    pub dz_dp_t: f64,
    /// `∂Z/∂T` at constant density, 1/K.
    pub dz_dt_rho: f64,
    /// Isobaric heat capacity, J/(kg·K).
    pub cp: f64,
    /// Isochoric heat capacity, J/(kg·K).
    pub cv: f64,
    /// Mixture molar mass, g/mol.
    pub molar_mass: f64,
}

/// Pressure and temperature bounds within which a model may be evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidDomain {
    min_pressure: f64,
    max_pressure: f64,
    min_temperature: f64,
    max_temperature: f64,
}

impl ValidDomain {
    /// Creates a domain from inclusive pressure and temperature bounds.
    #[must_use]
    pub fn new(
        pressure: [Pressure; 2],
        temperature: [ThermodynamicTemperature; 2],
    ) -> Self {
        Self {
            min_pressure: pressure[0].get::<pascal>(),
            max_pressure: pressure[1].get::<pascal>(),
            min_temperature: temperature[0].get::<kelvin>(),
            max_temperature: temperature[1].get::<kelvin>(),
        }
    }

    /// A domain that accepts every finite, non-negative state.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            min_pressure: 0.0,
            max_pressure: f64::MAX,
            min_temperature: 0.0,
            max_temperature: f64::MAX,
        }
    }

    /// Checks a state in Pa and K against the bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound as a [`RangeError`]. `NaN` inputs are
    /// always out of range.
    pub fn check(&self, pressure: f64, temperature: f64) -> Result<(), RangeError> {
        if !(self.min_pressure..=self.max_pressure).contains(&pressure) {
            return Err(RangeError::Pressure {
                value: Pressure::new::<pascal>(pressure),
                min: Pressure::new::<pascal>(self.min_pressure),
                max: Pressure::new::<pascal>(self.max_pressure),
            });
        }
        if !(self.min_temperature..=self.max_temperature).contains(&temperature) {
            return Err(RangeError::Temperature {
                value: ThermodynamicTemperature::new::<kelvin>(temperature),
                min: ThermodynamicTemperature::new::<kelvin>(self.min_temperature),
                max: ThermodynamicTemperature::new::<kelvin>(self.max_temperature),
            });
        }
        Ok(())
    }
}

/// A gas equation of state.
pub trait EquationOfState {
    /// The domain this model is valid in.
    fn valid_domain(&self) -> ValidDomain;

    /// Per-component molar masses in g/mol, in [`Component::ALL`] order.
    ///
    /// [`Component::ALL`]: super::Component::ALL
    fn component_molar_masses(&self) -> &[f64; COMPONENT_COUNT];

    /// Evaluates the model at a pressure in Pa and a temperature in K.
    ///
    /// # Errors
    ///
    /// Returns [`EosError::OutOfRange`] outside [`Self::valid_domain`], or a
    /// model-specific failure.
    fn evaluate(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<EosProperties, EosError>;

    /// Compressibility factor alone.
    ///
    /// # Errors
    ///
    /// Same as [`Self::evaluate`].
    fn compressibility(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<f64, EosError> {
        Ok(self.evaluate(pressure, temperature, composition)?.z)
    }

    /// Mixture molar mass in g/mol.
    fn molar_mass(&self, composition: &Composition) -> f64 {
        composition.weighted_sum(self.component_molar_masses())
    }

    /// Specific gas constant of the mixture.
    fn specific_gas_constant(&self, composition: &Composition) -> SpecificGasConstant {
        SpecificGasConstant::new::<joule_per_kilogram_kelvin>(specific_gas_constant(
            self.molar_mass(composition),
        ))
    }

    /// Density in kg/m³ at standard conditions (288.15 K, 101 325 Pa).
    ///
    /// # Errors
    ///
    /// Fails if standard conditions are outside the model's domain.
    fn standard_density(&self, composition: &Composition) -> Result<f64, EosError> {
        let ideal = self.molar_mass(composition) / 1000.0 * STANDARD_PRESSURE
            / (GAS_CONSTANT * STANDARD_TEMPERATURE);
        let z = self.compressibility(STANDARD_PRESSURE, STANDARD_TEMPERATURE, composition)?;
        Ok(ideal / z)
    }
}

/// Runtime selection of an equation of state.
#[derive(Debug, Clone, PartialEq)]
pub enum Eos {
    IdealGas(IdealGas),
    Bwrs(Bwrs),
    PengRobinson(PengRobinson),
    Dummy(DummyGas),
}

impl Default for Eos {
    fn default() -> Self {
        Self::Bwrs(Bwrs::default())
    }
}

impl Eos {
    fn inner(&self) -> &dyn EquationOfState {
        match self {
            Self::IdealGas(eos) => eos,
            Self::Bwrs(eos) => eos,
            Self::PengRobinson(eos) => eos,
            Self::Dummy(eos) => eos,
        }
    }
}

impl EquationOfState for Eos {
    fn valid_domain(&self) -> ValidDomain {
        self.inner().valid_domain()
    }

    fn component_molar_masses(&self) -> &[f64; COMPONENT_COUNT] {
        self.inner().component_molar_masses()
    }

    fn evaluate(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<EosProperties, EosError> {
        self.inner().evaluate(pressure, temperature, composition)
    }

    fn compressibility(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<f64, EosError> {
        self.inner().compressibility(pressure, temperature, composition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::pressure::bar;

    use crate::support::thermo::Component;

    #[test]
    fn domain_rejects_out_of_range_states() {
        let domain = ValidDomain::new(
            [Pressure::new::<bar>(1.0), Pressure::new::<bar>(100.0)],
            [
                ThermodynamicTemperature::new::<kelvin>(200.0),
                ThermodynamicTemperature::new::<kelvin>(400.0),
            ],
        );

        assert!(domain.check(50e5, 300.0).is_ok());

        match domain.check(0.5e5, 300.0) {
            Err(RangeError::Pressure { value, min, .. }) => {
                assert_relative_eq!(value.get::<bar>(), 0.5);
                assert_relative_eq!(min.get::<bar>(), 1.0);
            }
            other => panic!("Expected Pressure error, got: {other:?}"),
        }

        assert!(matches!(
            domain.check(50e5, 401.0),
            Err(RangeError::Temperature { .. })
        ));
        assert!(matches!(
            domain.check(f64::NAN, 300.0),
            Err(RangeError::Pressure { .. })
        ));
    }

    #[test]
    fn selection_delegates_to_model() {
        let gas = Composition::default();
        let eos = Eos::Dummy(DummyGas);

        let props = eos.evaluate(1e5, 300.0, &gas).expect("dummy always evaluates");
        assert_relative_eq!(props.cp, 5.0);
        assert_relative_eq!(eos.molar_mass(&Composition::pure(Component::Ethane)), 2.0);
    }

    #[test]
    fn ideal_standard_density() {
        let methane = Composition::pure(Component::Methane);
        let eos = Eos::IdealGas(IdealGas::default());

        let density = eos.standard_density(&methane).expect("standard state is valid");
        assert_relative_eq!(density, 0.6784, max_relative = 1e-3);
        assert_relative_eq!(
            eos.specific_gas_constant(&methane).get::<joule_per_kilogram_kelvin>(),
            518.29,
            max_relative = 1e-3
        );
    }
}
