use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::{megapascal, pascal},
    thermodynamic_temperature::kelvin,
};

use crate::support::thermo::{
    COMPONENT_COUNT, Composition, EosError,
    correlations::{isobaric_heat_capacity_langelandsvik, specific_gas_constant},
};

use super::{EosProperties, EquationOfState, ValidDomain};

/// Component molar masses in g/mol.
const MOLAR_MASSES: [f64; COMPONENT_COUNT] = [
    16.04, 30.07, 44.1, 58.12, 58.12, 72.15, 72.15, 86.18, 28.13, 44.01,
];

/// Ideal gas: `Z = 1` and all derivatives of `Z` vanish.
///
/// The isobaric heat capacity is the Langelandsvik correlation at zero
/// pressure, and `cv = cp − R_specific`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdealGas;

impl EquationOfState for IdealGas {
    fn valid_domain(&self) -> ValidDomain {
        ValidDomain::new(
            [Pressure::new::<pascal>(1.0), Pressure::new::<megapascal>(1000.0)],
            [
                ThermodynamicTemperature::new::<kelvin>(1.0),
                ThermodynamicTemperature::new::<kelvin>(1000.0),
            ],
        )
    }

    fn component_molar_masses(&self) -> &[f64; COMPONENT_COUNT] {
        &MOLAR_MASSES
    }

    fn evaluate(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<EosProperties, EosError> {
        self.valid_domain().check(pressure, temperature)?;

        let molar_mass = self.molar_mass(composition);
        let cp = isobaric_heat_capacity_langelandsvik(molar_mass, 0.0, temperature);

        Ok(EosProperties {
            z: 1.0,
            dz_dt_p: 0.0,
            dz_dp_t: 0.0,
            dz_dt_rho: 0.0,
            cp,
            cv: cp - specific_gas_constant(molar_mass),
            molar_mass,
        })
    }
}
