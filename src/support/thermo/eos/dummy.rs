use crate::support::thermo::{COMPONENT_COUNT, Composition, EosError};

use super::{EosProperties, EquationOfState, ValidDomain};

/// Component molar masses `1..=10` g/mol.
const MOLAR_MASSES: [f64; COMPONENT_COUNT] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

/// A placeholder gas with fixed, distinguishable outputs.
///
/// Returns `Z = 1`, `∂Z/∂T|p = 2`, `∂Z/∂p|T = 3`, `∂Z/∂T|ρ = 4`, `cp = 5` and
/// `cv = 6` regardless of state, which makes it easy to see which property
/// ends up where in assembled coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyGas;

impl EquationOfState for DummyGas {
    fn valid_domain(&self) -> ValidDomain {
        ValidDomain::unbounded()
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

        Ok(EosProperties {
            z: 1.0,
            dz_dt_p: 2.0,
            dz_dp_t: 3.0,
            dz_dt_rho: 4.0,
            cp: 5.0,
            cv: 6.0,
            molar_mass: self.molar_mass(composition),
        })
    }
}
