use super::{Discretizer, Element, EquationRow};

/// Energy equation written for specific enthalpy.
///
/// Uses the isobaric heat capacity with `∂Z/∂p|T` and `∂Z/∂T|p`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enthalpy;

impl Discretizer for Enthalpy {
    fn energy(&self, e: &Element) -> EquationRow {
        let zr = e.z * e.gas_constant;
        let one_minus = 1.0 - e.pressure / e.z * e.dz_dp_t;
        let one_plus = 1.0 + e.temperature / e.z * e.dz_dt_p;

        // Squared isentropic wave speed, scaled.
        let w2_over_zrt = 1.0 / (one_minus - zr / e.cp * one_plus * one_plus);
        let w2_over_t = w2_over_zrt * zr;
        let w2 = w2_over_t * e.temperature;

        let volumetric_heat = 4.0 * e.heat_flux / e.diameter;

        let c3 = e.zrt_over_pa();
        let c4 = e.flow * (1.0 + w2_over_t / e.cp * one_plus * one_plus);
        let c5 = one_minus / (e.cp * e.pressure);
        let c6 = w2_over_t * volumetric_heat;
        let c7 = w2 * e.flow * e.flow.abs() * (e.friction / (2.0 * e.diameter * e.area)) * c3 * c3;

        let flow_gradient = w2 / e.cp * one_plus * c3 / e.dx;
        let pressure_gradient = w2 / e.cp * one_plus * c3 / e.pressure * e.flow * one_minus / e.dx;
        let temperature_diagonal = 1.0 / (2.0 * e.dt) + c5 * c6 / 2.0;

        EquationRow {
            term_i: [
                -flow_gradient - c5 * c7 / 2.0,
                pressure_gradient,
                temperature_diagonal - c3 * c4 / e.dx,
            ],
            term_ipp: [
                flow_gradient - c5 * c7 / 2.0,
                -pressure_gradient,
                temperature_diagonal + c3 * c4 / e.dx,
            ],
            boundary: e.previous_temperature_sum / (2.0 * e.dt),
        }
    }
}
