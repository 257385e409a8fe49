use super::{Discretizer, Element, EquationRow};

/// Energy equation written for specific internal energy.
///
/// Uses the isochoric heat capacity with `∂Z/∂T|ρ`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternalEnergy;

impl Discretizer for InternalEnergy {
    fn energy(&self, e: &Element) -> EquationRow {
        let zrt = e.z * e.gas_constant * e.temperature;
        let velocity = e.flow * e.zrt_over_pa();

        // Pressure work per unit velocity divergence, in K.
        let expansion =
            zrt / e.cv * e.temperature * (1.0 / e.temperature + e.dz_dt_rho / e.z);
        let c2 = velocity * expansion;
        let c2_over_flow = e.zrt_over_pa() * expansion;
        let c3 = 1.0 / e.pressure - e.dz_dp_t / e.z;
        let c4 = 1.0 / e.temperature + e.dz_dt_p / e.z;

        let heat_source = -4.0 * e.heat_flux / (e.diameter * e.density);
        let c5 = e.friction / (2.0 * e.cv * e.diameter)
            * e.temperature.powi(2)
            * (e.z * e.gas_constant * e.flow / (e.pressure * e.area)).powi(3)
            + heat_source / (e.temperature * e.cv);

        let temperature_diagonal = 1.0 / (2.0 * e.dt) - c5 / 2.0;
        let advection = velocity / e.dx + c2 * c4 / e.dx;

        EquationRow {
            term_i: [
                -c2_over_flow / e.dx,
                c2 * c3 / e.dx,
                temperature_diagonal - advection,
            ],
            term_ipp: [
                c2_over_flow / e.dx,
                -c2 * c3 / e.dx,
                temperature_diagonal + advection,
            ],
            boundary: e.previous_temperature_sum / (2.0 * e.dt),
        }
    }
}
