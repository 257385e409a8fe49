use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::{kilopascal, megapascal},
    thermodynamic_temperature::kelvin,
};

use crate::support::thermo::{
    COMPONENT_COUNT, Composition, EosError,
    correlations::{isobaric_heat_capacity_langelandsvik, isochoric_heat_capacity_jfh},
};

use super::{CriticalProperties, EosProperties, EquationOfState, ValidDomain};

const OMEGA_A: f64 = 0.457_24;
const OMEGA_B: f64 = 0.077_80;

const ROOT_TOLERANCE: f64 = 1e-13;
const ROOT_MAX_ITERATIONS: usize = 100;

/// Mixture attraction `a(T)`, its temperature derivative and co-volume `b`.
#[derive(Debug, Clone, Copy)]
struct Mixture {
    a: f64,
    da_dt: f64,
    b: f64,
}

/// Peng–Robinson cubic equation of state.
///
/// Uses van der Waals one-fluid mixing with the geometric-mean attraction
/// rule. `Z` is the largest real root of the cubic, found by Newton iteration
/// from above all roots, so the gas branch is always selected. Heat
/// capacities come from the same correlations as [`Bwrs`](super::Bwrs).
#[derive(Debug, Clone, PartialEq)]
pub struct PengRobinson {
    critical: CriticalProperties,
    interaction: [[f64; COMPONENT_COUNT]; COMPONENT_COUNT],
}

impl Default for PengRobinson {
    /// Calsep critical properties with no binary interaction.
    fn default() -> Self {
        Self::new(CriticalProperties::calsep())
    }
}

impl PengRobinson {
    #[must_use]
    pub fn new(critical: CriticalProperties) -> Self {
        Self {
            critical,
            interaction: [[0.0; COMPONENT_COUNT]; COMPONENT_COUNT],
        }
    }

    /// Replaces the binary interaction table; `k_ij` is read as `k[i][j]`.
    #[must_use]
    pub fn with_interaction(mut self, k: [[f64; COMPONENT_COUNT]; COMPONENT_COUNT]) -> Self {
        self.interaction = k;
        self
    }

    fn mixture(&self, temperature: f64, composition: &Composition) -> Mixture {
        let c = &self.critical;
        let r = c.gas_constant;
        let x = composition.fractions();

        let mut a = [0.0; COMPONENT_COUNT];
        let mut da = [0.0; COMPONENT_COUNT];
        let mut b = 0.0;
        for i in 0..COMPONENT_COUNT {
            let (tc, pc, w) = (c.temperature[i], c.pressure[i], c.acentric_factor[i]);
            let kappa = 0.374_64 + 1.542_26 * w - 0.269_92 * w * w;
            let sqrt_alpha = 1.0 + kappa * (1.0 - (temperature / tc).sqrt());
            let ac = OMEGA_A * r * r * tc * tc / pc;

            a[i] = ac * sqrt_alpha * sqrt_alpha;
            da[i] = -ac * kappa * sqrt_alpha / (temperature * tc).sqrt();
            b += x[i] * OMEGA_B * r * tc / pc;
        }

        let mut mix = Mixture { a: 0.0, da_dt: 0.0, b };
        for i in 0..COMPONENT_COUNT {
            for j in 0..COMPONENT_COUNT {
                let xx = x[i] * x[j] * (1.0 - self.interaction[i][j]);
                if xx == 0.0 {
                    continue;
                }
                let aij = (a[i] * a[j]).sqrt();
                mix.a += xx * aij;
                mix.da_dt += xx * (da[i] * a[j] + a[i] * da[j]) / (2.0 * aij);
            }
        }
        mix
    }

    /// Largest real root of `Z³ + c2·Z² + c1·Z + c0 = 0`.
    fn gas_root(c2: f64, c1: f64, c0: f64) -> Result<f64, EosError> {
        let mut z = 1.0 + c2.abs().max(c1.abs()).max(c0.abs());
        for _ in 0..ROOT_MAX_ITERATIONS {
            let f = ((z + c2) * z + c1) * z + c0;
            let df = (3.0 * z + 2.0 * c2) * z + c1;
            let step = f / df;
            if !step.is_finite() {
                return Err(EosError::Calculation {
                    context: format!("non-finite cubic update at Z = {z}"),
                });
            }
            z -= step;
            if step.abs() < ROOT_TOLERANCE {
                return Ok(z);
            }
        }
        Err(EosError::NoConvergence {
            iterations: ROOT_MAX_ITERATIONS,
        })
    }
}

impl EquationOfState for PengRobinson {
    fn valid_domain(&self) -> ValidDomain {
        ValidDomain::new(
            [Pressure::new::<kilopascal>(1.0), Pressure::new::<megapascal>(40.0)],
            [
                ThermodynamicTemperature::new::<kelvin>(150.0),
                ThermodynamicTemperature::new::<kelvin>(500.0),
            ],
        )
    }

    fn component_molar_masses(&self) -> &[f64; COMPONENT_COUNT] {
        &self.critical.molar_mass
    }

    #[allow(clippy::many_single_char_names)]
    fn evaluate(
        &self,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<EosProperties, EosError> {
        self.valid_domain().check(pressure, temperature)?;

        let (p, t) = (pressure, temperature);
        let r = self.critical.gas_constant;
        let m = self.mixture(t, composition);

        let big_a = m.a * p / (r * t).powi(2);
        let big_b = m.b * p / (r * t);
        let c2 = big_b - 1.0;
        let c1 = big_a - 3.0 * big_b * big_b - 2.0 * big_b;
        let c0 = big_b * big_b + big_b.powi(3) - big_a * big_b;
        let z = Self::gas_root(c2, c1, c0)?;
        if z <= big_b {
            return Err(EosError::Calculation {
                context: format!("Z = {z} below co-volume bound {big_b} at p = {p} Pa, T = {t} K"),
            });
        }

        // Implicit derivatives of the cubic F(Z, A, B) = 0.
        let f_z = (3.0 * z + 2.0 * c2) * z + c1;
        let f_a = z - big_b;
        let f_b = z * z - 6.0 * big_b * z - 2.0 * z - big_a + 2.0 * big_b + 3.0 * big_b * big_b;

        let dz_dp_t = -(f_a * big_a + f_b * big_b) / (p * f_z);
        let dz_dt_p = -(f_a * big_a * (m.da_dt / m.a - 2.0 / t) - f_b * big_b / t) / f_z;

        let v = z * r * t / p;
        let d = v * v + 2.0 * m.b * v - m.b * m.b;
        let dz_dt_rho = -v * (m.da_dt * t - m.a) / (r * d * t * t);

        let molar_mass = self.molar_mass(composition);
        Ok(EosProperties {
            z,
            dz_dt_p,
            dz_dp_t,
            dz_dt_rho,
            cp: isobaric_heat_capacity_langelandsvik(molar_mass, p, t),
            cv: isochoric_heat_capacity_jfh(p),
            molar_mass,
        })
    }
}
