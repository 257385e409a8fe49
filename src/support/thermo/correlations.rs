//! Empirical gas property correlations and physical constants.
//!
//! These operate on plain SI `f64` values because they are evaluated per grid
//! point inside the solver loop. Molar masses are in g/mol.

/// Universal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314_459_8;

/// Standard reference temperature in K.
pub const STANDARD_TEMPERATURE: f64 = 288.15;

/// Standard reference pressure in Pa.
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Molar mass of dry air in g/mol.
pub const MOLAR_MASS_OF_AIR: f64 = 28.967;

const KELVIN_TO_RANKINE: f64 = 1.8;
const PASCAL_TO_POUND_FORCE_PER_SQUARE_FOOT: f64 = 0.3048 * 0.3048 / 4.448_221_615_260_5;
const FOOT_POUND_FORCE_PER_SLUG_RANKINE: f64 = 1.355_817_948 / (14.5939 * 5.0 / 9.0);

/// Specific gas constant in J/(kg·K) for a molar mass in g/mol.
#[must_use]
pub fn specific_gas_constant(molar_mass: f64) -> f64 {
    GAS_CONSTANT / (molar_mass / 1000.0)
}

/// Isobaric heat capacity in J/(kg·K), Langelandsvik eq. 2.26/2.27.
///
/// Intended for 0 to 100 barg; loses accuracy at higher pressures.
#[must_use]
pub fn isobaric_heat_capacity_langelandsvik(molar_mass: f64, pressure: f64, temperature: f64) -> f64 {
    let specific_gravity = molar_mass / MOLAR_MASS_OF_AIR;
    let temperature_rankine = temperature * KELVIN_TO_RANKINE;

    let pressure_term = 15.69e-2
        * (pressure * PASCAL_TO_POUND_FORCE_PER_SQUARE_FOOT).powf(1.106)
        * (-6.203e-3 * temperature_rankine).exp()
        / specific_gravity;

    (1.432e4 - 1.045e4 * specific_gravity
        + 3.255 * temperature_rankine
        + 10.01 * specific_gravity * temperature_rankine
        + pressure_term)
        * FOOT_POUND_FORCE_PER_SLUG_RANKINE
}

/// Isochoric heat capacity in J/(kg·K) as a quadratic in pressure.
#[must_use]
pub fn isochoric_heat_capacity_jfh(pressure: f64) -> f64 {
    (-3.1e-16 * pressure * pressure + 1.46e-8 * pressure + 1.6826) * 1000.0
}

/// Dynamic viscosity in Pa·s from the Lee–Gonzalez–Eakin correlation.
///
/// `density` is the mass density in kg/m³.
#[must_use]
pub fn viscosity_lee_gonzalez_eakin(molar_mass: f64, temperature: f64, density: f64) -> f64 {
    let t = temperature * KELVIN_TO_RANKINE;
    let k = (9.4 + 0.02 * molar_mass) * t.powf(1.5) / (209.0 + 19.0 * molar_mass + t);
    let x = 3.5 + 986.0 / t + 0.01 * molar_mass;
    let y = 2.4 - 0.2 * x;

    // Micropoise to Pa·s.
    k * (x * (density / 1000.0).powf(y)).exp() / 1.0e7
}

/// Natural gas thermal conductivity in W/(m·K), linear in pressure.
#[must_use]
pub fn gas_thermal_conductivity(pressure: f64) -> f64 {
    0.002 * pressure / 1.0e6 + 0.024
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn methane_gas_constant() {
        assert_relative_eq!(specific_gas_constant(16.042), 518.29, max_relative = 1e-4);
    }

    #[test]
    fn heat_capacity_of_light_gas() {
        // Roughly 2.1 kJ/(kg·K) for a methane-rich gas near ambient conditions.
        let cp = isobaric_heat_capacity_langelandsvik(17.4, 0.0, 288.15);
        assert!(cp > 1900.0 && cp < 2300.0, "cp = {cp}");

        let cp_high = isobaric_heat_capacity_langelandsvik(17.4, 100e5, 288.15);
        assert!(cp_high > cp);
    }

    #[test]
    fn viscosity_is_of_expected_magnitude() {
        let mu = viscosity_lee_gonzalez_eakin(17.4, 290.0, 40.0);
        assert!(mu > 1.0e-5 && mu < 1.5e-5, "mu = {mu}");
    }

    #[test]
    fn conductivity_grows_with_pressure() {
        assert_relative_eq!(gas_thermal_conductivity(0.0), 0.024);
        assert_relative_eq!(gas_thermal_conductivity(10e6), 0.044);
        assert_relative_eq!(isochoric_heat_capacity_jfh(0.0), 1682.6);
    }
}
