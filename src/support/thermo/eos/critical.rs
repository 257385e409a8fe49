use crate::support::thermo::{COMPONENT_COUNT, Component, correlations::GAS_CONSTANT};

/// Pure-component critical data, in [`Component::ALL`] order.
///
/// The three published sets differ mainly in the `C6` pseudo-component and
/// in the gas constant they were fitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalProperties {
    /// Universal gas constant the set was fitted with, J/(mol·K).
    pub gas_constant: f64,
    /// Critical temperature, K.
    pub temperature: [f64; COMPONENT_COUNT],
    /// Critical pressure, Pa.
    pub pressure: [f64; COMPONENT_COUNT],
    /// Critical molar density, mol/m³.
    pub density: [f64; COMPONENT_COUNT],
    pub acentric_factor: [f64; COMPONENT_COUNT],
    /// Molar mass, g/mol.
    pub molar_mass: [f64; COMPONENT_COUNT],
}

const PRESSURE_BAR: [f64; COMPONENT_COUNT] = [
    45.96, 48.839, 42.5, 36.48, 37.96, 33.81, 33.69, 27.34, 33.99, 73.825,
];

const MOLAR_MASS: [f64; COMPONENT_COUNT] = [
    16.04, 30.07, 44.1, 58.12, 58.12, 72.15, 72.15, 86.18, 28.13, 44.01,
];

fn bar(values: [f64; COMPONENT_COUNT]) -> [f64; COMPONENT_COUNT] {
    values.map(|v| v * 1e5)
}

impl CriticalProperties {
    /// Starling's tables, converted from field units.
    #[must_use]
    pub fn starling() -> Self {
        Self {
            gas_constant: 8.3160,
            temperature: [
                190.69, 305.39, 369.89, 408.13, 425.19, 460.37, 469.49, 507.29, 126.15, 304.15,
            ],
            pressure: bar(PRESSURE_BAR),
            density: [
                1.00500e4, 6.75659e3, 4.99936e3, 3.80118e3, 3.92132e3, 3.24694e3, 3.21491e3,
                2.71673e3, 1.10992e4, 1.06379e4,
            ],
            acentric_factor: [
                0.013, 0.1018, 0.157, 0.183, 0.197, 0.226, 0.252, 0.302, 0.035, 0.21,
            ],
            molar_mass: [
                16.042, 30.068, 44.094, 58.12, 58.12, 72.146, 72.146, 86.172, 28.016, 44.01,
            ],
        }
    }

    /// Calsep's set, with averaged `C6+` properties in the `C6` slot.
    #[must_use]
    pub fn calsep() -> Self {
        Self {
            gas_constant: GAS_CONSTANT,
            temperature: [
                190.56, 305.32, 369.83, 407.82, 425.13, 460.35, 469.7, 530.3, 126.19, 304.13,
            ],
            pressure: bar(PRESSURE_BAR),
            density: [
                1.014e4, 6.87e3, 5.0e3, 3.86e3, 3.92e3, 3.27e3, 3.21e3, 2.82664e3, 1.11323e4,
                1.062e4,
            ],
            acentric_factor: [
                0.0115, 0.099, 0.153, 0.1756, 0.19, 0.22, 0.25, 0.339, 0.037, 0.22,
            ],
            molar_mass: MOLAR_MASS,
        }
    }

    /// The JFH set: Calsep's light ends with pure n-hexane as `C6`.
    #[must_use]
    pub fn jfh() -> Self {
        let mut set = Self::calsep();
        let c6 = Component::Hexane.index();
        set.temperature[c6] = 507.82;
        set.pressure[c6] = 30.2e5;
        set.density[c6] = 2.71e3;
        set.acentric_factor[c6] = 0.281;
        set.density[Component::Nitrogen.index()] = 1.118e4;
        set
    }
}
