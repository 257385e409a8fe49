//! The few unit pieces [`uom`] lacks for pipeline modeling.

use uom::{
    si::{
        ISQ, Quantity, SI,
        f64::{TemperatureInterval, ThermodynamicTemperature},
        temperature_interval, thermodynamic_temperature,
    },
    typenum::{N1, N2, P2, Z0},
};

/// J/(kg·K) in SI; the gas constant divided by the molar mass of a mixture.
pub type SpecificGasConstant = Quantity<ISQ<P2, Z0, N2, Z0, N1, Z0, Z0>, SI<f64>, f64>;

/// Gas-to-ambient temperature differences.
///
/// [`uom`] cannot subtract one absolute temperature from another to get an
/// interval, so a heat flux such as `U·(T_gas − T_ambient)` goes through
/// [`TemperatureDifference::minus`]:
///
/// ```
/// use twine_pipeflow::support::units::TemperatureDifference;
/// use uom::si::{f64::ThermodynamicTemperature, temperature_interval, thermodynamic_temperature::kelvin};
///
/// let gas = ThermodynamicTemperature::new::<kelvin>(303.15);
/// let sea = ThermodynamicTemperature::new::<kelvin>(278.15);
/// assert!((gas.minus(sea).get::<temperature_interval::kelvin>() - 25.0).abs() < 1e-12);
/// ```
pub trait TemperatureDifference {
    fn minus(self, ambient: Self) -> TemperatureInterval;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, ambient: Self) -> TemperatureInterval {
        let kelvin = |t: Self| t.get::<thermodynamic_temperature::kelvin>();
        TemperatureInterval::new::<temperature_interval::kelvin>(kelvin(self) - kelvin(ambient))
    }
}
