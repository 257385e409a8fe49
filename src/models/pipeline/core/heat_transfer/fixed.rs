use uom::si::{
    f64::{HeatFluxDensity, HeatTransfer as HeatTransferCoefficient, ThermodynamicTemperature},
    heat_flux_density::watt_per_square_meter,
    heat_transfer::watt_per_square_meter_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::{constraint::NonNegative, units::TemperatureDifference};

use super::{ConfigError, GasConditions};

/// A heat flux that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedQ {
    /// W/m², positive when the gas cools.
    heat_flux: f64,
}

impl FixedQ {
    #[must_use]
    pub fn new(heat_flux: HeatFluxDensity) -> Self {
        Self {
            heat_flux: heat_flux.get::<watt_per_square_meter>(),
        }
    }

    #[must_use]
    pub fn heat_flux(&self) -> f64 {
        self.heat_flux
    }
}

/// A constant overall heat-transfer coefficient to the surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedU {
    /// W/(m²·K).
    coefficient: f64,
}

impl FixedU {
    /// # Errors
    ///
    /// Fails if `coefficient` is negative.
    pub fn new(coefficient: HeatTransferCoefficient) -> Result<Self, ConfigError> {
        let coefficient = NonNegative::new(coefficient)
            .map_err(ConfigError::constraint("heat transfer coefficient"))?
            .into_inner()
            .get::<watt_per_square_meter_kelvin>();
        Ok(Self { coefficient })
    }

    #[must_use]
    pub fn coefficient(&self) -> HeatTransferCoefficient {
        HeatTransferCoefficient::new::<watt_per_square_meter_kelvin>(self.coefficient)
    }

    /// `U·(T_gas − T_ambient)`.
    #[must_use]
    pub fn heat_flux_between(
        &self,
        gas: ThermodynamicTemperature,
        ambient: ThermodynamicTemperature,
    ) -> HeatFluxDensity {
        self.coefficient() * gas.minus(ambient)
    }

    #[must_use]
    pub fn heat_flux(&self, gas: &GasConditions) -> f64 {
        self.heat_flux_between(
            ThermodynamicTemperature::new::<kelvin>(gas.temperature),
            ThermodynamicTemperature::new::<kelvin>(gas.ambient_temperature),
        )
        .get::<watt_per_square_meter>()
    }
}
