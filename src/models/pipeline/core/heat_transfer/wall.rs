use uom::si::{
    dynamic_viscosity::pascal_second,
    f64::{DynamicViscosity, Length, MassDensity, SpecificHeatCapacity, ThermalConductivity, Velocity},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    velocity::meter_per_second,
};

use crate::support::constraint::{NonNegative, StrictlyPositive};

use super::ConfigError;

/// Thermal properties of a solid or of the surrounding fluid, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// W/(m·K).
    pub(crate) conductivity: f64,
    /// kg/m³.
    pub(crate) density: f64,
    /// J/(kg·K).
    pub(crate) heat_capacity: f64,
}

impl Material {
    /// # Errors
    ///
    /// Fails if any property is not strictly positive.
    pub fn new(
        conductivity: ThermalConductivity,
        density: MassDensity,
        heat_capacity: SpecificHeatCapacity,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            conductivity: StrictlyPositive::new(conductivity)
                .map_err(ConfigError::constraint("conductivity"))?
                .into_inner()
                .get::<watt_per_meter_kelvin>(),
            density: StrictlyPositive::new(density)
                .map_err(ConfigError::constraint("density"))?
                .into_inner()
                .get::<kilogram_per_cubic_meter>(),
            heat_capacity: StrictlyPositive::new(heat_capacity)
                .map_err(ConfigError::constraint("heat capacity"))?
                .into_inner()
                .get::<joule_per_kilogram_kelvin>(),
        })
    }

    const fn raw(conductivity: f64, density: f64, heat_capacity: f64) -> Self {
        Self {
            conductivity,
            density,
            heat_capacity,
        }
    }

    #[must_use]
    pub const fn steel() -> Self {
        Self::raw(50.0, 7800.0, 590.0)
    }

    /// Weight coating.
    #[must_use]
    pub const fn concrete() -> Self {
        Self::raw(2.9, 3400.0, 650.0)
    }

    /// Anti-corrosion coating.
    #[must_use]
    pub const fn coating() -> Self {
        Self::raw(0.74, 1300.0, 1900.0)
    }

    #[must_use]
    pub const fn soil() -> Self {
        Self::raw(2.0, 2000.0, 1000.0)
    }

    #[must_use]
    pub const fn seawater() -> Self {
        Self::raw(0.571, 1020.0, 4187.0)
    }

    #[must_use]
    pub const fn air() -> Self {
        Self::raw(0.0257, 1.225, 1012.0)
    }

    #[must_use]
    pub fn conductivity(&self) -> ThermalConductivity {
        ThermalConductivity::new::<watt_per_meter_kelvin>(self.conductivity)
    }

    #[must_use]
    pub fn density(&self) -> MassDensity {
        MassDensity::new::<kilogram_per_cubic_meter>(self.density)
    }

    #[must_use]
    pub fn heat_capacity(&self) -> SpecificHeatCapacity {
        SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(self.heat_capacity)
    }
}

/// One concentric layer of the pipe wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLayer {
    /// m.
    pub(crate) thickness: f64,
    pub(crate) material: Material,
}

impl WallLayer {
    /// # Errors
    ///
    /// Fails if `thickness` is not strictly positive.
    pub fn new(thickness: Length, material: Material) -> Result<Self, ConfigError> {
        let thickness = StrictlyPositive::new(thickness)
            .map_err(ConfigError::constraint("layer thickness"))?
            .into_inner()
            .get::<meter>();
        Ok(Self {
            thickness,
            material,
        })
    }

    #[must_use]
    pub fn thickness(&self) -> Length {
        Length::new::<meter>(self.thickness)
    }

    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }
}

/// Wall layers ordered from the gas outwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeWall {
    layers: Vec<WallLayer>,
}

impl PipeWall {
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyWall`] without layers.
    pub fn new(layers: Vec<WallLayer>) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::EmptyWall);
        }
        Ok(Self { layers })
    }

    #[must_use]
    pub fn layers(&self) -> &[WallLayer] {
        &self.layers
    }

    /// Summed layer thickness.
    #[must_use]
    pub fn thickness(&self) -> Length {
        Length::new::<meter>(self.layers.iter().map(|layer| layer.thickness).sum())
    }
}

impl Default for PipeWall {
    /// 24 mm steel, 7 mm coating and 80 mm concrete.
    fn default() -> Self {
        Self {
            layers: vec![
                WallLayer {
                    thickness: 0.024,
                    material: Material::steel(),
                },
                WallLayer {
                    thickness: 0.007,
                    material: Material::coating(),
                },
                WallLayer {
                    thickness: 0.08,
                    material: Material::concrete(),
                },
            ],
        }
    }
}

/// The fluid flowing past the outside of the pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientFluid {
    pub(crate) material: Material,
    /// m/s.
    pub(crate) velocity: f64,
    /// Pa·s.
    pub(crate) viscosity: f64,
}

impl AmbientFluid {
    /// # Errors
    ///
    /// Fails if `velocity` or `viscosity` is not strictly positive.
    pub fn new(
        material: Material,
        velocity: Velocity,
        viscosity: DynamicViscosity,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            material,
            velocity: StrictlyPositive::new(velocity)
                .map_err(ConfigError::constraint("ambient velocity"))?
                .into_inner()
                .get::<meter_per_second>(),
            viscosity: StrictlyPositive::new(viscosity)
                .map_err(ConfigError::constraint("ambient viscosity"))?
                .into_inner()
                .get::<pascal_second>(),
        })
    }

    /// Slow sea current.
    #[must_use]
    pub const fn seawater() -> Self {
        Self {
            material: Material::seawater(),
            velocity: 0.1,
            viscosity: 1.05e-3,
        }
    }

    /// Light breeze.
    #[must_use]
    pub const fn air() -> Self {
        Self {
            material: Material::air(),
            velocity: 0.1,
            viscosity: 15.11e-6,
        }
    }
}

impl Default for AmbientFluid {
    fn default() -> Self {
        Self::seawater()
    }
}

/// Medium covering a buried pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burial {
    /// Distance from the top of the pipe to the surface of the medium, m.
    pub(crate) depth: f64,
    pub(crate) medium: Material,
}

impl Burial {
    /// # Errors
    ///
    /// Fails if `depth` is negative.
    pub fn new(depth: Length, medium: Material) -> Result<Self, ConfigError> {
        let depth = NonNegative::new(depth)
            .map_err(ConfigError::constraint("burial depth"))?
            .into_inner()
            .get::<meter>();
        Ok(Self { depth, medium })
    }

    /// An exposed pipe.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            depth: 0.0,
            medium: Material::soil(),
        }
    }

    #[must_use]
    pub fn is_buried(&self) -> bool {
        self.depth > 0.0
    }
}

impl Default for Burial {
    fn default() -> Self {
        Self::none()
    }
}
