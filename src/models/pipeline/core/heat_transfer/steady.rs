use super::{
    AmbientFluid, Burial, ConfigError, GasConditions, PipeWall,
    radial::{RadialWall, inner_film_coefficient},
};

/// Radial heat loss with the wall in thermal equilibrium.
///
/// The wall and film resistances add in series, so the wall holds no heat
/// and responds instantly to the gas temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyState {
    wall: RadialWall,
    /// Conduction plus outer film resistance, scaled by radius, m²·K/W per m.
    resistance: f64,
}

impl SteadyState {
    /// # Errors
    ///
    /// Fails when the surroundings fall outside the outer film correlation.
    pub fn new(
        diameter: f64,
        wall: &PipeWall,
        burial: &Burial,
        ambient: &AmbientFluid,
    ) -> Result<Self, ConfigError> {
        let wall = RadialWall::new(diameter, wall, burial, ambient)?;
        let conduction: f64 = wall
            .shells()
            .iter()
            .map(|shell| (shell.outer_radius() / shell.inner_radius).ln() / shell.material.conductivity)
            .sum();
        let resistance = conduction + 1.0 / (wall.outer_radius() * wall.outer_film());
        Ok(Self { wall, resistance })
    }

    #[must_use]
    pub fn wall(&self) -> &RadialWall {
        &self.wall
    }

    /// Overall coefficient referred to the bore, W/(m²·K).
    #[must_use]
    pub fn coefficient(&self, gas: &GasConditions) -> f64 {
        let inner_film = inner_film_coefficient(
            self.wall.diameter(),
            gas.pressure,
            gas.reynolds,
            gas.cp,
            gas.viscosity,
        );
        1.0 / (1.0 / inner_film + 0.5 * self.wall.diameter() * self.resistance)
    }

    #[must_use]
    pub fn heat_flux(&self, gas: &GasConditions) -> f64 {
        self.coefficient(gas) * (gas.temperature - gas.ambient_temperature)
    }
}
