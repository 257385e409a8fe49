use std::f64::consts::PI;

use nalgebra::DVector;
use uom::si::{f64::ThermodynamicTemperature, thermodynamic_temperature::kelvin};

use crate::support::{
    numerics::{solve_linear, tridiagonal},
    thermo::RangeError,
};

use super::{
    AmbientFluid, Burial, ConfigError, GasConditions, HeatTransferState, InputError, PipeWall,
    StepError,
    radial::{RadialWall, inner_film_coefficient},
};

/// Radial heat loss with heat stored in the wall.
///
/// Each shell carries one temperature. A step solves the implicit energy
/// balance of all shells together with the bore heat flux as a tridiagonal
/// system: unknown 0 is the heat flux, unknown `j + 1` the temperature of
/// shell `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unsteady {
    wall: RadialWall,
}

impl Unsteady {
    /// # Errors
    ///
    /// Fails when the surroundings fall outside the outer film correlation.
    pub fn new(
        diameter: f64,
        wall: &PipeWall,
        burial: &Burial,
        ambient: &AmbientFluid,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            wall: RadialWall::new(diameter, wall, burial, ambient)?,
        })
    }

    #[must_use]
    pub fn wall(&self) -> &RadialWall {
        &self.wall
    }

    /// Shells at the ambient temperature, with the heat flux that profile
    /// draws from the gas.
    #[must_use]
    pub fn initial_state(&self, gas: &GasConditions) -> HeatTransferState {
        let shells = vec![gas.ambient_temperature; self.wall.shells().len()];
        let heat_flux = self.bore_conductance(gas) / (PI * self.wall.diameter())
            * (gas.temperature - gas.ambient_temperature);
        HeatTransferState {
            heat_flux,
            shell_temperatures: shells,
        }
    }

    /// Advances the shell temperatures by `dt` seconds.
    ///
    /// An infinite `dt` gives the steady profile.
    ///
    /// # Errors
    ///
    /// Fails if the system is singular, if `current` has the wrong number
    /// of shells, or if a shell temperature turns negative.
    pub fn evaluate(
        &self,
        current: &HeatTransferState,
        gas: &GasConditions,
        dt: f64,
    ) -> Result<HeatTransferState, StepError> {
        let shells = self.wall.shells();
        let n = shells.len();
        if current.shell_temperatures.len() != n {
            return Err(InputError::SizeMismatch {
                what: "shell temperatures",
                expected: n,
                actual: current.shell_temperatures.len(),
            }
            .into());
        }

        let bore = self.bore_conductance(gas);
        let outer = self.wall.outer_conductance();
        let couplings = self.wall.couplings();
        let per_area = bore / (PI * self.wall.diameter());

        let mut lower = vec![0.0; n + 1];
        let mut diagonal = vec![0.0; n + 1];
        let mut upper = vec![0.0; n + 1];
        let mut rhs = DVector::zeros(n + 1);

        // q = hw/(πD)·(T − T_0)
        diagonal[0] = 1.0;
        upper[0] = per_area;
        rhs[0] = per_area * gas.temperature;

        for (j, shell) in shells.iter().enumerate() {
            let storage = shell.material.density * shell.area() * shell.material.heat_capacity / dt;
            let inward = if j == 0 { bore } else { couplings[j - 1] };
            let outward = if j + 1 == n { outer } else { couplings[j] };

            let row = j + 1;
            diagonal[row] = storage + inward + outward;
            rhs[row] = storage * current.shell_temperatures[j];
            if j == 0 {
                rhs[row] += bore * gas.temperature;
            } else {
                lower[row] = -inward;
            }
            if j + 1 == n {
                rhs[row] += outer * gas.ambient_temperature;
            } else {
                upper[row] = -outward;
            }
        }

        let solution = solve_linear(tridiagonal(&lower, &diagonal, &upper)?, &rhs)?;
        let shell_temperatures = solution.as_slice()[1..].to_vec();

        if let Some(&negative) = shell_temperatures.iter().find(|&&t| t < 0.0) {
            return Err(RangeError::Temperature {
                value: ThermodynamicTemperature::new::<kelvin>(negative),
                min: ThermodynamicTemperature::new::<kelvin>(0.0),
                max: ThermodynamicTemperature::new::<kelvin>(f64::INFINITY),
            }
            .into());
        }

        Ok(HeatTransferState {
            heat_flux: solution[0],
            shell_temperatures,
        })
    }

    /// Gas-to-first-shell conductance at the current gas conditions.
    fn bore_conductance(&self, gas: &GasConditions) -> f64 {
        let inner_film = inner_film_coefficient(
            self.wall.diameter(),
            gas.pressure,
            gas.reynolds,
            gas.cp,
            gas.viscosity,
        );
        self.wall.inner_conductance(inner_film)
    }
}
