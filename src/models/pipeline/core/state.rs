//! Per-grid-point pipeline state and its derived properties.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use uom::si::{
    f64::{MassRate, Pressure, ThermodynamicTemperature},
    mass_rate::kilogram_per_second,
    pressure::pascal,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::thermo::{
    Composition, EosError, EosProperties, EquationOfState,
    correlations::viscosity_lee_gonzalez_eakin,
};

use super::{FrictionConfig, InputError, Pipe, StepError, friction};

/// Properties computed from the primary variables at every grid point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedProperties {
    /// Compressibility factor.
    pub z: Vec<f64>,
    pub dz_dt_p: Vec<f64>,
    pub dz_dp_t: Vec<f64>,
    pub dz_dt_rho: Vec<f64>,
    /// Isobaric heat capacity, J/(kg·K).
    pub cp: Vec<f64>,
    /// Isochoric heat capacity, J/(kg·K).
    pub cv: Vec<f64>,
    /// g/mol.
    pub molar_mass: Vec<f64>,
    /// J/(kg·K).
    pub gas_constant: Vec<f64>,
    /// kg/m³.
    pub density: Vec<f64>,
    /// Pa·s.
    pub viscosity: Vec<f64>,
    /// m/s.
    pub velocity: Vec<f64>,
    pub reynolds: Vec<f64>,
    /// Darcy friction factor.
    pub friction: Vec<f64>,
}

/// The state of the gas along the pipe.
///
/// Every array has one entry per grid point. Primary variables are set by
/// the caller or the solver; [`DerivedProperties`] are refreshed from them
/// with [`PipeState::update_derived`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipeState {
    /// Mass flow, kg/s, positive from inlet to outlet.
    pub flow: Vec<f64>,
    /// Pa.
    pub pressure: Vec<f64>,
    /// K.
    pub temperature: Vec<f64>,
    pub composition: Vec<Composition>,
    /// Temperature of the surroundings, K.
    pub ambient_temperature: Vec<f64>,
    /// Heat flux through the inner wall, W/m², positive when the gas cools.
    pub heat_flux: Vec<f64>,
    pub derived: DerivedProperties,
}

impl PipeState {
    /// A state with the same values at every grid point.
    ///
    /// The ambient temperature starts equal to the gas temperature and the
    /// heat flux at zero. Derived properties are empty until
    /// [`Self::update_derived`] is called.
    #[must_use]
    pub fn uniform(
        grid_points: usize,
        flow: MassRate,
        pressure: Pressure,
        temperature: ThermodynamicTemperature,
        composition: Composition,
    ) -> Self {
        let temperature = temperature.get::<kelvin>();
        Self {
            flow: vec![flow.get::<kilogram_per_second>(); grid_points],
            pressure: vec![pressure.get::<pascal>(); grid_points],
            temperature: vec![temperature; grid_points],
            composition: vec![composition; grid_points],
            ambient_temperature: vec![temperature; grid_points],
            heat_flux: vec![0.0; grid_points],
            derived: DerivedProperties::default(),
        }
    }

    /// Sets the same ambient temperature everywhere.
    #[must_use]
    pub fn with_ambient_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.ambient_temperature.fill(temperature.get::<kelvin>());
        self
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flow.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flow.is_empty()
    }

    /// Checks that every primary array has `expected` entries.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::SizeMismatch`] naming the first offending array.
    pub fn check_len(&self, expected: usize) -> Result<(), InputError> {
        let lengths = [
            ("flow", self.flow.len()),
            ("pressure", self.pressure.len()),
            ("temperature", self.temperature.len()),
            ("composition", self.composition.len()),
            ("ambient temperature", self.ambient_temperature.len()),
            ("heat flux", self.heat_flux.len()),
        ];
        match lengths.into_iter().find(|&(_, actual)| actual != expected) {
            Some((what, actual)) => Err(InputError::SizeMismatch {
                what,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }

    /// Velocity averaged over each cell, one entry per element.
    #[must_use]
    pub fn cell_velocity(&self) -> Vec<f64> {
        self.derived
            .velocity
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }

    /// Recomputes [`DerivedProperties`] from the primary variables.
    ///
    /// With the `parallel` feature the equation of state is evaluated per
    /// grid point on the rayon pool; results are identical to the serial path.
    ///
    /// # Errors
    ///
    /// Fails on size mismatches, equation-of-state failures and friction
    /// factor failures.
    pub fn update_derived<E>(
        &mut self,
        pipe: &Pipe,
        eos: &E,
        friction_config: &FrictionConfig,
    ) -> Result<(), StepError>
    where
        E: EquationOfState + Sync,
    {
        self.check_len(pipe.len())?;

        let properties = evaluate_eos(eos, &self.pressure, &self.temperature, &self.composition)?;

        let n = self.len();
        let area = pipe.area();
        let diameter = pipe.diameter();
        let mut derived = DerivedProperties {
            z: Vec::with_capacity(n),
            dz_dt_p: Vec::with_capacity(n),
            dz_dp_t: Vec::with_capacity(n),
            dz_dt_rho: Vec::with_capacity(n),
            cp: Vec::with_capacity(n),
            cv: Vec::with_capacity(n),
            molar_mass: Vec::with_capacity(n),
            gas_constant: Vec::with_capacity(n),
            density: Vec::with_capacity(n),
            viscosity: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
            reynolds: Vec::with_capacity(n),
            friction: Vec::with_capacity(n),
        };

        for (i, props) in properties.iter().enumerate() {
            let gas_constant = eos
                .specific_gas_constant(&self.composition[i])
                .get::<joule_per_kilogram_kelvin>();
            let density = self.pressure[i] / (props.z * gas_constant * self.temperature[i]);
            let viscosity =
                viscosity_lee_gonzalez_eakin(props.molar_mass, self.temperature[i], density);
            let reynolds = friction::reynolds_number(self.flow[i], diameter, viscosity);
            let friction_factor =
                friction::friction_factor(reynolds, pipe.roughness(), diameter, friction_config)?;

            derived.z.push(props.z);
            derived.dz_dt_p.push(props.dz_dt_p);
            derived.dz_dp_t.push(props.dz_dp_t);
            derived.dz_dt_rho.push(props.dz_dt_rho);
            derived.cp.push(props.cp);
            derived.cv.push(props.cv);
            derived.molar_mass.push(props.molar_mass);
            derived.gas_constant.push(gas_constant);
            derived.density.push(density);
            derived.viscosity.push(viscosity);
            derived.velocity.push(self.flow[i] / (density * area));
            derived.reynolds.push(reynolds);
            derived.friction.push(friction_factor);
        }

        self.derived = derived;
        Ok(())
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_eos<E: EquationOfState>(
    eos: &E,
    pressure: &[f64],
    temperature: &[f64],
    composition: &[Composition],
) -> Result<Vec<EosProperties>, EosError> {
    pressure
        .iter()
        .zip(temperature)
        .zip(composition)
        .map(|((&p, &t), gas)| eos.evaluate(p, t, gas))
        .collect()
}

#[cfg(feature = "parallel")]
fn evaluate_eos<E: EquationOfState + Sync>(
    eos: &E,
    pressure: &[f64],
    temperature: &[f64],
    composition: &[Composition],
) -> Result<Vec<EosProperties>, EosError> {
    pressure
        .par_iter()
        .zip(temperature)
        .zip(composition)
        .map(|((&p, &t), gas)| eos.evaluate(p, t, gas))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::pipeline::core::test_support::{test_pipe, uniform_state};
    use crate::support::thermo::{DummyGas, Eos, IdealGas};

    #[test]
    fn ideal_gas_density_and_velocity() {
        let pipe = test_pipe(1000.0, 0.5, 11);
        let mut state = uniform_state(11, 35.6, 50e5, 290.0);

        state
            .update_derived(&pipe, &Eos::IdealGas(IdealGas), &FrictionConfig::default())
            .expect("ideal gas evaluates");

        let r = state.derived.gas_constant[0];
        let density = 50e5 / (r * 290.0);
        assert_relative_eq!(state.derived.density[5], density, max_relative = 1e-12);
        assert_relative_eq!(
            state.derived.velocity[5],
            35.6 / (density * pipe.area()),
            max_relative = 1e-12
        );
        assert!(state.derived.reynolds[0] > 1e6);
        assert!(state.derived.friction[0] > 0.0);
        assert_eq!(state.cell_velocity().len(), 10);
    }

    #[test]
    fn rejects_mismatched_arrays() {
        let pipe = test_pipe(1000.0, 0.5, 11);
        let mut state = uniform_state(11, 1.0, 50e5, 290.0);
        state.heat_flux.pop();

        match state.update_derived(&pipe, &Eos::Dummy(DummyGas), &FrictionConfig::default()) {
            Err(StepError::InvalidInput(InputError::SizeMismatch { what, actual, .. })) => {
                assert_eq!(what, "heat flux");
                assert_eq!(actual, 10);
            }
            other => panic!("Expected SizeMismatch error, got: {other:?}"),
        }
    }
}
