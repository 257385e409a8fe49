//! One time step of the coupled pipeline physics.
//!
//! A step solves the flow with the current wall heat flux, updates the heat
//! transfer from the converged field, optionally repeats until the two agree,
//! then moves the gas batches and samples their composition back onto the
//! grid.

use tracing::debug;
use uom::si::{f64::Time, time::second};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    thermo::{Composition, Eos},
};

use super::{
    Config, ConfigError, ConvergenceLoop, Formulation, HeatCoupling, InputError, Pipe, PipeState, StepError,
    batch_tracking::BatchTrackingState,
    boundary::BoundaryConditions,
    discretizer::{Discretizer, Enthalpy, InternalEnergy},
    heat_transfer::{GasConditions, HeatTransfer, HeatTransferState},
    solver::{GoverningEquationSolver, SolveContext},
};

/// Pipeline physics for one discretizer.
///
/// Owns the models and the state that persists between steps: one
/// [`HeatTransferState`] per grid point and the batch positions. Call
/// [`Physics::initialize`] once before the first [`Physics::advance`].
#[derive(Debug, Clone)]
pub struct Physics<D> {
    pipe: Pipe,
    eos: Eos,
    heat_transfer: HeatTransfer,
    solver: GoverningEquationSolver<D>,
    config: Config,
    heat_states: Vec<HeatTransferState>,
    batches: Option<BatchTrackingState>,
    delivered: Vec<Composition>,
}

impl<D: Discretizer> Physics<D> {
    /// [`Config::formulation`] is ignored; `discretizer` decides.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn new(
        pipe: Pipe,
        eos: Eos,
        heat_transfer: HeatTransfer,
        discretizer: D,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pipe,
            eos,
            heat_transfer,
            solver: GoverningEquationSolver::new(discretizer, config.solver)?,
            config,
            heat_states: Vec::new(),
            batches: None,
            delivered: Vec::new(),
        })
    }

    #[must_use]
    pub fn pipe(&self) -> &Pipe {
        &self.pipe
    }

    #[must_use]
    pub fn eos(&self) -> &Eos {
        &self.eos
    }

    #[must_use]
    pub fn heat_transfer(&self) -> &HeatTransfer {
        &self.heat_transfer
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn heat_states(&self) -> &[HeatTransferState] {
        &self.heat_states
    }

    /// `None` until [`Self::initialize`] has run.
    #[must_use]
    pub fn batches(&self) -> Option<&BatchTrackingState> {
        self.batches.as_ref()
    }

    /// Compositions of every batch that has left through the outlet, in
    /// order of delivery.
    #[must_use]
    pub fn delivered(&self) -> &[Composition] {
        &self.delivered
    }

    /// Hands over the delivered batches and forgets them.
    pub fn take_delivered(&mut self) -> Vec<Composition> {
        std::mem::take(&mut self.delivered)
    }

    /// Prepares `state` and the internal state for a run.
    ///
    /// Computes derived properties, builds batches from the compositions on
    /// the grid and starts heat transfer; unsteady walls start at the
    /// ambient temperature. The resulting heat flux is written to `state`.
    ///
    /// # Errors
    ///
    /// Fails if `state` does not match the grid or its properties cannot be
    /// evaluated.
    pub fn initialize(&mut self, state: &mut PipeState) -> Result<(), StepError> {
        state.update_derived(&self.pipe, &self.eos, &self.config.friction)?;

        let batches = BatchTrackingState::from_grid(self.pipe.positions(), &state.composition)?;
        let heat_states: Vec<HeatTransferState> = (0..state.len())
            .map(|i| self.heat_transfer.initial_state(&GasConditions::at(state, i)))
            .collect();

        for (flux, heat) in state.heat_flux.iter_mut().zip(&heat_states) {
            *flux = heat.heat_flux;
        }
        self.batches = Some(batches);
        self.heat_states = heat_states;
        self.delivered.clear();
        Ok(())
    }

    /// Sets unsteady wall profiles to their steady state for the gas in
    /// `state`, and updates its heat flux. Other heat transfer models are
    /// left as they are.
    ///
    /// # Errors
    ///
    /// Fails before [`Self::initialize`], on size mismatches, or if a shell
    /// temperature turns negative.
    pub fn thermalize(&mut self, state: &mut PipeState) -> Result<(), StepError> {
        self.check_initialized(state)?;

        let heat_states = self
            .heat_states
            .iter()
            .enumerate()
            .map(|(i, current)| {
                self.heat_transfer
                    .thermalize(current, &GasConditions::at(state, i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (flux, heat) in state.heat_flux.iter_mut().zip(&heat_states) {
            *flux = heat.heat_flux;
        }
        self.heat_states = heat_states;
        Ok(())
    }

    /// Advances `state` by `dt`.
    ///
    /// Internal state is only updated when the whole step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotInitialized`] before [`Self::initialize`].
    /// Otherwise errors from the flow solve, heat transfer and batch
    /// tracking propagate unchanged, and
    /// [`StepError::NoConvergence`] reports an exhausted heat coupling loop.
    pub fn advance(
        &mut self,
        state: &PipeState,
        boundary: &BoundaryConditions,
        dt: Constrained<Time, StrictlyPositive>,
    ) -> Result<PipeState, StepError> {
        self.check_initialized(state)?;
        let dt = dt.into_inner().get::<second>();

        let context = SolveContext {
            pipe: &self.pipe,
            eos: &self.eos,
            friction: &self.config.friction,
        };

        let mut heat_flux = state.heat_flux.clone();
        let mut pass = 0;
        let (mut next, heat_states) = loop {
            pass += 1;
            let converged = self
                .solver
                .solve(&context, state, &heat_flux, boundary, dt)?;
            let heat_states = self.evaluate_heat_transfer(&converged.state, dt)?;

            let HeatCoupling::Iterate {
                max_passes,
                tolerance,
            } = self.config.heat_coupling
            else {
                break (converged.state, heat_states);
            };

            let change = heat_flux
                .iter()
                .zip(&heat_states)
                .map(|(&old, new)| {
                    (new.heat_flux - old).abs() / old.abs().max(new.heat_flux.abs()).max(1.0)
                })
                .fold(0.0, f64::max);
            debug!(pass, change, iterations = converged.iterations, "heat coupling pass");

            if change <= tolerance {
                break (converged.state, heat_states);
            }
            if pass >= max_passes {
                return Err(StepError::NoConvergence {
                    stage: ConvergenceLoop::HeatCoupling,
                    iterations: pass,
                });
            }
            for (flux, heat) in heat_flux.iter_mut().zip(&heat_states) {
                *flux = heat.heat_flux;
            }
        };

        for (flux, heat) in next.heat_flux.iter_mut().zip(&heat_states) {
            *flux = heat.heat_flux;
        }

        let mut batches = self
            .batches
            .clone()
            .ok_or(InputError::NotInitialized)?;
        let delivered = batches.advect(&next.cell_velocity(), dt, &boundary.inlet.composition)?;
        next.composition = batches.sample_grid();
        next.update_derived(&self.pipe, &self.eos, &self.config.friction)?;

        self.heat_states = heat_states;
        self.batches = Some(batches);
        self.delivered.extend(delivered);
        Ok(next)
    }

    fn evaluate_heat_transfer(
        &self,
        state: &PipeState,
        dt: f64,
    ) -> Result<Vec<HeatTransferState>, StepError> {
        self.heat_states
            .iter()
            .enumerate()
            .map(|(i, current)| {
                self.heat_transfer
                    .evaluate(current, &GasConditions::at(state, i), dt)
            })
            .collect()
    }

    fn check_initialized(&self, state: &PipeState) -> Result<(), StepError> {
        let n = self.pipe.len();
        if self.batches.is_none() || self.heat_states.len() != n {
            return Err(InputError::NotInitialized.into());
        }
        state.check_len(n)?;
        if state.derived.reynolds.len() != n {
            return Err(InputError::SizeMismatch {
                what: "derived properties",
                expected: n,
                actual: state.derived.reynolds.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// [`Physics`] with the discretizer chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyPhysics {
    Enthalpy(Physics<Enthalpy>),
    InternalEnergy(Physics<InternalEnergy>),
}

impl AnyPhysics {
    /// Picks the discretizer from [`Config::formulation`].
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn new(
        pipe: Pipe,
        eos: Eos,
        heat_transfer: HeatTransfer,
        config: Config,
    ) -> Result<Self, ConfigError> {
        Ok(match config.formulation {
            Formulation::Enthalpy => {
                Self::Enthalpy(Physics::new(pipe, eos, heat_transfer, Enthalpy, config)?)
            }
            Formulation::InternalEnergy => Self::InternalEnergy(Physics::new(
                pipe,
                eos,
                heat_transfer,
                InternalEnergy,
                config,
            )?),
        })
    }

    /// See [`Physics::initialize`].
    ///
    /// # Errors
    ///
    /// See [`Physics::initialize`].
    pub fn initialize(&mut self, state: &mut PipeState) -> Result<(), StepError> {
        match self {
            Self::Enthalpy(physics) => physics.initialize(state),
            Self::InternalEnergy(physics) => physics.initialize(state),
        }
    }

    /// See [`Physics::thermalize`].
    ///
    /// # Errors
    ///
    /// See [`Physics::thermalize`].
    pub fn thermalize(&mut self, state: &mut PipeState) -> Result<(), StepError> {
        match self {
            Self::Enthalpy(physics) => physics.thermalize(state),
            Self::InternalEnergy(physics) => physics.thermalize(state),
        }
    }

    /// See [`Physics::advance`].
    ///
    /// # Errors
    ///
    /// See [`Physics::advance`].
    pub fn advance(
        &mut self,
        state: &PipeState,
        boundary: &BoundaryConditions,
        dt: Constrained<Time, StrictlyPositive>,
    ) -> Result<PipeState, StepError> {
        match self {
            Self::Enthalpy(physics) => physics.advance(state, boundary, dt),
            Self::InternalEnergy(physics) => physics.advance(state, boundary, dt),
        }
    }

    #[must_use]
    pub fn pipe(&self) -> &Pipe {
        match self {
            Self::Enthalpy(physics) => physics.pipe(),
            Self::InternalEnergy(physics) => physics.pipe(),
        }
    }

    #[must_use]
    pub fn delivered(&self) -> &[Composition] {
        match self {
            Self::Enthalpy(physics) => physics.delivered(),
            Self::InternalEnergy(physics) => physics.delivered(),
        }
    }

    #[must_use]
    pub fn batches(&self) -> Option<&BatchTrackingState> {
        match self {
            Self::Enthalpy(physics) => physics.batches(),
            Self::InternalEnergy(physics) => physics.batches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::ThermodynamicTemperature, thermodynamic_temperature::kelvin};

    use crate::models::pipeline::core::{
        SolverConfig,
        boundary::{EndConditions, SingleCondition},
        test_support::{step, test_pipe, transit_boundary, uniform_state},
    };
    use crate::support::thermo::{Bwrs, Component, IdealGas};

    fn transit_config() -> Config {
        Config {
            solver: SolverConfig {
                tolerances: [1e-6; 3],
                ..SolverConfig::default()
            },
            heat_coupling: HeatCoupling::Once,
            ..Config::default()
        }
    }

    fn ideal_gas_physics(heat_transfer: HeatTransfer, config: Config) -> AnyPhysics {
        AnyPhysics::new(
            test_pipe(1000.0, 0.5, 51),
            Eos::IdealGas(IdealGas),
            heat_transfer,
            config,
        )
        .expect("valid config")
    }

    #[test]
    fn inlet_temperature_step_reaches_outlet_after_transit_time() {
        let mut physics = ideal_gas_physics(HeatTransfer::default(), transit_config());
        let mut state = uniform_state(51, 35.6, 50e5, 290.0);
        physics.initialize(&mut state).expect("initializes");
        let bc = transit_boundary(&state, 300.0);

        // Transit time is about 205 s at 4.9 m/s.
        for _ in 0..20 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }
        assert!(state.temperature[50] < 291.0);
        assert!(state.temperature[25] > 292.0);

        for _ in 20..82 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }
        assert!(state.temperature[50] > 299.5);
        assert!(state.heat_flux.iter().all(|&q| q == 0.0));
    }

    #[test]
    fn dense_gas_temperature_front_crosses_the_pipe() {
        let mut physics = AnyPhysics::new(
            test_pipe(1000.0, 0.5, 51),
            Eos::Bwrs(Bwrs::default()),
            HeatTransfer::default(),
            transit_config(),
        )
        .expect("valid config");
        let mut state = uniform_state(51, 35.6, 50e5, 290.0);
        physics.initialize(&mut state).expect("initializes");
        let bc = transit_boundary(&state, 300.0);

        // Z is about 0.9 here, so the gas moves slower than an ideal gas.
        for _ in 0..20 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }
        assert!(state.temperature[50] < 291.0);
        assert!(state.temperature[15] > 292.0);

        for _ in 20..100 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }
        assert!(state.temperature[50] > 299.0, "{}", state.temperature[50]);
        assert!(state.pressure[50] < state.pressure[0]);
        assert_relative_eq!(state.flow[0], 35.6, max_relative = 1e-2);
        assert!(state.derived.z.iter().all(|&z| z < 0.95));
    }

    #[test]
    fn closed_pipe_at_rest_stays_at_rest() {
        let config = Config {
            solver: SolverConfig {
                tolerances: [1e-6; 3],
                ..SolverConfig::default()
            },
            ..Config::default()
        };
        let mut physics = AnyPhysics::new(
            test_pipe(1000.0, 0.5, 11),
            Eos::Bwrs(Bwrs::default()),
            HeatTransfer::default(),
            config,
        )
        .expect("valid config");
        let mut state = uniform_state(11, 0.0, 50e5, 290.0);
        physics.initialize(&mut state).expect("initializes");

        // Both ends closed, with pressure and temperature held at the inlet.
        let mut inlet = EndConditions::new(state.composition[0]);
        inlet.flow = SingleCondition::active(0.0);
        inlet.pressure = SingleCondition::active(50e5);
        inlet.temperature = SingleCondition::active(290.0);
        let mut outlet = EndConditions::new(state.composition[10]);
        outlet.flow = SingleCondition::active(0.0);
        let bc = BoundaryConditions::new(inlet, outlet);

        let next = physics.advance(&state, &bc, step(60.0)).expect("step succeeds");
        for i in 0..11 {
            assert_relative_eq!(next.pressure[i], 50e5, epsilon = 1e-3);
            assert_relative_eq!(next.temperature[i], 290.0, epsilon = 1e-6);
            assert!(next.flow[i].abs() < 1e-6, "flow at {i}: {}", next.flow[i]);
        }
        assert!(physics.delivered().is_empty());
    }

    #[test]
    fn rejects_relaxation_above_one() {
        let config = Config {
            solver: SolverConfig {
                relaxation: [1.0, 1.0, 1.2],
                ..SolverConfig::default()
            },
            ..Config::default()
        };
        match AnyPhysics::new(
            test_pipe(1000.0, 0.5, 11),
            Eos::IdealGas(IdealGas),
            HeatTransfer::default(),
            config,
        ) {
            Err(ConfigError::InvalidSetting { what, value }) => {
                assert_eq!(what, "relaxation factor");
                assert_relative_eq!(value, 1.2);
            }
            other => panic!("Expected InvalidSetting error, got: {other:?}"),
        }
    }

    #[test]
    fn composition_front_moves_with_the_gas() {
        let mut physics = ideal_gas_physics(HeatTransfer::default(), transit_config());
        let mut state = uniform_state(51, 35.6, 50e5, 290.0);
        physics.initialize(&mut state).expect("initializes");

        let mut bc = transit_boundary(&state, 290.0);
        let methane = Composition::pure(Component::Methane);
        bc.inlet.composition = methane;

        for _ in 0..20 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }

        // About 490 m travelled in 100 s.
        assert!(state.composition[20].is_same_gas(&methane));
        assert!(state.composition[30].is_same_gas(&Composition::default()));
        assert!(physics.delivered().is_empty());

        let batches = physics.batches().expect("initialized");
        assert_relative_eq!(batches.extents().iter().sum::<f64>(), 1000.0, epsilon = 1e-9);

        for _ in 20..80 {
            state = physics.advance(&state, &bc, step(5.0)).expect("step succeeds");
        }
        assert!(state.composition.iter().all(|gas| gas.is_same_gas(&methane)));
        assert_eq!(physics.delivered().len(), 1);
    }

    #[test]
    fn heat_loss_cools_the_gas_along_the_pipe() {
        let config = Config {
            heat_coupling: HeatCoupling::Iterate {
                max_passes: 30,
                tolerance: 1e-3,
            },
            ..Config::default()
        };
        let mut physics = ideal_gas_physics(
            HeatTransfer::steady_state(0.5).expect("default wall is valid"),
            config,
        );
        let mut state = uniform_state(51, 35.6, 50e5, 290.0)
            .with_ambient_temperature(ThermodynamicTemperature::new::<kelvin>(278.0));
        physics.initialize(&mut state).expect("initializes");
        let bc = transit_boundary(&state, 290.0);

        for _ in 0..40 {
            state = physics.advance(&state, &bc, step(100.0)).expect("step succeeds");
        }

        assert!(state.heat_flux.iter().all(|&q| q > 0.0));
        assert!(state.temperature[50] < state.temperature[0] - 1.0);
        assert!(state.temperature[50] > 278.0);
    }

    #[test]
    fn thermalized_unsteady_wall_draws_steady_heat_flux() {
        let pipe = test_pipe(1000.0, 0.5, 11);
        let mut unsteady = Physics::new(
            pipe.clone(),
            Eos::IdealGas(IdealGas),
            HeatTransfer::unsteady(0.5).expect("default wall is valid"),
            Enthalpy,
            Config::default(),
        )
        .expect("valid config");
        let mut steady = Physics::new(
            pipe,
            Eos::IdealGas(IdealGas),
            HeatTransfer::steady_state(0.5).expect("default wall is valid"),
            Enthalpy,
            Config::default(),
        )
        .expect("valid config");

        let mut cold_wall = uniform_state(11, 35.6, 50e5, 300.0);
        let mut reference = cold_wall.clone();
        unsteady.initialize(&mut cold_wall).expect("initializes");
        steady.initialize(&mut reference).expect("initializes");

        // Same ambient as gas: no flux in either model yet.
        assert_relative_eq!(cold_wall.heat_flux[3], 0.0);

        cold_wall.ambient_temperature.fill(280.0);
        reference.ambient_temperature.fill(280.0);
        unsteady.thermalize(&mut cold_wall).expect("thermalizes");
        steady.initialize(&mut reference).expect("initializes");

        for (q, expected) in cold_wall.heat_flux.iter().zip(&reference.heat_flux) {
            assert_relative_eq!(*q, *expected, max_relative = 1e-9);
        }
        assert!(cold_wall.heat_flux[0] > 0.0);
    }

    #[test]
    fn advance_requires_initialization() {
        let mut physics = ideal_gas_physics(HeatTransfer::default(), Config::default());
        let state = uniform_state(51, 35.6, 50e5, 290.0);
        let bc = transit_boundary(&state, 290.0);

        match physics.advance(&state, &bc, step(5.0)) {
            Err(StepError::InvalidInput(InputError::NotInitialized)) => {}
            other => panic!("Expected NotInitialized error, got: {other:?}"),
        }
    }

    #[test]
    fn heat_coupling_cap_is_reported() {
        let config = Config {
            heat_coupling: HeatCoupling::Iterate {
                max_passes: 1,
                tolerance: 0.0,
            },
            ..Config::default()
        };
        let mut physics = ideal_gas_physics(
            HeatTransfer::steady_state(0.5).expect("default wall is valid"),
            config,
        );
        let mut state = uniform_state(51, 35.6, 50e5, 290.0);
        physics.initialize(&mut state).expect("initializes");
        // Flux from the initial state no longer matches once the ambient cools.
        state.ambient_temperature.fill(270.0);
        let bc = transit_boundary(&state, 290.0);

        match physics.advance(&state, &bc, step(5.0)) {
            Err(StepError::NoConvergence { stage, iterations }) => {
                assert_eq!(stage, ConvergenceLoop::HeatCoupling);
                assert_eq!(iterations, 1);
            }
            other => panic!("Expected NoConvergence error, got: {other:?}"),
        }
    }
}
