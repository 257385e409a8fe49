//! Nonlinear solve of the governing equations over one time step.

use tracing::{debug, trace, warn};

use crate::support::thermo::EquationOfState;

use super::{
    ConfigError, ConvergenceLoop, FrictionConfig, InputError, Pipe, PipeState, SolverConfig,
    StepError,
    ToleranceKind, boundary::BoundaryConditions, discretizer::Discretizer,
    matrix::MatrixEquation,
};

/// What the solver needs besides the states: geometry and gas models.
#[derive(Debug, Clone, Copy)]
pub struct SolveContext<'a, E> {
    pub pipe: &'a Pipe,
    pub eos: &'a E,
    pub friction: &'a FrictionConfig,
}

/// A converged flow field.
#[derive(Debug, Clone, PartialEq)]
pub struct Converged {
    /// New state with refreshed derived properties.
    pub state: PipeState,
    pub iterations: usize,
}

/// Iterates discretize, assemble, solve and under-relax until the flow
/// field stops changing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GoverningEquationSolver<D> {
    discretizer: D,
    config: SolverConfig,
}

impl<D: Discretizer> GoverningEquationSolver<D> {
    /// # Errors
    ///
    /// Fails if `config` does not pass [`SolverConfig::validate`].
    pub fn new(discretizer: D, config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            discretizer,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[must_use]
    pub fn discretizer(&self) -> &D {
        &self.discretizer
    }

    /// Advances `previous` by `dt` seconds with a fixed wall heat flux.
    ///
    /// The guess starts from `previous`. `previous` must carry derived
    /// properties for every grid point.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NoConvergence`] after
    /// [`SolverConfig::max_iterations`], or any error from assembly, the
    /// linear solve or the property update.
    pub fn solve<E>(
        &self,
        context: &SolveContext<'_, E>,
        previous: &PipeState,
        heat_flux: &[f64],
        boundary: &BoundaryConditions,
        dt: f64,
    ) -> Result<Converged, StepError>
    where
        E: EquationOfState + Sync,
    {
        let n = context.pipe.len();
        previous.check_len(n)?;
        for (what, actual) in [
            ("heat flux", heat_flux.len()),
            ("derived properties", previous.derived.gas_constant.len()),
        ] {
            if actual != n {
                return Err(InputError::SizeMismatch {
                    what,
                    expected: n,
                    actual,
                }
                .into());
            }
        }

        let mut guess = previous.clone();
        guess.heat_flux.copy_from_slice(heat_flux);
        let mut last = guess.clone();
        let mut relaxation = self.config.relaxation;
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration >= self.config.relaxation_decay_start {
                if iteration == self.config.relaxation_decay_start {
                    warn!(iteration, "flow solve is slow, decaying relaxation factors");
                }
                relaxation = relaxation.map(|r| r * self.config.relaxation_decay);
            }

            let stencils = self
                .discretizer
                .discretize(context.pipe, previous, &guess, dt);
            let output = MatrixEquation::assemble(&stencils, boundary)?.solve()?;

            for (i, point) in output.iter().enumerate() {
                guess.flow[i] += (point[0] - guess.flow[i]) * relaxation[0];
                guess.pressure[i] += (point[1] - guess.pressure[i]) * relaxation[1];
                guess.temperature[i] += (point[2] - guess.temperature[i]) * relaxation[2];
            }
            guess.update_derived(context.pipe, context.eos, context.friction)?;

            let change = self.change(&guess, &last, &relaxation);
            trace!(iteration, ?change, "flow iteration");

            if change
                .iter()
                .zip(&self.config.tolerances)
                .all(|(change, tolerance)| change <= tolerance)
            {
                debug!(iterations = iteration, "flow solve converged");
                return Ok(Converged {
                    state: guess,
                    iterations: iteration,
                });
            }

            if iteration >= self.config.max_iterations {
                return Err(StepError::NoConvergence {
                    stage: ConvergenceLoop::Flow,
                    iterations: iteration,
                });
            }

            last.flow.clone_from(&guess.flow);
            last.pressure.clone_from(&guess.pressure);
            last.temperature.clone_from(&guess.temperature);
        }
    }

    /// Largest change per variable between two iterates, divided by the
    /// relaxation factor in use. `NaN` changes are reported as infinite.
    fn change(&self, guess: &PipeState, last: &PipeState, relaxation: &[f64; 3]) -> [f64; 3] {
        let kind = self.config.tolerance_kind;
        let flow_floor = 10.0 * self.config.tolerances[0];

        let measure = |new: &[f64], old: &[f64], skip_small: bool| {
            new.iter()
                .zip(old)
                .map(|(&new, &old)| {
                    let delta = (new - old).abs();
                    match kind {
                        ToleranceKind::Absolute => delta,
                        ToleranceKind::Relative if skip_small && new.abs() <= flow_floor => 0.0,
                        ToleranceKind::Relative => delta / old.abs(),
                    }
                })
                .map(|d| if d.is_nan() { f64::INFINITY } else { d })
                .fold(0.0, f64::max)
        };

        [
            measure(&guess.flow, &last.flow, true) / relaxation[0],
            measure(&guess.pressure, &last.pressure, false) / relaxation[1],
            measure(&guess.temperature, &last.temperature, false) / relaxation[2],
        ]
    }
}
