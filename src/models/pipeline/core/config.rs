use twine_solvers::equation::bisection;

use super::ConfigError;

/// How per-variable changes are measured between solver iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToleranceKind {
    /// Change in SI units.
    Absolute,
    /// Change divided by the previous iterate.
    #[default]
    Relative,
}

/// Numeric tuning of the governing-equation solver.
///
/// Arrays are ordered `[flow, pressure, temperature]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence tolerance per variable.
    pub tolerances: [f64; 3],

    /// Whether [`Self::tolerances`] are absolute or relative.
    pub tolerance_kind: ToleranceKind,

    /// Initial under-relaxation factor per variable, in `(0, 1]`.
    pub relaxation: [f64; 3],

    /// Outer iteration cap.
    pub max_iterations: usize,

    /// Iteration after which the relaxation factors start to decay.
    pub relaxation_decay_start: usize,

    /// Factor applied to every relaxation factor on each decaying iteration.
    pub relaxation_decay: f64,
}

impl Default for SolverConfig {
    /// Relative tolerance of `1e-3` on every variable, full steps for flow
    /// and pressure, two-thirds steps for temperature, 200 iterations.
    fn default() -> Self {
        Self {
            tolerances: [1e-3; 3],
            tolerance_kind: ToleranceKind::Relative,
            relaxation: [1.0, 1.0, 2.0 / 3.0],
            max_iterations: 200,
            relaxation_decay_start: 50,
            relaxation_decay: 0.95,
        }
    }
}

impl SolverConfig {
    /// Checks the settings once, before any solve uses them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for a relaxation factor or
    /// decay outside `(0, 1]`, a negative or `NaN` tolerance, or a zero
    /// iteration cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for value in self.relaxation {
            unit_interval("relaxation factor", value)?;
        }
        unit_interval("relaxation decay", self.relaxation_decay)?;
        for value in self.tolerances {
            non_negative("solver tolerance", value)?;
        }
        at_least_one("solver iteration cap", self.max_iterations)
    }
}

fn unit_interval(what: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting { what, value })
    }
}

fn non_negative(what: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting { what, value })
    }
}

#[allow(clippy::cast_precision_loss)]
fn at_least_one(what: &'static str, count: usize) -> Result<(), ConfigError> {
    if count == 0 {
        Err(ConfigError::InvalidSetting {
            what,
            value: count as f64,
        })
    } else {
        Ok(())
    }
}

/// How the flow solve and heat transfer are coupled within a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatCoupling {
    /// Solve the flow once with the previous heat flux, then update the wall.
    Once,
    /// Repeat the flow solve with the updated heat flux until the flux
    /// changes by less than `tolerance` (relative) or `max_passes` is hit.
    Iterate { max_passes: usize, tolerance: f64 },
}

impl Default for HeatCoupling {
    fn default() -> Self {
        Self::Iterate {
            max_passes: 10,
            tolerance: 1e-3,
        }
    }
}

/// Root search settings for the Colebrook–White friction factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionConfig {
    pub max_iters: usize,
    pub relative_tolerance: f64,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            relative_tolerance: 1e-6,
        }
    }
}

impl FrictionConfig {
    /// Converts this configuration into a bisection solver configuration.
    pub(super) fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: 1e-12,
            x_rel_tol: self.relative_tolerance,
            residual_tol: 1e-12,
        }
    }
}

/// Which form of the energy equation the flow solve linearizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formulation {
    /// Specific enthalpy, with `cp`.
    #[default]
    Enthalpy,
    /// Specific internal energy, with `cv`.
    InternalEnergy,
}

/// Step-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    /// Used when the discretizer is chosen at runtime.
    pub formulation: Formulation,
    pub solver: SolverConfig,
    pub heat_coupling: HeatCoupling,
    pub friction: FrictionConfig,
}

impl Config {
    /// Validates the solver, heat coupling and friction settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidSetting`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()?;
        if let HeatCoupling::Iterate {
            max_passes,
            tolerance,
        } = self.heat_coupling
        {
            at_least_one("heat coupling passes", max_passes)?;
            non_negative("heat coupling tolerance", tolerance)?;
        }
        at_least_one("friction iteration cap", self.friction.max_iters)?;
        non_negative("friction tolerance", self.friction.relative_tolerance)
    }
}
