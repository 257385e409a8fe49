//! Reynolds number and Darcy friction factor.
//!
//! Turbulent flow uses the implicit Colebrook–White equation, solved for the
//! friction factor by bisection; laminar flow uses `64/Re`.

use std::{convert::Infallible, f64::consts::PI};

use twine_core::{EquationProblem, Model};
use twine_solvers::equation::bisection;

use crate::support::thermo::RangeError;

use super::{ConvergenceLoop, FrictionConfig, StepError};

/// Below this the flow is treated as laminar.
const TRANSITION_REYNOLDS: f64 = 4000.0;

/// Friction factors are searched in this bracket.
const FRICTION_BRACKET: [f64; 2] = [1e-4, 1.0];

/// Reynolds number of a circular pipe flow from mass flow, diameter and
/// dynamic viscosity. Always non-negative.
#[must_use]
pub fn reynolds_number(flow: f64, diameter: f64, viscosity: f64) -> f64 {
    4.0 * flow.abs() / (PI * diameter * viscosity)
}

/// Darcy friction factor.
///
/// Zero for stagnant flow and for turbulent flow through a hydraulically
/// smooth pipe. Laminar flow gives `64/Re` whatever the roughness.
///
/// # Errors
///
/// Fails for a negative or `NaN` Reynolds number, or if the Colebrook–White
/// root search does not converge.
pub fn friction_factor(
    reynolds: f64,
    roughness: f64,
    diameter: f64,
    config: &FrictionConfig,
) -> Result<f64, StepError> {
    if reynolds.is_nan() || reynolds < 0.0 {
        return Err(StepError::Range(RangeError::ReynoldsNumber {
            value: reynolds,
            min: 0.0,
            max: f64::INFINITY,
        }));
    }
    if reynolds < 1e-10 {
        return Ok(0.0);
    }
    if reynolds < TRANSITION_REYNOLDS {
        return Ok(64.0 / reynolds);
    }
    if roughness < 1e-12 {
        return Ok(0.0);
    }

    let model = Colebrook {
        relative_roughness: roughness / diameter,
        reynolds,
    };

    let solution = bisection::solve(
        &model,
        &ColebrookProblem,
        FRICTION_BRACKET,
        &config.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            if event.result().is_err() {
                return Some(bisection::Action::assume_positive());
            }
            None
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(StepError::NoConvergence {
            stage: ConvergenceLoop::Friction,
            iterations: solution.iters,
        });
    }

    Ok(solution.snapshot.output.friction_factor)
}

/// A trial friction factor and its Colebrook–White residual.
#[derive(Debug, Clone, Copy)]
struct ColebrookOutput {
    friction_factor: f64,
    residual: f64,
}

/// Evaluates `1/√f + 2·log10(ε/(3.7·D) + 2.51/(Re·√f))`, which falls
/// monotonically in `f` and vanishes at the Colebrook–White solution.
struct Colebrook {
    relative_roughness: f64,
    reynolds: f64,
}

impl Model for Colebrook {
    type Input = f64;
    type Output = ColebrookOutput;
    type Error = Infallible;

    fn call(&self, friction_factor: &Self::Input) -> Result<Self::Output, Self::Error> {
        let root = friction_factor.sqrt();
        let residual = 1.0 / root
            + 2.0 * (self.relative_roughness / 3.7 + 2.51 / (self.reynolds * root)).log10();
        Ok(ColebrookOutput {
            friction_factor: *friction_factor,
            residual,
        })
    }
}

struct ColebrookProblem;

impl EquationProblem<1> for ColebrookProblem {
    type Input = f64;
    type Output = ColebrookOutput;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(x[0])
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output.residual])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn laminar_and_degenerate_cases() {
        let config = FrictionConfig::default();
        assert_relative_eq!(friction_factor(0.0, 1e-5, 0.5, &config).expect("zero flow"), 0.0);
        assert_relative_eq!(friction_factor(1e6, 0.0, 0.5, &config).expect("smooth"), 0.0);
        assert_relative_eq!(friction_factor(2000.0, 1e-5, 0.5, &config).expect("laminar"), 0.032);
    }

    #[test]
    fn laminar_flow_ignores_roughness() {
        let config = FrictionConfig::default();
        let smooth = friction_factor(2000.0, 0.0, 0.5, &config).expect("laminar");
        assert_relative_eq!(smooth, 0.032);
        assert_relative_eq!(
            friction_factor(3999.0, 0.0, 0.5, &config).expect("laminar"),
            64.0 / 3999.0
        );
    }

    #[test]
    fn turbulent_matches_colebrook() {
        let config = FrictionConfig::default();
        let (reynolds, roughness, diameter) = (1e7, 1e-5, 0.5);

        let f = friction_factor(reynolds, roughness, diameter, &config).expect("turbulent");

        let root = f.sqrt();
        let rhs = -2.0 * (roughness / diameter / 3.7 + 2.51 / (reynolds * root)).log10();
        assert_relative_eq!(1.0 / root, rhs, max_relative = 1e-5);
        assert!(f > 0.008 && f < 0.012, "f = {f}");
    }

    #[test]
    fn rejects_negative_reynolds() {
        match friction_factor(-1.0, 1e-5, 0.5, &FrictionConfig::default()) {
            Err(StepError::Range(_)) => {}
            other => panic!("Expected Range error, got: {other:?}"),
        }
    }

    #[test]
    fn reynolds_uses_flow_magnitude() {
        let re = reynolds_number(-10.0, 0.5, 1e-5);
        assert_relative_eq!(re, 40.0 / (PI * 0.5e-5));
    }
}
