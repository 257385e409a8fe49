//! Finite-difference linearization of the governing equations.
//!
//! Each element spans two neighbouring grid points `i` and `i+1`. For every
//! element a [`Discretizer`] produces a [`Stencil`]: the coefficients that
//! multiply the unknowns at both points, plus a right-hand side, for the
//! continuity, momentum and energy equations.
//!
//! Coefficients are built from center averages of the current guess, while
//! the time-derivative terms use the previous step. Continuity and momentum
//! are shared; formulations differ only in how the energy equation is written.

mod enthalpy;
mod internal_energy;

pub use enthalpy::Enthalpy;
pub use internal_energy::InternalEnergy;

use super::{Pipe, PipeState};

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.81;

/// Equation indices in a [`Stencil`].
pub(crate) const CONTINUITY: usize = 0;
pub(crate) const MOMENTUM: usize = 1;
pub(crate) const ENERGY: usize = 2;

/// Coefficients of one equation over one element, indexed by variable
/// `[flow, pressure, temperature]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EquationRow {
    /// Multiplies the unknowns at grid point `i`.
    pub term_i: [f64; 3],
    /// Multiplies the unknowns at grid point `i+1`.
    pub term_ipp: [f64; 3],
    pub boundary: f64,
}

/// Coefficients of all three equations over one element.
///
/// `term_i[eq][var]` and `term_ipp[eq][var]`, with equations ordered
/// continuity, momentum, energy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stencil {
    pub term_i: [[f64; 3]; 3],
    pub term_ipp: [[f64; 3]; 3],
    pub boundary: [f64; 3],
}

impl Stencil {
    fn set(&mut self, equation: usize, row: EquationRow) {
        self.term_i[equation] = row.term_i;
        self.term_ipp[equation] = row.term_ipp;
        self.boundary[equation] = row.boundary;
    }
}

/// Center-averaged quantities of one element.
///
/// Gas properties are averages of the current guess; the gas constant and
/// the `previous_*` sums come from the last converged step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub dt: f64,
    pub dx: f64,
    /// Elevation gain over the element.
    pub dh: f64,
    pub diameter: f64,
    pub area: f64,
    pub gas_constant: f64,

    pub flow: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub friction: f64,
    pub cp: f64,
    pub cv: f64,
    pub heat_flux: f64,
    pub density: f64,
    pub z: f64,
    pub dz_dt_p: f64,
    pub dz_dp_t: f64,
    pub dz_dt_rho: f64,

    pub previous_flow_sum: f64,
    pub previous_pressure_sum: f64,
    pub previous_temperature_sum: f64,
}

impl Element {
    /// Builds element `i` from the previous state and the current guess.
    ///
    /// Both states must have derived properties for every grid point.
    #[must_use]
    pub fn new(pipe: &Pipe, previous: &PipeState, guess: &PipeState, dt: f64, i: usize) -> Self {
        let avg = |values: &[f64]| 0.5 * (values[i] + values[i + 1]);
        let sum = |values: &[f64]| values[i] + values[i + 1];
        let derived = &guess.derived;

        Self {
            dt,
            dx: pipe.positions()[i + 1] - pipe.positions()[i],
            dh: pipe.elevations()[i + 1] - pipe.elevations()[i],
            diameter: pipe.diameter(),
            area: pipe.area(),
            gas_constant: avg(&previous.derived.gas_constant),

            flow: avg(&guess.flow),
            pressure: avg(&guess.pressure),
            temperature: avg(&guess.temperature),
            friction: avg(&derived.friction),
            cp: avg(&derived.cp),
            cv: avg(&derived.cv),
            heat_flux: avg(&guess.heat_flux),
            density: avg(&derived.density),
            z: avg(&derived.z),
            dz_dt_p: avg(&derived.dz_dt_p),
            dz_dp_t: avg(&derived.dz_dp_t),
            dz_dt_rho: avg(&derived.dz_dt_rho),

            previous_flow_sum: sum(&previous.flow),
            previous_pressure_sum: sum(&previous.pressure),
            previous_temperature_sum: sum(&previous.temperature),
        }
    }

    /// `Z·R·T/(p·A)`, the specific volume per unit area.
    #[must_use]
    pub fn zrt_over_pa(&self) -> f64 {
        self.z * self.gas_constant * self.temperature / (self.pressure * self.area)
    }

    /// `1/p − (∂Z/∂p)/Z`.
    fn pressure_sensitivity(&self) -> f64 {
        1.0 / self.pressure - self.dz_dp_t / self.z
    }

    /// `1/T + (∂Z/∂T|p)/Z`.
    fn temperature_sensitivity(&self) -> f64 {
        1.0 / self.temperature + self.dz_dt_p / self.z
    }

    fn half_inverse_dt(&self) -> f64 {
        1.0 / (2.0 * self.dt)
    }
}

/// A spatial discretization of the governing equations.
///
/// Implementors supply the energy equation; continuity and momentum are
/// shared by all formulations.
pub trait Discretizer {
    /// Energy equation coefficients for one element.
    fn energy(&self, element: &Element) -> EquationRow;

    /// Stencils for every element of the pipe.
    fn discretize(
        &self,
        pipe: &Pipe,
        previous: &PipeState,
        guess: &PipeState,
        dt: f64,
    ) -> Vec<Stencil> {
        (0..pipe.len() - 1)
            .map(|i| {
                let element = Element::new(pipe, previous, guess, dt, i);
                let mut stencil = Stencil::default();
                stencil.set(CONTINUITY, continuity(&element));
                stencil.set(MOMENTUM, momentum(&element));
                stencil.set(ENERGY, self.energy(&element));
                stencil
            })
            .collect()
    }
}

/// Mass conservation written in pressure and temperature.
#[must_use]
pub fn continuity(e: &Element) -> EquationRow {
    let c1 = 1.0 / e.pressure_sensitivity();
    let c2 = e.temperature_sensitivity();
    let c3 = e.zrt_over_pa();
    let half = e.half_inverse_dt();

    EquationRow {
        term_i: [-c1 * c3 / e.dx, half, -c1 * c2 * half],
        term_ipp: [c1 * c3 / e.dx, half, -c1 * c2 * half],
        boundary: -c1 * c2 * e.previous_temperature_sum * half
            + e.previous_pressure_sum * half,
    }
}

/// Momentum balance with wall friction and gravity.
#[must_use]
pub fn momentum(e: &Element) -> EquationRow {
    let zrt_over_pa = e.zrt_over_pa();
    let c1 = e.flow * zrt_over_pa;
    let c2 = e.flow * e.pressure_sensitivity();
    let c3 = e.flow * e.temperature_sensitivity();
    let c4 = e.friction * e.flow.abs() / (2.0 * e.diameter) * zrt_over_pa;
    let c5 = e.area / (e.z * e.gas_constant * e.temperature) * GRAVITY * e.dh / e.dx;
    let half = e.half_inverse_dt();

    let flow_diagonal = half + c4 / 2.0;
    let pressure_gradient = e.area / e.dx - c1 * c2 / e.dx;

    EquationRow {
        term_i: [
            flow_diagonal - 2.0 * c1 / e.dx,
            -pressure_gradient + c5 / 2.0,
            -c1 * c3 / e.dx,
        ],
        term_ipp: [
            flow_diagonal + 2.0 * c1 / e.dx,
            pressure_gradient + c5 / 2.0,
            c1 * c3 / e.dx,
        ],
        boundary: e.previous_flow_sum * half,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::pipeline::core::test_support::element;

    #[test]
    fn continuity_balances_a_steady_state() {
        // With no flow gradient and unchanged p and T the residual vanishes.
        let e = element();
        let row = continuity(&e);

        let p = e.previous_pressure_sum / 2.0;
        let t = e.previous_temperature_sum / 2.0;
        let m = e.flow;
        let lhs = row.term_i[0] * m
            + row.term_ipp[0] * m
            + (row.term_i[1] + row.term_ipp[1]) * p
            + (row.term_i[2] + row.term_ipp[2]) * t;
        assert_relative_eq!(lhs, row.boundary, max_relative = 1e-12);
    }

    #[test]
    fn momentum_includes_gravity_for_uphill_element() {
        let flat = element();
        let uphill = Element { dh: 10.0, ..flat };

        let flat_row = momentum(&flat);
        let uphill_row = momentum(&uphill);

        let expected = flat.area / (flat.z * flat.gas_constant * flat.temperature) * GRAVITY
            * 10.0
            / flat.dx
            / 2.0;
        assert_relative_eq!(
            uphill_row.term_i[1] - flat_row.term_i[1],
            expected,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            uphill_row.term_ipp[1] - flat_row.term_ipp[1],
            expected,
            max_relative = 1e-9
        );
    }
}
