//! Assembly and solution of the linearized flow system.
//!
//! Unknowns are ordered grid point by grid point as `[m, p, T]`. Variables
//! fixed by an active boundary condition are not unknowns: their stencil
//! coefficients times the imposed value move to the right-hand side. Each
//! element contributes three rows, so the system has `3·(N−1)` rows and
//! `3·(N−1) − (active − 3)` columns.

use nalgebra::{DMatrix, DVector};

use crate::support::numerics::{LinearAlgebraError, solve_linear};

use super::{
    InputError, StepError,
    boundary::{BoundaryConditions, EndConditions, Variable},
    discretizer::Stencil,
};

const VARS: usize = 3;

/// A linear system rebuilt on every solver iteration.
///
/// Entries lie within a few columns of the diagonal, but the matrix is
/// stored dense.
#[derive(Debug, Clone)]
pub struct MatrixEquation {
    coefficients: DMatrix<f64>,
    constants: DVector<f64>,
    boundary: BoundaryConditions,
}

impl MatrixEquation {
    /// Builds the system from one stencil per element.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::TooFewBoundaryConditions`] with fewer than three
    /// active conditions, and [`InputError::SizeMismatch`] without stencils.
    pub fn assemble(stencils: &[Stencil], boundary: &BoundaryConditions) -> Result<Self, StepError> {
        let active = boundary.active_count();
        if active < VARS {
            return Err(InputError::TooFewBoundaryConditions { active }.into());
        }
        let elements = stencils.len();
        if elements == 0 {
            return Err(InputError::SizeMismatch {
                what: "stencils",
                expected: 1,
                actual: 0,
            }
            .into());
        }

        let rows = VARS * elements;
        let cols = rows - (active - VARS);
        let mut coefficients = DMatrix::zeros(rows, cols);
        let mut constants = DVector::from_iterator(rows, stencils.iter().flat_map(|s| s.boundary));

        // Inlet point: only element 0 refers to it.
        let first = &stencils[0];
        let mut col = 0;
        for variable in Variable::ALL {
            let var = variable.index();
            let condition = boundary.inlet.get(variable);
            for eq in 0..VARS {
                if condition.active {
                    constants[eq] -= first.term_i[eq][var] * condition.value;
                } else {
                    coefficients[(eq, col)] += first.term_i[eq][var];
                }
            }
            if !condition.active {
                col += 1;
            }
        }

        // Interior points appear in the element to their left (as i+1) and
        // the element to their right (as i).
        let mut col0 = col;
        for element in 0..elements - 1 {
            let row0 = VARS * element;
            for eq in 0..VARS {
                for var in 0..VARS {
                    coefficients[(row0 + eq, col0 + var)] += stencils[element].term_ipp[eq][var];
                    coefficients[(row0 + VARS + eq, col0 + var)] +=
                        stencils[element + 1].term_i[eq][var];
                }
            }
            col0 += VARS;
        }

        // Outlet point: only the last element refers to it.
        let last = &stencils[elements - 1];
        let row0 = VARS * (elements - 1);
        let mut col = col0;
        for variable in Variable::ALL {
            let var = variable.index();
            let condition = boundary.outlet.get(variable);
            for eq in 0..VARS {
                if condition.active {
                    constants[row0 + eq] -= last.term_ipp[eq][var] * condition.value;
                } else {
                    coefficients[(row0 + eq, col)] += last.term_ipp[eq][var];
                }
            }
            if !condition.active {
                col += 1;
            }
        }

        Ok(Self {
            coefficients,
            constants,
            boundary: *boundary,
        })
    }

    #[must_use]
    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    #[must_use]
    pub fn constants(&self) -> &DVector<f64> {
        &self.constants
    }

    /// Solves the system and returns `[m, p, T]` at every grid point, with
    /// boundary values filled back in.
    ///
    /// Square systems use LU; over-determined systems are solved in the
    /// least-squares sense by QR.
    ///
    /// # Errors
    ///
    /// Returns a [`LinearAlgebraError`] when no solution is found.
    pub fn solve(&self) -> Result<Vec<[f64; 3]>, LinearAlgebraError> {
        let x = solve_linear(self.coefficients.clone(), &self.constants)?;
        Ok(self.reshape(x.as_slice()))
    }

    fn reshape(&self, x: &[f64]) -> Vec<[f64; 3]> {
        let grid_points = self.coefficients.nrows() / VARS + 1;
        let mut unknowns = x.iter().copied();
        let end_point = |end: &EndConditions, unknowns: &mut dyn Iterator<Item = f64>| {
            Variable::ALL.map(|variable| {
                let condition = end.get(variable);
                if condition.active {
                    condition.value
                } else {
                    unknowns.next().unwrap_or(f64::NAN)
                }
            })
        };

        let mut output = Vec::with_capacity(grid_points);
        output.push(end_point(&self.boundary.inlet, &mut unknowns));
        for _ in 1..grid_points - 1 {
            output.push([0; VARS].map(|_| unknowns.next().unwrap_or(f64::NAN)));
        }
        output.push(end_point(&self.boundary.outlet, &mut unknowns));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::pipeline::core::boundary::SingleCondition;

    /// Stencil of the decoupled equations `x_{i+1} − x_i = 1` for every
    /// variable, so each variable increases by one per grid point.
    fn staircase() -> Stencil {
        let mut stencil = Stencil::default();
        for k in 0..VARS {
            stencil.term_i[k][k] = -1.0;
            stencil.term_ipp[k][k] = 1.0;
            stencil.boundary[k] = 1.0;
        }
        stencil
    }

    fn inlet_fixed(values: [f64; 3]) -> BoundaryConditions {
        let mut bc = BoundaryConditions::default();
        bc.inlet.flow = SingleCondition::active(values[0]);
        bc.inlet.pressure = SingleCondition::active(values[1]);
        bc.inlet.temperature = SingleCondition::active(values[2]);
        bc
    }

    #[test]
    fn solves_square_system_exactly() {
        let stencils = vec![staircase(); 4];
        let bc = inlet_fixed([10.0, 50.0, 300.0]);

        let equation = MatrixEquation::assemble(&stencils, &bc).expect("enough conditions");
        assert_eq!(equation.coefficients().shape(), (12, 12));

        let solution = equation.solve().expect("system is regular");
        assert_eq!(solution.len(), 5);
        for (g, point) in solution.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let step = g as f64;
            assert_relative_eq!(point[0], 10.0 + step, epsilon = 1e-12);
            assert_relative_eq!(point[1], 50.0 + step, epsilon = 1e-12);
            assert_relative_eq!(point[2], 300.0 + step, epsilon = 1e-12);
        }
    }

    #[test]
    fn mixed_ends_place_free_variables() {
        // Flow fixed at the outlet, pressure and temperature at the inlet.
        let stencils = vec![staircase(); 3];
        let mut bc = BoundaryConditions::default();
        bc.inlet.pressure = SingleCondition::active(50.0);
        bc.inlet.temperature = SingleCondition::active(300.0);
        bc.outlet.flow = SingleCondition::active(7.0);

        let solution = MatrixEquation::assemble(&stencils, &bc)
            .and_then(|equation| Ok(equation.solve()?))
            .expect("system is regular");

        assert_relative_eq!(solution[0][0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(solution[3][0], 7.0);
        assert_relative_eq!(solution[3][1], 53.0, epsilon = 1e-12);
        assert_relative_eq!(solution[2][2], 302.0, epsilon = 1e-12);
    }

    #[test]
    fn consistent_extra_condition_is_satisfied() {
        let stencils = vec![staircase(); 3];
        let mut bc = inlet_fixed([1.0, 2.0, 3.0]);
        bc.outlet.temperature = SingleCondition::active(6.0);

        let equation = MatrixEquation::assemble(&stencils, &bc).expect("enough conditions");
        assert_eq!(equation.coefficients().shape(), (9, 8));

        let solution = equation.solve().expect("least squares succeeds");
        assert_relative_eq!(solution[3][0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(solution[2][2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(solution[3][2], 6.0);
    }

    #[test]
    fn too_few_conditions() {
        let stencils = vec![staircase(); 3];
        let mut bc = BoundaryConditions::default();
        bc.inlet.pressure = SingleCondition::active(50.0);
        bc.outlet.flow = SingleCondition::active(7.0);

        match MatrixEquation::assemble(&stencils, &bc) {
            Err(StepError::InvalidInput(InputError::TooFewBoundaryConditions { active })) => {
                assert_eq!(active, 2);
            }
            other => panic!("Expected TooFewBoundaryConditions error, got: {other:?}"),
        }
    }
}
