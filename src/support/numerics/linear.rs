use nalgebra::{DMatrix, DVector};

use super::LinearAlgebraError;

/// Solves `A·x = b`.
///
/// Square systems are factorized by LU with partial pivoting. Systems with
/// more rows than columns are solved in the least-squares sense through a
/// Householder QR factorization, `R·x = Qᵀ·b`.
///
/// # Errors
///
/// Returns [`LinearAlgebraError::Singular`] when a factor has a zero pivot,
/// [`LinearAlgebraError::NonFinite`] when the solution is not finite, and
/// [`LinearAlgebraError::DimensionMismatch`] when `b` does not match the rows
/// of `a` or `a` has more columns than rows.
pub fn solve_linear(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, LinearAlgebraError> {
    let (rows, cols) = a.shape();
    if b.len() != rows {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: rows,
            actual: b.len(),
        });
    }
    if cols > rows {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: rows,
            actual: cols,
        });
    }
    if cols == 0 {
        return Ok(DVector::zeros(0));
    }

    let x = if rows == cols {
        a.lu().solve(b)
    } else {
        let qr = a.qr();
        let projected = qr.q().transpose() * b;
        qr.r().solve_upper_triangular(&projected)
    }
    .ok_or(LinearAlgebraError::Singular)?;

    match x.iter().position(|value| !value.is_finite()) {
        Some(row) => Err(LinearAlgebraError::NonFinite { row }),
        None => Ok(x),
    }
}

/// Builds a tridiagonal matrix from its three diagonals.
///
/// Row `i` holds `lower[i]` at column `i − 1`, `diagonal[i]` at `i` and
/// `upper[i]` at `i + 1`; `lower[0]` and `upper[n − 1]` are ignored.
///
/// # Errors
///
/// Fails if the slices differ in length.
pub fn tridiagonal(
    lower: &[f64],
    diagonal: &[f64],
    upper: &[f64],
) -> Result<DMatrix<f64>, LinearAlgebraError> {
    let n = diagonal.len();
    if let Some(&actual) = [lower.len(), upper.len()].iter().find(|&&len| len != n) {
        return Err(LinearAlgebraError::DimensionMismatch { expected: n, actual });
    }

    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = diagonal[i];
        if i > 0 {
            m[(i, i - 1)] = lower[i];
        }
        if i + 1 < n {
            m[(i, i + 1)] = upper[i];
        }
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn steady_diffusion_with_source_is_parabolic() {
        // -u'' = 1 on (0, 1) with u = 0 at both ends; central differences
        // are exact for the quadratic solution x(1 - x)/2.
        let n = 19;
        #[allow(clippy::cast_precision_loss)]
        let h = 1.0 / (n + 1) as f64;
        let a = tridiagonal(&vec![-1.0; n], &vec![2.0; n], &vec![-1.0; n]).expect("same sizes");
        let b = DVector::from_element(n, h * h);

        let u = solve_linear(a, &b).expect("non-singular");
        for (i, ui) in u.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = (i + 1) as f64 * h;
            assert_relative_eq!(*ui, 0.5 * x * (1.0 - x), epsilon = 1e-12);
        }
    }

    #[test]
    fn pivots_on_zero_diagonal() {
        let a = DMatrix::from_row_slice(
            4,
            4,
            &[
                0.0, 1.0, 0.0, 0.0, //
                2.0, 1.0, 1.0, 0.0, //
                0.0, 3.0, 1.0, 2.0, //
                0.0, 0.0, 1.0, 4.0,
            ],
        );
        let expected = DVector::from_vec(vec![1.0, -2.0, 3.0, 0.5]);
        let b = &a * &expected;

        let x = solve_linear(a, &b).expect("non-singular");
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert_relative_eq!(*xi, *ei, epsilon = 1e-12);
        }
    }

    #[test]
    fn singular_matrix_has_no_solution() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        match solve_linear(a, &DVector::from_vec(vec![1.0, 1.0])) {
            Err(LinearAlgebraError::Singular) => {}
            other => panic!("Expected Singular error, got: {other:?}"),
        }
    }

    #[test]
    fn least_squares_recovers_consistent_solution() {
        // Three equations in two unknowns, consistent with x = [1, 2].
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        let x = solve_linear(a, &DVector::from_vec(vec![1.0, 3.0, 2.0])).expect("full rank");
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn least_squares_averages_conflicting_rows() {
        // x = 1 and x = 3 have the least-squares solution x = 2.
        let a = DMatrix::from_element(2, 1, 1.0);
        let x = solve_linear(a, &DVector::from_vec(vec![1.0, 3.0])).expect("full rank");
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn least_squares_keeps_precision_on_nearly_dependent_columns() {
        // AᵀA rounds to a singular matrix here (1 + ε² == 1), while the QR
        // factors of A still resolve both unknowns.
        let eps = 1e-8;
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, eps, 0.0, 0.0, eps]);
        let b = DVector::from_vec(vec![2.0, eps, eps]);

        let x = solve_linear(a, &b).expect("full column rank");
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_mismatched_sizes() {
        let a = DMatrix::identity(3, 3);
        assert_eq!(
            solve_linear(a, &DVector::zeros(2)),
            Err(LinearAlgebraError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            tridiagonal(&[0.0], &[1.0, 1.0], &[0.0, 0.0]),
            Err(LinearAlgebraError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
