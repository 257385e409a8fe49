use thiserror::Error;
use tracing::warn;

/// Errors from building an [`Interpolator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterpolatorError {
    #[error("at least two reference points are required, got {0}")]
    TooFewPoints(usize),

    #[error("positions must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },

    #[error("expected {expected} values, got {actual}")]
    WrongValueCount { expected: usize, actual: usize },
}

/// Piecewise-linear interpolation over strictly increasing positions.
///
/// Queries outside the range return the nearest end value.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    positions: Vec<f64>,
    values: Vec<f64>,
}

impl Interpolator {
    /// Creates an interpolator with one value per position.
    ///
    /// # Errors
    ///
    /// Fails with fewer than two positions, non-increasing positions, or a
    /// value count that differs from the position count.
    pub fn new(positions: Vec<f64>, values: Vec<f64>) -> Result<Self, InterpolatorError> {
        let n = positions.len();
        if n < 2 {
            return Err(InterpolatorError::TooFewPoints(n));
        }
        if let Some(index) = (1..n).find(|&i| positions[i] <= positions[i - 1]) {
            return Err(InterpolatorError::NotIncreasing { index });
        }
        if values.len() != n {
            return Err(InterpolatorError::WrongValueCount {
                expected: n,
                actual: values.len(),
            });
        }

        Ok(Self { positions, values })
    }

    /// Value at `x`.
    #[must_use]
    pub fn value_at(&self, x: f64) -> f64 {
        let n = self.positions.len();
        let first = self.positions[0];
        let last = self.positions[n - 1];

        if x < first || x > last {
            warn!(x, first, last, "interpolating outside reference range");
        }
        if x <= first {
            return self.values[0];
        }
        if x >= last {
            return self.values[n - 1];
        }

        // Interval `i` holds `positions[i] <= x < positions[i + 1]`.
        let i = self.positions.partition_point(|&p| p <= x) - 1;
        let (x0, x1) = (self.positions[i], self.positions[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Values at each of `xs`.
    #[must_use]
    pub fn values_at(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.value_at(x)).collect()
    }
}
