//! Lagrangian tracking of gas batches of different composition.
//!
//! A batch is identified by its upstream edge; it extends to the next
//! batch, or to the outlet for the last one. Batches move with the cell
//! velocity of the flow solution and keep their order. Batches that catch
//! up with the one ahead merge into it. The first batch always starts at
//! the inlet, so the extents always cover the pipe.

use thiserror::Error;
use tracing::{debug, warn};

use crate::support::thermo::Composition;

/// Malformed batch tracking input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchTrackingError {
    #[error("batch tracking needs a grid of at least 2 points, got {0}")]
    TooFewGridPoints(usize),

    #[error("{what} has {actual} entries, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("batch at {position} m lies outside the grid [{start}, {end}] m")]
    OutsideGrid { position: f64, start: f64, end: f64 },

    #[error("sample position {position} m lies outside the grid [{start}, {end}] m")]
    SampleOutOfRange { position: f64, start: f64, end: f64 },
}

/// A parcel of gas with uniform composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch {
    /// Upstream edge, m.
    pub position: f64,
    pub composition: Composition,
}

/// Ordered batches over a fixed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTrackingState {
    grid: Vec<f64>,
    batches: Vec<Batch>,
}

impl BatchTrackingState {
    /// A single batch filling the pipe.
    ///
    /// # Errors
    ///
    /// Fails with fewer than two grid points.
    pub fn uniform(grid: &[f64], composition: Composition) -> Result<Self, BatchTrackingError> {
        let start = first_point(grid)?;
        Ok(Self {
            grid: grid.to_vec(),
            batches: vec![Batch {
                position: start,
                composition,
            }],
        })
    }

    /// One batch per cell, each with the average of the compositions at the
    /// cell's end points. Neighbouring cells with the same gas share a batch.
    ///
    /// # Errors
    ///
    /// Fails with fewer than two grid points or if `compositions` does not
    /// have one entry per grid point.
    pub fn from_grid(grid: &[f64], compositions: &[Composition]) -> Result<Self, BatchTrackingError> {
        first_point(grid)?;
        if compositions.len() != grid.len() {
            return Err(BatchTrackingError::SizeMismatch {
                what: "compositions",
                expected: grid.len(),
                actual: compositions.len(),
            });
        }

        let mut batches: Vec<Batch> = Vec::with_capacity(grid.len() - 1);
        for (i, pair) in compositions.windows(2).enumerate() {
            let composition = pair[0].mix(0.5, &pair[1], 0.5);
            if batches
                .last()
                .is_some_and(|last| last.composition.is_same_gas(&composition))
            {
                continue;
            }
            batches.push(Batch {
                position: grid[i],
                composition,
            });
        }

        Ok(Self {
            grid: grid.to_vec(),
            batches,
        })
    }

    /// Replaces the batches, e.g. to resume a run.
    ///
    /// # Errors
    ///
    /// Fails if a batch lies outside the grid, if the batches are not in
    /// increasing order, or if the first batch does not start at the inlet.
    pub fn with_batches(mut self, batches: Vec<Batch>) -> Result<Self, BatchTrackingError> {
        let (start, end) = (self.start(), self.end());
        let outside = |position: f64| BatchTrackingError::OutsideGrid {
            position,
            start,
            end,
        };

        match batches.first() {
            None => {
                return Err(BatchTrackingError::SizeMismatch {
                    what: "batches",
                    expected: 1,
                    actual: 0,
                });
            }
            Some(first) if first.position != start => return Err(outside(first.position)),
            Some(_) => {}
        }
        if let Some(batch) = batches.iter().find(|b| !(start..=end).contains(&b.position)) {
            return Err(outside(batch.position));
        }
        if let Some(pair) = batches.windows(2).find(|pair| pair[1].position <= pair[0].position) {
            return Err(outside(pair[1].position));
        }

        self.batches = batches;
        Ok(self)
    }

    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    #[must_use]
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    /// Inlet position.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.grid[0]
    }

    /// Outlet position.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.grid[self.grid.len() - 1]
    }

    /// Length of every batch, in order.
    #[must_use]
    pub fn extents(&self) -> Vec<f64> {
        extents(&self.batches, self.end())
    }

    /// Moves the batches `dt` seconds with the given cell velocities and
    /// returns the compositions of batches that left through the outlet,
    /// most downstream first.
    ///
    /// Gas entering at the inlet forms a new batch unless it is the same gas
    /// as the first batch, which then stretches back to the inlet. Any
    /// negative velocity skips advection entirely.
    ///
    /// # Errors
    ///
    /// Fails if `velocity` does not have one entry per cell or a batch lies
    /// outside the grid. The state is unchanged on error.
    pub fn advect(
        &mut self,
        velocity: &[f64],
        dt: f64,
        inlet: &Composition,
    ) -> Result<Vec<Composition>, BatchTrackingError> {
        let cells = self.grid.len() - 1;
        if velocity.len() != cells {
            return Err(BatchTrackingError::SizeMismatch {
                what: "cell velocity",
                expected: cells,
                actual: velocity.len(),
            });
        }
        let (start, end) = (self.start(), self.end());
        if let Some(batch) = self
            .batches
            .iter()
            .find(|b| !(start..=end).contains(&b.position))
        {
            return Err(BatchTrackingError::OutsideGrid {
                position: batch.position,
                start,
                end,
            });
        }

        if velocity.iter().any(|&v| v < 0.0) {
            warn!("reverse flow is not tracked, skipping batch advection");
            return Ok(Vec::new());
        }
        if velocity.iter().all(|&v| v == 0.0) {
            return Ok(Vec::new());
        }

        let weights = self.extents();
        let moved: Vec<(Batch, f64)> = self
            .batches
            .iter()
            .zip(weights)
            .map(|(batch, weight)| {
                let position = self.travel(batch.position, velocity, dt);
                (
                    Batch {
                        position,
                        composition: batch.composition,
                    },
                    weight,
                )
            })
            .collect();

        let mut batches: Vec<Batch> = merge_overtaken(moved, end)
            .into_iter()
            .map(|(batch, _)| batch)
            .collect();

        let first = &mut batches[0];
        if first.composition.is_same_gas(inlet) {
            first.position = start;
        } else if first.position > start {
            batches.insert(
                0,
                Batch {
                    position: start,
                    composition: *inlet,
                },
            );
        }

        let mut delivered = Vec::new();
        while batches.len() > 1 && batches.last().is_some_and(|b| b.position >= end) {
            if let Some(batch) = batches.pop() {
                delivered.push(batch.composition);
            }
        }
        if !delivered.is_empty() {
            debug!(count = delivered.len(), "batches delivered");
        }

        self.batches = batches;
        Ok(delivered)
    }

    /// Composition at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchTrackingError::SampleOutOfRange`] outside the grid.
    pub fn sample(&self, position: f64) -> Result<Composition, BatchTrackingError> {
        let (start, end) = (self.start(), self.end());
        if !(start..=end).contains(&position) {
            return Err(BatchTrackingError::SampleOutOfRange {
                position,
                start,
                end,
            });
        }
        let index = self
            .batches
            .partition_point(|batch| batch.position <= position)
            .saturating_sub(1);
        Ok(self.batches[index].composition)
    }

    /// Composition at every grid point.
    #[must_use]
    pub fn sample_grid(&self) -> Vec<Composition> {
        self.grid
            .iter()
            .map(|&x| {
                let index = self
                    .batches
                    .partition_point(|batch| batch.position <= x)
                    .saturating_sub(1);
                self.batches[index].composition
            })
            .collect()
    }

    /// Position reached after `dt` seconds from `position`, crossing cells
    /// with their own velocity. Stops in a cell without flow and at the
    /// outlet.
    fn travel(&self, mut position: f64, velocity: &[f64], dt: f64) -> f64 {
        let end = self.end();
        let mut cell = self
            .grid
            .partition_point(|&x| x <= position)
            .saturating_sub(1);
        let mut remaining = dt;

        while remaining > 0.0 && cell < velocity.len() {
            let v = velocity[cell];
            if v <= 0.0 {
                break;
            }
            let to_cell_end = (self.grid[cell + 1] - position) / v;
            if to_cell_end > remaining {
                position += v * remaining;
                break;
            }
            remaining -= to_cell_end;
            position = self.grid[cell + 1];
            cell += 1;
        }

        position.min(end)
    }
}

fn first_point(grid: &[f64]) -> Result<f64, BatchTrackingError> {
    match grid {
        [first, _, ..] => Ok(*first),
        _ => Err(BatchTrackingError::TooFewGridPoints(grid.len())),
    }
}

fn extents(batches: &[Batch], end: f64) -> Vec<f64> {
    batches
        .iter()
        .enumerate()
        .map(|(i, batch)| batches.get(i + 1).map_or(end, |next| next.position) - batch.position)
        .collect()
}

/// Merges each batch that reached or passed the one ahead of it, mixing by
/// the weights carried alongside. Batches at the outlet are left alone so
/// each is delivered on its own.
fn merge_overtaken(moved: Vec<(Batch, f64)>, end: f64) -> Vec<(Batch, f64)> {
    let mut kept: Vec<(Batch, f64)> = Vec::with_capacity(moved.len());
    for (mut batch, mut weight) in moved {
        while let Some(&(ahead, ahead_weight)) = kept.last() {
            if ahead.position < batch.position || ahead.position >= end {
                break;
            }
            kept.pop();
            batch = Batch {
                position: batch.position.min(ahead.position),
                composition: ahead
                    .composition
                    .mix(ahead_weight, &batch.composition, weight),
            };
            weight += ahead_weight;
        }
        kept.push((batch, weight));
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::thermo::Component;

    #[allow(clippy::cast_precision_loss)]
    fn grid(start: f64, end: f64, n: usize) -> Vec<f64> {
        let step = (end - start) / (n - 1) as f64;
        (0..n).map(|i| start + i as f64 * step).collect()
    }

    fn methane() -> Composition {
        Composition::pure(Component::Methane)
    }

    fn nitrogen() -> Composition {
        Composition::pure(Component::Nitrogen)
    }

    #[test]
    fn grid_compositions_collapse_into_runs() {
        let points = grid(100.0, 1000.0, 10);
        let mut compositions = vec![methane(); 10];
        compositions[6..].fill(nitrogen());

        let state = BatchTrackingState::from_grid(&points, &compositions).expect("sizes match");

        // Methane run, the mixed cell, nitrogen run.
        assert_eq!(state.batches().len(), 3);
        assert_relative_eq!(state.batches()[0].position, 100.0);
        assert_relative_eq!(state.batches()[1].position, 600.0);
        assert_relative_eq!(state.batches()[1].composition.fraction(Component::Methane), 0.5);
        assert_relative_eq!(state.extents().iter().sum::<f64>(), 900.0);
    }

    #[test]
    fn inlet_change_enters_as_a_new_batch() {
        let points = grid(0.0, 100.0, 11);
        let velocity = vec![1.0; 10];
        let mut state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");

        state.advect(&velocity, 10.0, &nitrogen()).expect("advects");
        let sampled = state.sample_grid();
        assert!(sampled[0].is_same_gas(&nitrogen()));
        assert!(sampled[1].is_same_gas(&methane()));

        state.advect(&velocity, 10.0, &methane()).expect("advects");
        let sampled = state.sample_grid();
        assert!(sampled[0].is_same_gas(&methane()));
        assert!(sampled[1].is_same_gas(&nitrogen()));
        assert!(sampled[2].is_same_gas(&methane()));
        assert_eq!(state.batches().len(), 3);
    }

    #[test]
    fn extents_cover_the_pipe_and_batches_exit_once() {
        let points = grid(0.0, 100.0, 11);
        // Uneven but positive velocities.
        let velocity: Vec<f64> = (0..10).map(|i| 1.0 + 0.2 * f64::from(i % 3)).collect();
        let mut state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");

        let mut delivered = Vec::new();
        for step in 0..60 {
            let inlet = if step % 2 == 0 { nitrogen() } else { methane() };
            delivered.extend(state.advect(&velocity, 7.0, &inlet).expect("advects"));

            assert_relative_eq!(state.extents().iter().sum::<f64>(), 100.0, epsilon = 1e-9);
            assert!(state.extents().iter().all(|&x| x >= 0.0));
            assert!(state.batches().windows(2).all(|p| p[0].position < p[1].position));
        }

        // 30 of the 60 batches that entered, plus the initial one, have left;
        // none twice.
        let entered = 60 + 1;
        assert_eq!(delivered.len() + state.batches().len(), entered);
        assert!(delivered[0].is_same_gas(&methane()));
    }

    #[test]
    fn stalled_cell_merges_batches() {
        let points = grid(0.0, 30.0, 4);
        let state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");
        let mut state = state
            .with_batches(vec![
                Batch {
                    position: 0.0,
                    composition: methane(),
                },
                Batch {
                    position: 5.0,
                    composition: nitrogen(),
                },
                Batch {
                    position: 15.0,
                    composition: methane(),
                },
            ])
            .expect("valid batches");

        // The second cell holds still: the first two batches pile up at its
        // upstream boundary while the third waits inside it.
        let delivered = state
            .advect(&[1.0, 0.0, 1.0], 20.0, &methane())
            .expect("advects");

        assert!(delivered.is_empty());
        let batches = state.batches();
        assert_eq!(batches.len(), 3);
        // 5 m of methane merged with 10 m of nitrogen; fresh methane behind.
        assert_relative_eq!(batches[0].position, 0.0);
        assert_relative_eq!(batches[1].position, 10.0);
        assert_relative_eq!(
            batches[1].composition.fraction(Component::Nitrogen),
            2.0 / 3.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(batches[2].position, 15.0);
    }

    #[test]
    fn reverse_flow_is_skipped() {
        let points = grid(0.0, 100.0, 11);
        let mut state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");
        let before = state.clone();

        let mut velocity = vec![1.0; 10];
        velocity[4] = -0.1;
        let delivered = state.advect(&velocity, 10.0, &nitrogen()).expect("skips");

        assert!(delivered.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn sampling_outside_the_grid_fails() {
        let points = grid(55.0, 155.0, 11);
        let state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");

        for position in [54.9, 155.1, 0.0] {
            match state.sample(position) {
                Err(BatchTrackingError::SampleOutOfRange { .. }) => {}
                other => panic!("Expected SampleOutOfRange error, got: {other:?}"),
            }
        }
        for position in [55.0, 100.0, 155.0] {
            assert!(state.sample(position).is_ok());
        }
    }

    #[test]
    fn wrong_velocity_count_is_rejected() {
        let points = grid(0.0, 100.0, 11);
        let mut state = BatchTrackingState::uniform(&points, methane()).expect("valid grid");
        match state.advect(&[1.0; 3], 1.0, &methane()) {
            Err(BatchTrackingError::SizeMismatch { expected, actual, .. }) => {
                assert_eq!((expected, actual), (10, 3));
            }
            other => panic!("Expected SizeMismatch error, got: {other:?}"),
        }
    }
}
