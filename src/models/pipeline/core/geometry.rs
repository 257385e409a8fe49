use std::f64::consts::PI;

use uom::si::{f64::Length, length::meter};

use crate::support::{
    constraint::{NonNegative, StrictlyPositive},
    numerics::Interpolator,
};

use super::ConfigError;

/// A straight pipe discretized on an evenly spaced grid.
///
/// Grid positions, elevations, diameter and roughness are stored in meters.
/// The pipe is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    positions: Vec<f64>,
    elevations: Vec<f64>,
    diameter: f64,
    roughness: f64,
}

impl Pipe {
    /// Creates a horizontal, hydraulically smooth pipe.
    ///
    /// # Errors
    ///
    /// Fails if `grid_points < 2` or if `length` or `diameter` is not
    /// strictly positive.
    pub fn new(length: Length, diameter: Length, grid_points: usize) -> Result<Self, ConfigError> {
        if grid_points < 2 {
            return Err(ConfigError::TooFewGridPoints(grid_points));
        }
        let length = StrictlyPositive::new(length)
            .map_err(ConfigError::constraint("pipe length"))?
            .into_inner()
            .get::<meter>();
        let diameter = StrictlyPositive::new(diameter)
            .map_err(ConfigError::constraint("pipe diameter"))?
            .into_inner()
            .get::<meter>();

        #[allow(clippy::cast_precision_loss)]
        let spacing = length / (grid_points - 1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let positions = (0..grid_points).map(|i| i as f64 * spacing).collect();

        Ok(Self {
            positions,
            elevations: vec![0.0; grid_points],
            diameter,
            roughness: 0.0,
        })
    }

    /// Sets the absolute wall roughness.
    ///
    /// # Errors
    ///
    /// Fails if `roughness` is negative.
    pub fn with_roughness(mut self, roughness: Length) -> Result<Self, ConfigError> {
        self.roughness = NonNegative::new(roughness)
            .map_err(ConfigError::constraint("pipe roughness"))?
            .into_inner()
            .get::<meter>();
        Ok(self)
    }

    /// Sets the elevation profile by linear interpolation between
    /// `(position, elevation)` points.
    ///
    /// Grid points beyond the profile take the nearest end elevation.
    ///
    /// # Errors
    ///
    /// Fails if the profile has fewer than two points or its positions are
    /// not strictly increasing.
    pub fn with_elevation_profile(mut self, profile: &[(Length, Length)]) -> Result<Self, ConfigError> {
        let (positions, heights): (Vec<f64>, Vec<f64>) = profile
            .iter()
            .map(|(x, h)| (x.get::<meter>(), h.get::<meter>()))
            .unzip();
        let profile = Interpolator::new(positions, heights)?;
        self.elevations = profile.values_at(&self.positions);
        Ok(self)
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; a pipe has at least two grid points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Grid positions in m, starting at zero.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Elevation at each grid point in m.
    #[must_use]
    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    /// Position of the inlet.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.positions[0]
    }

    /// Total length in m.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.positions[self.positions.len() - 1]
    }

    /// Inner diameter in m.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Absolute roughness in m.
    #[must_use]
    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    /// Flow cross-section in m².
    #[must_use]
    pub fn area(&self) -> f64 {
        PI * self.diameter * self.diameter / 4.0
    }
}
