//! Concentric shell geometry of the wall and the film coefficients at its
//! inner and outer surfaces.

use std::f64::consts::PI;

use crate::support::thermo::RangeError;

use super::{AmbientFluid, Burial, ConfigError, Material, PipeWall};

/// Number of log-spaced shells an equivalent burial layer is split into.
pub const BURIAL_SHELLS: usize = 10;

/// One concentric shell, radii in m.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shell {
    pub inner_radius: f64,
    pub width: f64,
    pub material: Material,
}

impl Shell {
    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.inner_radius + self.width
    }

    #[must_use]
    pub fn mid_radius(&self) -> f64 {
        self.inner_radius + 0.5 * self.width
    }

    /// Cross-section area, m².
    #[must_use]
    pub fn area(&self) -> f64 {
        PI * (self.outer_radius().powi(2) - self.inner_radius.powi(2))
    }

    /// Conduction resistance per unit length between radii `from` and `to`
    /// inside this shell, m·K/W.
    fn resistance(&self, from: f64, to: f64) -> f64 {
        (to / from).ln() / (2.0 * PI * self.material.conductivity)
    }
}

/// The wall, and any burial medium, as shells around the bore.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialWall {
    diameter: f64,
    shells: Vec<Shell>,
    /// Conductance per unit length between the middles of neighbouring
    /// shells, W/(m·K). One entry less than `shells`.
    couplings: Vec<f64>,
    /// Outer film coefficient, W/(m²·K).
    outer_film: f64,
}

impl RadialWall {
    /// Lays out the wall layers from the bore outwards, followed by
    /// [`BURIAL_SHELLS`] equivalent shells of the burial medium when buried.
    ///
    /// # Errors
    ///
    /// Returns a [`RangeError::ReynoldsNumber`] when the surroundings fall
    /// outside the outer film correlation.
    pub fn new(
        diameter: f64,
        wall: &PipeWall,
        burial: &Burial,
        ambient: &AmbientFluid,
    ) -> Result<Self, ConfigError> {
        let mut layers: Vec<(f64, Material)> = wall
            .layers()
            .iter()
            .map(|layer| (layer.thickness, layer.material))
            .collect();

        if burial.is_buried() {
            let wall_thickness: f64 = layers.iter().map(|(width, _)| width).sum();
            let inner = 0.5 * diameter + wall_thickness;
            let outer = equivalent_burial_radius(inner, burial.depth);
            layers.extend(
                log_spaced_widths(inner, outer, BURIAL_SHELLS)
                    .into_iter()
                    .map(|width| (width, burial.medium)),
            );
        }

        let mut radius = 0.5 * diameter;
        let shells: Vec<Shell> = layers
            .into_iter()
            .map(|(width, material)| {
                let shell = Shell {
                    inner_radius: radius,
                    width,
                    material,
                };
                radius += width;
                shell
            })
            .collect();

        let couplings = shells
            .windows(2)
            .map(|pair| {
                let (inner, outer) = (&pair[0], &pair[1]);
                1.0 / (inner.resistance(inner.mid_radius(), inner.outer_radius())
                    + outer.resistance(outer.inner_radius, outer.mid_radius()))
            })
            .collect();

        let outer_film = outer_film_coefficient(2.0 * radius, ambient)?;

        Ok(Self {
            diameter,
            shells,
            couplings,
            outer_film,
        })
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    #[must_use]
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    #[must_use]
    pub fn couplings(&self) -> &[f64] {
        &self.couplings
    }

    #[must_use]
    pub fn outer_film(&self) -> f64 {
        self.outer_film
    }

    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.shells
            .last()
            .map_or(0.5 * self.diameter, Shell::outer_radius)
    }

    /// Conductance per unit length from the gas to the middle of the first
    /// shell, W/(m·K).
    #[must_use]
    pub fn inner_conductance(&self, inner_film: f64) -> f64 {
        let bore = 0.5 * self.diameter;
        let film = 1.0 / (2.0 * PI * bore * inner_film);
        match self.shells.first() {
            Some(first) => 1.0 / (film + first.resistance(bore, first.mid_radius())),
            None => 1.0 / film,
        }
    }

    /// Conductance per unit length from the middle of the last shell to the
    /// surroundings, W/(m·K).
    #[must_use]
    pub fn outer_conductance(&self) -> f64 {
        let outer = self.outer_radius();
        let film = 1.0 / (2.0 * PI * outer * self.outer_film);
        match self.shells.last() {
            Some(last) => 1.0 / (last.resistance(last.mid_radius(), outer) + film),
            None => 1.0 / film,
        }
    }
}

/// Thermal conductivity of natural gas, W/(m·K), from pressure in Pa.
#[must_use]
pub fn gas_conductivity(pressure: f64) -> f64 {
    0.002 * pressure / 1e6 + 0.024
}

/// Film coefficient between the gas and the bore, W/(m²·K).
///
/// Dittus–Boelter above `Re = 1e4`, a constant Nusselt number of 3.66 down
/// to `Re = 4000`, and no heat transfer below.
#[must_use]
pub fn inner_film_coefficient(
    diameter: f64,
    pressure: f64,
    reynolds: f64,
    cp: f64,
    viscosity: f64,
) -> f64 {
    let conductivity = gas_conductivity(pressure);
    let nusselt = if reynolds > 1e4 {
        let prandtl = cp * viscosity / conductivity;
        0.023 * reynolds.powf(0.8) * prandtl.powf(0.4)
    } else if reynolds > 4000.0 {
        3.66
    } else {
        0.0
    };
    nusselt * conductivity / diameter
}

/// Film coefficient for cross flow over a cylinder of the given outer
/// diameter, W/(m²·K).
///
/// # Errors
///
/// Returns [`RangeError::ReynoldsNumber`] below `Re = 4000`.
pub fn outer_film_coefficient(diameter: f64, fluid: &AmbientFluid) -> Result<f64, RangeError> {
    let Material {
        conductivity,
        density,
        heat_capacity,
    } = fluid.material;
    let prandtl = heat_capacity * fluid.viscosity / conductivity;
    let reynolds = density * fluid.velocity * diameter / fluid.viscosity;

    let (c, m) = if (4e3..4e4).contains(&reynolds) {
        (0.193, 0.618)
    } else if reynolds >= 4e4 {
        (0.027, 0.805)
    } else {
        return Err(RangeError::ReynoldsNumber {
            value: reynolds,
            min: 4e3,
            max: f64::INFINITY,
        });
    };

    let nusselt = c * reynolds.powf(m) * prandtl.cbrt();
    Ok(nusselt * conductivity / diameter)
}

/// Radius of a soil cylinder with the same resistance as burial at `depth`
/// below the surface, measured from the top of a pipe of outer radius
/// `outer_radius`.
#[must_use]
pub fn equivalent_burial_radius(outer_radius: f64, depth: f64) -> f64 {
    outer_radius * ((outer_radius + depth) / outer_radius).acosh().exp()
}

/// Widths of `count` shells whose radii are log-spaced between `inner` and
/// `outer`.
#[must_use]
pub fn log_spaced_widths(inner: f64, outer: f64, count: usize) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let ratio = (outer / inner).powf(1.0 / count as f64);
    let mut radius = inner;
    (0..count)
        .map(|_| {
            let next = radius * ratio;
            let width = next - radius;
            radius = next;
            width
        })
        .collect()
}
