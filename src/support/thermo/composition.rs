use thiserror::Error;

/// Number of components tracked in a gas mixture.
pub const COMPONENT_COUNT: usize = 10;

/// A component of a natural gas mixture.
///
/// The discriminant is the component's index in [`Composition::fractions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Methane = 0,
    Ethane = 1,
    Propane = 2,
    IsoButane = 3,
    NormalButane = 4,
    IsoPentane = 5,
    NormalPentane = 6,
    /// Hexane and heavier (C6+).
    Hexane = 7,
    Nitrogen = 8,
    CarbonDioxide = 9,
}

impl Component {
    /// All components in mixture order.
    pub const ALL: [Self; COMPONENT_COUNT] = [
        Self::Methane,
        Self::Ethane,
        Self::Propane,
        Self::IsoButane,
        Self::NormalButane,
        Self::IsoPentane,
        Self::NormalPentane,
        Self::Hexane,
        Self::Nitrogen,
        Self::CarbonDioxide,
    ];

    /// Position of this component in a fraction array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short chemical label, e.g. `"nC4"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Methane => "C1",
            Self::Ethane => "C2",
            Self::Propane => "C3",
            Self::IsoButane => "iC4",
            Self::NormalButane => "nC4",
            Self::IsoPentane => "iC5",
            Self::NormalPentane => "nC5",
            Self::Hexane => "C6+",
            Self::Nitrogen => "N2",
            Self::CarbonDioxide => "CO2",
        }
    }
}

/// Errors raised when building a [`Composition`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompositionError {
    /// A mole fraction was negative.
    #[error("negative fraction {value} for {}", .component.label())]
    Negative { component: Component, value: f64 },

    /// A mole fraction was infinite or `NaN`.
    #[error("non-finite fraction for {}", .component.label())]
    NotFinite { component: Component },

    /// The fractions sum to zero, so the mixture cannot be normalized.
    #[error("fractions sum to zero")]
    ZeroSum,
}

/// Mole fractions of a gas mixture.
///
/// Fractions are non-negative and conceptually sum to one. The sum is not
/// enforced; use [`Composition::normalized`] when it matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    fractions: [f64; COMPONENT_COUNT],
}

impl Composition {
    /// Fraction sums closer to one than this count as normalized.
    const NORMALIZED_TOLERANCE: f64 = 10.0 * f64::EPSILON;

    /// Two compositions whose summed absolute difference is below this are
    /// treated as the same gas.
    pub const SAME_GAS_TOLERANCE: f64 = 1e-10;

    /// Creates a composition from mole fractions.
    ///
    /// # Errors
    ///
    /// Returns a [`CompositionError`] if any fraction is negative or not finite.
    pub fn new(fractions: [f64; COMPONENT_COUNT]) -> Result<Self, CompositionError> {
        for (component, &value) in Component::ALL.iter().zip(&fractions) {
            if !value.is_finite() {
                return Err(CompositionError::NotFinite {
                    component: *component,
                });
            }
            if value < 0.0 {
                return Err(CompositionError::Negative {
                    component: *component,
                    value,
                });
            }
        }
        Ok(Self { fractions })
    }

    /// A single pure component.
    #[must_use]
    pub fn pure(component: Component) -> Self {
        let mut fractions = [0.0; COMPONENT_COUNT];
        fractions[component.index()] = 1.0;
        Self { fractions }
    }

    /// All mole fractions in [`Component::ALL`] order.
    #[must_use]
    pub fn fractions(&self) -> &[f64; COMPONENT_COUNT] {
        &self.fractions
    }

    /// Mole fraction of a single component.
    #[must_use]
    pub fn fraction(&self, component: Component) -> f64 {
        self.fractions[component.index()]
    }

    /// Sum of all fractions.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.fractions.iter().sum()
    }

    /// Whether the fractions sum to one within a few ulps.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (1.0 - self.sum()).abs() < Self::NORMALIZED_TOLERANCE
    }

    /// Returns a copy scaled so the fractions sum to one.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::ZeroSum`] if all fractions are zero.
    pub fn normalized(&self) -> Result<Self, CompositionError> {
        let sum = self.sum();
        if sum <= 0.0 {
            return Err(CompositionError::ZeroSum);
        }
        Ok(Self {
            fractions: self.fractions.map(|x| x / sum),
        })
    }

    /// Whether `other` describes the same gas within [`Self::SAME_GAS_TOLERANCE`].
    #[must_use]
    pub fn is_same_gas(&self, other: &Self) -> bool {
        self.distance(other) < Self::SAME_GAS_TOLERANCE
    }

    /// Summed absolute difference of all fractions.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.fractions
            .iter()
            .zip(&other.fractions)
            .map(|(a, b)| (a - b).abs())
            .sum()
    }

    /// Mixes two compositions with the given non-negative weights.
    ///
    /// Falls back to `self` when both weights are zero.
    #[must_use]
    pub fn mix(&self, self_weight: f64, other: &Self, other_weight: f64) -> Self {
        let total = self_weight + other_weight;
        if total <= 0.0 {
            return *self;
        }
        let mut fractions = [0.0; COMPONENT_COUNT];
        for (i, x) in fractions.iter_mut().enumerate() {
            *x = (self.fractions[i] * self_weight + other.fractions[i] * other_weight) / total;
        }
        Self { fractions }
    }

    /// Fraction-weighted sum of per-component values, e.g. a mixture molar mass.
    #[must_use]
    pub fn weighted_sum(&self, per_component: &[f64; COMPONENT_COUNT]) -> f64 {
        self.fractions
            .iter()
            .zip(per_component)
            .map(|(x, v)| x * v)
            .sum()
    }
}

impl Default for Composition {
    /// A typical dry export gas.
    fn default() -> Self {
        let percent = [
            89.16, 7.3513, 0.5104, 0.0311, 0.0251, 0.0024, 0.0009, 0.0, 0.6980, 2.2208,
        ];
        Self {
            fractions: percent.map(|x| x / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_gas_is_normalized() {
        let gas = Composition::default();
        assert_relative_eq!(gas.sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(gas.fraction(Component::Methane), 0.8916);
        assert_relative_eq!(gas.fraction(Component::CarbonDioxide), 0.022208);
    }

    #[test]
    fn normalizes_arbitrary_amounts() {
        let gas = Composition::new([2.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .expect("valid fractions");
        assert!(!gas.is_normalized());

        let normalized = gas.normalized().expect("non-zero sum");
        assert!(normalized.is_normalized());
        assert_relative_eq!(normalized.fraction(Component::Methane), 0.5);
        assert_relative_eq!(normalized.fraction(Component::Propane), 0.25);
    }

    #[test]
    fn rejects_invalid_fractions() {
        let mut fractions = [0.1; COMPONENT_COUNT];
        fractions[8] = -0.1;
        match Composition::new(fractions) {
            Err(CompositionError::Negative { component, .. }) => {
                assert_eq!(component, Component::Nitrogen);
            }
            other => panic!("Expected Negative error, got: {other:?}"),
        }

        fractions[8] = f64::NAN;
        assert!(matches!(
            Composition::new(fractions),
            Err(CompositionError::NotFinite { .. })
        ));

        let empty = Composition::new([0.0; COMPONENT_COUNT]).expect("zeros are valid");
        assert_eq!(empty.normalized(), Err(CompositionError::ZeroSum));
    }

    #[test]
    fn mixing_weights_by_amount() {
        let methane = Composition::pure(Component::Methane);
        let ethane = Composition::pure(Component::Ethane);

        let mixed = methane.mix(3.0, &ethane, 1.0);
        assert_relative_eq!(mixed.fraction(Component::Methane), 0.75);
        assert_relative_eq!(mixed.fraction(Component::Ethane), 0.25);
        assert!(mixed.is_normalized());

        assert!(!methane.is_same_gas(&ethane));
        assert!(methane.is_same_gas(&methane.mix(1.0, &methane, 1.0)));
    }
}
