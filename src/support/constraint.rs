//! Sign checks on physical inputs, done once at construction.
//!
//! Pipe length, bore, wall layer thickness and the time step are only
//! meaningful when positive; roughness and burial depth may also be zero.
//! Wrapping such values in [`Constrained`] lets the numerical core take the
//! sign for granted.
//!
//! Both markers accept plain floats as well as [`uom`] quantities:
//!
//! ```
//! use twine_pipeflow::support::constraint::{NonNegative, StrictlyPositive};
//! use uom::si::{f64::Length, length::meter};
//!
//! let bore = StrictlyPositive::new(Length::new::<meter>(0.9)).unwrap();
//! assert_eq!(bore.into_inner().get::<meter>(), 0.9);
//!
//! assert!(StrictlyPositive::new(0.0).is_err());
//! assert!(NonNegative::new(0.0).is_ok());
//! ```

use std::{cmp::Ordering, marker::PhantomData};

use num_traits::Zero;
use thiserror::Error;

/// A rule that a value of type `T` must satisfy.
pub trait Constraint<T> {
    /// # Errors
    ///
    /// Returns the [`ConstraintError`] naming the violation.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value is negative")]
    Negative,
    #[error("value is zero")]
    Zero,
    #[error("value is NaN")]
    NotANumber,
}

/// A value that passed the check of `C`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    rule: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// # Errors
    ///
    /// Fails when `value` violates `C`.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value).map(|()| Self {
            value,
            rule: PhantomData,
        })
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictlyPositive;

/// Zero or greater.
///
/// A burial depth of zero means the pipe lies exposed on the seabed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonNegative;

impl StrictlyPositive {
    /// # Errors
    ///
    /// Fails for zero, negative or NaN values.
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, Self>, ConstraintError> {
        Constrained::new(value)
    }
}

impl NonNegative {
    /// # Errors
    ///
    /// Fails for negative or NaN values.
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, Self>, ConstraintError> {
        Constrained::new(value)
    }
}

fn sign<T: PartialOrd + Zero>(value: &T) -> Result<Ordering, ConstraintError> {
    value
        .partial_cmp(&T::zero())
        .ok_or(ConstraintError::NotANumber)
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match sign(value)? {
            Ordering::Greater => Ok(()),
            Ordering::Equal => Err(ConstraintError::Zero),
            Ordering::Less => Err(ConstraintError::Negative),
        }
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if sign(value)? == Ordering::Less {
            Err(ConstraintError::Negative)
        } else {
            Ok(())
        }
    }
}
