//! Type-level numeric constraints with zero runtime cost.
//!
//! Terminal models carry a handful of values whose range is part of their
//! meaning: mass flows are never negative, damper positions and air
//! fractions live in `[0, 1]`. This module encodes those invariants at the
//! type level so they are checked once, at construction.
//!
//! # Provided constraints
//!
//! - [`NonNegative`]: Zero or greater
//! - [`UnitInterval`]: Closed unit interval `0 ≤ x ≤ 1`
//!
//! Each marker is used with the generic [`Constrained<T, C>`] wrapper,
//! where `C` is the marker type implementing [`Constraint<T>`].
//!
//! # Extending
//!
//! You can define custom numeric invariants by implementing [`Constraint<T>`]
//! for your own zero-sized marker types.

use std::{cmp::Ordering, marker::PhantomData};

use num_traits::Zero;
use thiserror::Error;

/// A trait for enforcing numeric invariants at construction time.
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value is not a number")]
    NotANumber,
    #[error("value is below the minimum allowed")]
    BelowMinimum,
    #[error("value is above the maximum allowed")]
    AboveMaximum,
}

/// A result type alias to use with [`Constraint`].
pub type ConstraintResult<T, E = ConstraintError> = Result<T, E>;

/// A wrapper enforcing a numeric constraint at construction time.
///
/// # Example
///
/// ```
/// use twine_air_terminals::support::constraint::{Constrained, UnitInterval};
///
/// let position = Constrained::<f64, UnitInterval>::new(0.4).unwrap();
/// assert_eq!(position.into_inner(), 0.4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Marker type enforcing that a value is non-negative (zero or greater).
///
/// # Examples
///
/// ```
/// use twine_air_terminals::support::constraint::NonNegative;
/// use uom::si::{f64::MassRate, mass_rate::kilogram_per_second};
///
/// let flow = NonNegative::new(MassRate::new::<kilogram_per_second>(0.3)).unwrap();
/// assert_eq!(flow.into_inner().get::<kilogram_per_second>(), 0.3);
///
/// assert!(NonNegative::new(-1.0).is_err());
/// assert!(NonNegative::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs a [`Constrained<T, NonNegative>`] if the value is non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, NonNegative>, ConstraintError> {
        Constrained::<T, NonNegative>::new(value)
    }

    /// Returns zero as a non-negative constrained value.
    #[must_use]
    pub fn zero<T: PartialOrd + Zero>() -> Constrained<T, NonNegative> {
        Constrained {
            value: T::zero(),
            _marker: PhantomData,
        }
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater | Ordering::Equal) => Ok(()),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

/// Marker type enforcing that an `f64` lies in the closed unit interval `[0, 1]`.
///
/// Damper positions, outdoor-air fractions and minimum zone-air fractions
/// all use this marker.
///
/// # Examples
///
/// ```
/// use twine_air_terminals::support::constraint::UnitInterval;
///
/// assert!(UnitInterval::new(0.25).is_ok());
/// assert!(UnitInterval::new(1.0001).is_err());
///
/// // Ratios computed from flows can overshoot by round-off.
/// assert_eq!(UnitInterval::saturating(1.0 + 1e-12).into_inner(), 1.0);
/// assert_eq!(UnitInterval::saturating(f64::NAN).into_inner(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitInterval;

impl UnitInterval {
    /// Constructs a `Constrained<f64, UnitInterval>` if `0 ≤ value ≤ 1`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than one.
    /// - [`ConstraintError::NotANumber`] if the value is `NaN`.
    pub fn new(value: f64) -> Result<Constrained<f64, UnitInterval>, ConstraintError> {
        Constrained::<f64, UnitInterval>::new(value)
    }

    /// Returns zero as a constrained value.
    #[must_use]
    pub fn zero() -> Constrained<f64, UnitInterval> {
        Constrained {
            value: 0.0,
            _marker: PhantomData,
        }
    }

    /// Returns one as a constrained value.
    #[must_use]
    pub fn one() -> Constrained<f64, UnitInterval> {
        Constrained {
            value: 1.0,
            _marker: PhantomData,
        }
    }

    /// Clamps `value` into `[0, 1]`, mapping `NaN` to zero.
    #[must_use]
    pub fn saturating(value: f64) -> Constrained<f64, UnitInterval> {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        Constrained {
            value,
            _marker: PhantomData,
        }
    }
}

impl Constraint<f64> for UnitInterval {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        match (value.partial_cmp(&0.0), value.partial_cmp(&1.0)) {
            (None, _) | (_, None) => Err(ConstraintError::NotANumber),
            (Some(Ordering::Less), _) => Err(ConstraintError::BelowMinimum),
            (_, Some(Ordering::Greater)) => Err(ConstraintError::AboveMaximum),
            _ => Ok(()),
        }
    }
}

impl Default for Constrained<f64, UnitInterval> {
    fn default() -> Self {
        UnitInterval::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::MassRate, mass_rate::kilogram_per_second};

    #[test]
    fn non_negative_flows() {
        let flow = NonNegative::new(MassRate::new::<kilogram_per_second>(0.2)).unwrap();
        assert!((flow.into_inner().get::<kilogram_per_second>() - 0.2).abs() < 1e-15);
        assert!(NonNegative::new(MassRate::new::<kilogram_per_second>(0.0)).is_ok());

        assert!(matches!(
            NonNegative::new(MassRate::new::<kilogram_per_second>(-1e-9)),
            Err(ConstraintError::Negative)
        ));
        assert!(NonNegative::zero::<f64>().into_inner() == 0.0);
    }

    #[test]
    fn unit_interval_bounds() {
        assert!(UnitInterval::new(0.0).is_ok());
        assert!(UnitInterval::new(1.0).is_ok());
        assert!(matches!(
            UnitInterval::new(-1e-15),
            Err(ConstraintError::BelowMinimum)
        ));
        assert!(matches!(
            UnitInterval::new(1.0 + 1e-15),
            Err(ConstraintError::AboveMaximum)
        ));
        assert!(matches!(
            UnitInterval::new(f64::NAN),
            Err(ConstraintError::NotANumber)
        ));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn unit_interval_saturates() {
        assert_eq!(UnitInterval::saturating(-3.0).into_inner(), 0.0);
        assert_eq!(UnitInterval::saturating(0.75).into_inner(), 0.75);
        assert_eq!(UnitInterval::saturating(f64::INFINITY).into_inner(), 1.0);
        assert_eq!(UnitInterval::saturating(f64::NAN).into_inner(), 0.0);
        assert_eq!(
            Constrained::<f64, UnitInterval>::default().into_inner(),
            0.0
        );
    }
}
