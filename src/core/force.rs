//! External force fields.
//!
//! A force field is any pure value callable as
//! `(position, velocity, mass, time) -> force`. Closures qualify through the
//! blanket impl; the structs below cover the common cases. Solvers always
//! divide the returned force by the particle mass.

use crate::core::scalar::{self, Scalar};

/// A pure force field evaluated per particle.
pub trait ForceField<T: Scalar, const D: usize>: Sync {
    fn force(&self, position: &[T; D], velocity: &[T; D], mass: T, time: T) -> [T; D];
}

impl<T, F, const D: usize> ForceField<T, D> for F
where
    T: Scalar,
    F: Fn(&[T; D], &[T; D], T, T) -> [T; D] + Sync,
{
    #[inline]
    fn force(&self, position: &[T; D], velocity: &[T; D], mass: T, time: T) -> [T; D] {
        self(position, velocity, mass, time)
    }
}

/// No external force.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZeroField;

impl<T: Scalar, const D: usize> ForceField<T, D> for ZeroField {
    #[inline]
    fn force(&self, _position: &[T; D], _velocity: &[T; D], _mass: T, _time: T) -> [T; D] {
        scalar::zero()
    }
}

/// The same force on every particle; heavier particles accelerate less.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantForce<T: Scalar, const D: usize> {
    pub force: [T; D],
}

impl<T: Scalar, const D: usize> ForceField<T, D> for ConstantForce<T, D> {
    #[inline]
    fn force(&self, _position: &[T; D], _velocity: &[T; D], _mass: T, _time: T) -> [T; D] {
        self.force
    }
}

/// Force proportional to mass, so every particle gets the same acceleration
/// (e.g. gravity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformAcceleration<T: Scalar, const D: usize> {
    pub acceleration: [T; D],
}

impl<T: Scalar, const D: usize> ForceField<T, D> for UniformAcceleration<T, D> {
    #[inline]
    fn force(&self, _position: &[T; D], _velocity: &[T; D], mass: T, _time: T) -> [T; D] {
        scalar::scale(&self.acceleration, mass)
    }
}

/// Linear drag `-c v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDrag<T: Scalar> {
    pub coefficient: T,
}

impl<T: Scalar, const D: usize> ForceField<T, D> for LinearDrag<T> {
    #[inline]
    fn force(&self, _position: &[T; D], velocity: &[T; D], _mass: T, _time: T) -> [T; D] {
        scalar::scale(velocity, -self.coefficient)
    }
}

/// Hookean pull toward `center`: `-k (p - c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSpring<T: Scalar, const D: usize> {
    pub center: [T; D],
    pub stiffness: T,
}

impl<T: Scalar, const D: usize> ForceField<T, D> for RadialSpring<T, D> {
    #[inline]
    fn force(&self, position: &[T; D], _velocity: &[T; D], _mass: T, _time: T) -> [T; D] {
        scalar::scale(&scalar::sub(position, &self.center), -self.stiffness)
    }
}

/// Sum of two fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Superposition<A, B>(pub A, pub B);

impl<T, A, B, const D: usize> ForceField<T, D> for Superposition<A, B>
where
    T: Scalar,
    A: ForceField<T, D>,
    B: ForceField<T, D>,
{
    #[inline]
    fn force(&self, position: &[T; D], velocity: &[T; D], mass: T, time: T) -> [T; D] {
        let a = self.0.force(position, velocity, mass, time);
        let b = self.1.force(position, velocity, mass, time);
        scalar::add(&a, &b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval<F: ForceField<f64, 2>>(f: &F, mass: f64) -> [f64; 2] {
        f.force(&[1.0, 2.0], &[3.0, -1.0], mass, 0.0)
    }

    #[test]
    fn closures_are_force_fields() {
        let wind = |_p: &[f64; 2], _v: &[f64; 2], _m: f64, t: f64| [t + 1.0, 0.0];
        assert_eq!(eval(&wind, 1.0), [1.0, 0.0]);
    }

    #[test]
    fn uniform_acceleration_scales_with_mass() {
        let g = UniformAcceleration {
            acceleration: [0.0, -9.81],
        };
        assert_eq!(eval(&g, 2.0), [0.0, -19.62]);
        let c = ConstantForce { force: [0.0, -9.81] };
        assert_eq!(eval(&c, 2.0), [0.0, -9.81]);
    }

    #[test]
    fn drag_spring_and_sum() {
        let drag = LinearDrag { coefficient: 0.5 };
        assert_eq!(eval(&drag, 1.0), [-1.5, 0.5]);
        let spring = RadialSpring {
            center: [0.0, 0.0],
            stiffness: 2.0,
        };
        assert_eq!(eval(&spring, 1.0), [-2.0, -4.0]);
        assert_eq!(eval(&Superposition(drag, spring), 1.0), [-3.5, -3.5]);
        assert_eq!(eval(&Superposition(ZeroField, ZeroField), 1.0), [0.0, 0.0]);
    }
}
