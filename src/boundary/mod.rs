//! Signed-distance boundaries.
//!
//! Every shape reports a signed distance that is negative in its *valid*
//! region and positive in the *forbidden* region, plus the outward surface
//! normal (the gradient direction of the distance). A plain shape is a
//! container (valid = interior); wrapping it in [`Inverted`] turns it into a
//! solid obstacle. Time-dependent shapes take the query time as an argument
//! and hold no mutable state, so a boundary can be shared across workers.

pub mod aabb;
pub mod ellipsoid;
pub mod polygon;
pub mod shape;
pub mod sphere;
pub mod wrappers;

pub use aabb::AxisAlignedBox;
pub use ellipsoid::Ellipsoid;
pub use polygon::ConvexPolygon;
pub use shape::{PlanarPolygon, Shape};
pub use sphere::Sphere;
pub use wrappers::{Inverted, Rotating};

use crate::core::scalar::{self, Scalar};

/// Result of a point-vs-boundary collision query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision<T: Scalar, const D: usize> {
    /// Whether the point lies in the forbidden region.
    pub collided: bool,
    /// Penetration depth (> 0 when collided, 0 otherwise).
    pub depth: T,
    /// Outward surface normal when collided, zero vector otherwise.
    pub normal: [T; D],
}

impl<T: Scalar, const D: usize> Collision<T, D> {
    #[inline]
    pub fn none() -> Self {
        Self {
            collided: false,
            depth: T::zero(),
            normal: scalar::zero(),
        }
    }
}

/// A geometric boundary queried by position and time.
///
/// Implementors provide `signed_distance` and `surface_normal`;
/// `detect_collision` is derived from them and may be overridden only with a
/// behaviorally identical version.
pub trait Boundary<T: Scalar, const D: usize>: Sync {
    /// Signed distance from `point` to the surface at `time`: negative in the
    /// valid region, positive in the forbidden region.
    fn signed_distance(&self, point: &[T; D], time: T) -> T;

    /// Unit outward normal at `point` and `time`. Must return a finite unit
    /// vector everywhere, including at singular points.
    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D];

    #[inline]
    fn detect_collision(&self, point: &[T; D], time: T) -> Collision<T, D> {
        let d = self.signed_distance(point, time);
        if d > T::zero() {
            Collision {
                collided: true,
                depth: d,
                normal: self.surface_normal(point, time),
            }
        } else {
            Collision::none()
        }
    }
}

impl<T: Scalar, B: Boundary<T, D> + ?Sized, const D: usize> Boundary<T, D> for Box<B> {
    #[inline]
    fn signed_distance(&self, point: &[T; D], time: T) -> T {
        (**self).signed_distance(point, time)
    }

    #[inline]
    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D] {
        (**self).surface_normal(point, time)
    }

    #[inline]
    fn detect_collision(&self, point: &[T; D], time: T) -> Collision<T, D> {
        (**self).detect_collision(point, time)
    }
}

impl<T: Scalar, B: Boundary<T, D> + ?Sized, const D: usize> Boundary<T, D> for &B {
    #[inline]
    fn signed_distance(&self, point: &[T; D], time: T) -> T {
        (**self).signed_distance(point, time)
    }

    #[inline]
    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D] {
        (**self).surface_normal(point, time)
    }

    #[inline]
    fn detect_collision(&self, point: &[T; D], time: T) -> Collision<T, D> {
        (**self).detect_collision(point, time)
    }
}

/// Central-difference gradient of `signed_distance`, normalized.
///
/// Useful for validating a shape's analytic `surface_normal`. Returns the
/// zero vector where the gradient vanishes.
pub fn numerical_normal<T, B, const D: usize>(boundary: &B, point: &[T; D], time: T, h: T) -> [T; D]
where
    T: Scalar,
    B: Boundary<T, D> + ?Sized,
{
    let two_h = h + h;
    let mut grad = [T::zero(); D];
    for (k, g) in grad.iter_mut().enumerate() {
        let mut plus = *point;
        let mut minus = *point;
        plus[k] = plus[k] + h;
        minus[k] = minus[k] - h;
        *g = (boundary.signed_distance(&plus, time) - boundary.signed_distance(&minus, time))
            / two_h;
    }
    scalar::normalize_or(&grad, scalar::zero())
}
