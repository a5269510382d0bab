use crate::boundary::{Boundary, Collision};
use crate::core::scalar::{self, Scalar, NORM_EPS};
use crate::error::{Error, Result};

/// Swaps the valid and forbidden regions of the wrapped shape.
///
/// `d = -d_inner`, `n = -n_inner`. A container becomes a solid obstacle and
/// vice versa without duplicating geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverted<B> {
    pub inner: B,
}

impl<B> Inverted<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<T: Scalar, B: Boundary<T, D>, const D: usize> Boundary<T, D> for Inverted<B> {
    #[inline]
    fn signed_distance(&self, point: &[T; D], time: T) -> T {
        -self.inner.signed_distance(point, time)
    }

    #[inline]
    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D] {
        scalar::neg(&self.inner.surface_normal(point, time))
    }
}

/// Spins the wrapped shape about the origin at a constant angular velocity.
///
/// A query at time `t` is rotated by `-ω t` into the inner shape's frame and
/// the returned normal is rotated back by `+ω t`. In 2-D the rotation is
/// in-plane; in 3-D it is about `axis` (default `+z`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotating<T: Scalar, B> {
    pub inner: B,
    pub angular_velocity: T,
    axis: [T; 3],
}

impl<T: Scalar, B> Rotating<T, B> {
    /// Rotation about `+z` (the in-plane rotation in 2-D).
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `angular_velocity` is not finite.
    pub fn new(inner: B, angular_velocity: T) -> Result<Self> {
        if !angular_velocity.is_finite() {
            return Err(Error::InvalidParam(
                "angular_velocity must be finite".into(),
            ));
        }
        Ok(Self {
            inner,
            angular_velocity,
            axis: [T::zero(), T::zero(), T::one()],
        })
    }

    pub fn axis(&self) -> [T; 3] {
        self.axis
    }

    #[inline]
    fn angle(&self, time: T) -> T {
        self.angular_velocity * time
    }
}

impl<T: Scalar, B: Boundary<T, 3>> Rotating<T, B> {
    /// Rotation about an arbitrary axis through the origin. Only 3-D shapes
    /// accept an axis:
    ///
    /// ```compile_fail
    /// use ccdsim::{Rotating, Sphere};
    ///
    /// let circle = Sphere::<f64, 2>::at_origin(1.0).unwrap();
    /// let _ = Rotating::about_axis(circle, 1.0, [0.0, 0.0, 1.0]);
    /// ```
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the axis is zero or not finite, or
    ///   `angular_velocity` is not finite.
    pub fn about_axis(inner: B, angular_velocity: T, axis: [T; 3]) -> Result<Self> {
        if !scalar::is_finite(&axis) || !(scalar::norm(&axis) > T::lit(NORM_EPS)) {
            return Err(Error::InvalidParam(
                "rotation axis must be finite and non-zero".into(),
            ));
        }
        let mut rotating = Self::new(inner, angular_velocity)?;
        rotating.axis = scalar::normalize_or(&axis, rotating.axis);
        Ok(rotating)
    }
}

impl<T: Scalar, B: Boundary<T, D>, const D: usize> Boundary<T, D> for Rotating<T, B> {
    #[inline]
    fn signed_distance(&self, point: &[T; D], time: T) -> T {
        let local = scalar::rotate(point, -self.angle(time), &self.axis);
        self.inner.signed_distance(&local, time)
    }

    #[inline]
    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D] {
        let angle = self.angle(time);
        let local = scalar::rotate(point, -angle, &self.axis);
        let n = self.inner.surface_normal(&local, time);
        scalar::rotate(&n, angle, &self.axis)
    }

    fn detect_collision(&self, point: &[T; D], time: T) -> Collision<T, D> {
        // Rotate the query once and reuse it for both inner queries.
        let angle = self.angle(time);
        let local = scalar::rotate(point, -angle, &self.axis);
        let hit = self.inner.detect_collision(&local, time);
        if !hit.collided {
            return hit;
        }
        Collision {
            normal: scalar::rotate(&hit.normal, angle, &self.axis),
            ..hit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::test_util::assert_normal_matches_gradient;
    use crate::boundary::{AxisAlignedBox, Sphere};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn inverted_sphere_is_obstacle() -> Result<()> {
        let obstacle = Inverted::new(Sphere::<f64, 2>::at_origin(1.0)?);
        assert!(obstacle.signed_distance(&[0.0, 0.0], 0.0) > 0.0);
        assert!(obstacle.signed_distance(&[3.0, 0.0], 0.0) < 0.0);
        let hit = obstacle.detect_collision(&[0.5, 0.0], 0.0);
        assert!(hit.collided);
        assert!((hit.depth - 0.5).abs() < 1e-12);
        // The normal points into the obstacle; resolving along -n moves the point out.
        assert_eq!(hit.normal, [-1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn double_inversion_is_identity() -> Result<()> {
        let b = AxisAlignedBox::<f64, 3>::cube(1.0)?;
        let twice = Inverted::new(Inverted::new(b));
        for p in [[0.2, 0.3, -0.4], [2.0, 0.0, 0.5]] {
            assert_eq!(twice.signed_distance(&p, 0.0), b.signed_distance(&p, 0.0));
            assert_eq!(twice.surface_normal(&p, 0.0), b.surface_normal(&p, 0.0));
        }
        Ok(())
    }

    #[test]
    fn rotating_box_quarter_turn() -> Result<()> {
        // 2x1 box rotating at pi/2 rad/s: at t = 1 its long axis lies along y.
        let b = AxisAlignedBox::<f64, 2>::at_origin([2.0, 1.0])?;
        let spin = Rotating::new(b, FRAC_PI_2)?;
        assert!(spin.signed_distance(&[0.0, 1.5], 0.0) > 0.0);
        assert!(spin.signed_distance(&[0.0, 1.5], 1.0) < 0.0);
        let n = spin.surface_normal(&[0.0, 1.9], 1.0);
        assert!(n[0].abs() < 1e-9 && (n[1] - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn rotating_detect_matches_default() -> Result<()> {
        let b = AxisAlignedBox::<f64, 3>::at_origin([2.0, 1.0, 0.5])?;
        let spin = Rotating::new(b, 0.8)?;
        let p = [1.2, 1.4, 0.1];
        let t = 0.6;
        let hit = spin.detect_collision(&p, t);
        let d = spin.signed_distance(&p, t);
        assert_eq!(hit.collided, d > 0.0);
        if hit.collided {
            assert_eq!(hit.depth, d);
            assert_eq!(hit.normal, spin.surface_normal(&p, t));
        }
        Ok(())
    }

    #[test]
    fn rotating_normal_matches_gradient() -> Result<()> {
        let e = Sphere::new([1.0, 0.0, 0.0], 1.0)?;
        let spin = Rotating::about_axis(e, 1.3, [1.0, 1.0, 0.0])?;
        // Surface point of the inner sphere rotated into the world frame at t = 0.4
        let t = 0.4;
        let local = [1.0, 0.0, 0.99];
        let world = scalar::rotate(&local, 1.3 * t, &spin.axis());
        assert_normal_matches_gradient(&spin, world, t, 1e-4);
        Ok(())
    }

    #[test]
    fn axis_is_normalized_and_validated() -> Result<()> {
        let s = Sphere::<f64, 3>::at_origin(1.0)?;
        let spin = Rotating::about_axis(s, 1.0, [0.0, 3.0, 4.0])?;
        assert!((spin.axis()[1] - 0.6).abs() < 1e-12 && (spin.axis()[2] - 0.8).abs() < 1e-12);
        let err = Rotating::about_axis(s, 1.0, [0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
        Ok(())
    }
}
