use crate::boundary::Boundary;
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};

/// Spherical (3-D) or circular (2-D) container.
///
/// `d = |p - c| - r`. At the center the normal falls back to `+x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere<T: Scalar, const D: usize> {
    pub center: [T; D],
    pub radius: T,
}

impl<T: Scalar, const D: usize> Sphere<T, D> {
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is not finite and positive or the
    ///   center is not finite.
    pub fn new(center: [T; D], radius: T) -> Result<Self> {
        if !radius.is_finite() || radius <= T::zero() {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !scalar::is_finite(&center) {
            return Err(Error::InvalidParam("sphere center must be finite".into()));
        }
        Ok(Self { center, radius })
    }

    pub fn at_origin(radius: T) -> Result<Self> {
        Self::new(scalar::zero(), radius)
    }
}

impl<T: Scalar, const D: usize> Boundary<T, D> for Sphere<T, D> {
    #[inline]
    fn signed_distance(&self, point: &[T; D], _time: T) -> T {
        scalar::norm(&scalar::sub(point, &self.center)) - self.radius
    }

    #[inline]
    fn surface_normal(&self, point: &[T; D], _time: T) -> [T; D] {
        let local = scalar::sub(point, &self.center);
        scalar::normalize_or(&local, scalar::unit_axis(0, T::one()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::test_util::assert_normal_matches_gradient;

    #[test]
    fn circle_distance_sign() -> Result<()> {
        let c = Sphere::<f64, 2>::at_origin(2.0)?;
        assert!((c.signed_distance(&[0.0, 0.0], 0.0) + 2.0).abs() < 1e-12);
        assert!((c.signed_distance(&[3.0, 4.0], 0.0) - 3.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn offset_center() -> Result<()> {
        let s = Sphere::new([1.0, 1.0, 1.0], 1.0)?;
        assert!(s.signed_distance(&[1.0, 1.0, 1.5], 0.0) < 0.0);
        assert!(s.signed_distance(&[0.0, 0.0, 0.0], 0.0) > 0.0);
        Ok(())
    }

    #[test]
    fn normal_fallback_at_center() -> Result<()> {
        let s = Sphere::<f64, 3>::at_origin(1.0)?;
        let n = s.surface_normal(&[0.0, 0.0, 0.0], 0.0);
        assert_eq!(n, [1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn normal_matches_gradient_near_surface() -> Result<()> {
        let s = Sphere::<f64, 3>::at_origin(1.5)?;
        let dir = scalar::normalize_or(&[0.3, -0.8, 0.5], [1.0, 0.0, 0.0]);
        for r in [1.49, 1.51] {
            assert_normal_matches_gradient(&s, scalar::scale(&dir, r), 0.0, 1e-4);
        }
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Sphere::<f64, 2>::at_origin(-1.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }
}
