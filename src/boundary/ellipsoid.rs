use crate::boundary::Boundary;
use crate::core::scalar::{self, Scalar, NORM_EPS};
use crate::error::{Error, Result};

/// Axis-aligned ellipsoid (3-D) or ellipse (2-D) container.
///
/// The distance is the first-order approximation `k0 (k0 - 1) / k1` with
/// `k0 = |p / r|` and `k1 = |p / r^2|`. It has the correct sign everywhere,
/// is exact on the surface and for equal radii, and overestimates
/// moderately far from the surface of strongly eccentric shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid<T: Scalar, const D: usize> {
    pub center: [T; D],
    pub radii: [T; D],
}

impl<T: Scalar, const D: usize> Ellipsoid<T, D> {
    /// Errors:
    /// - `Error::InvalidParam` if any semi-axis is not finite and positive.
    pub fn new(center: [T; D], radii: [T; D]) -> Result<Self> {
        if !radii.iter().all(|&r| r.is_finite() && r > T::zero()) {
            return Err(Error::InvalidParam(
                "ellipsoid radii must be finite and > 0".into(),
            ));
        }
        if !scalar::is_finite(&center) {
            return Err(Error::InvalidParam("ellipsoid center must be finite".into()));
        }
        Ok(Self { center, radii })
    }

    pub fn at_origin(radii: [T; D]) -> Result<Self> {
        Self::new(scalar::zero(), radii)
    }

    fn min_axis(&self) -> usize {
        let mut k = 0;
        for (i, &r) in self.radii.iter().enumerate() {
            if r < self.radii[k] {
                k = i;
            }
        }
        k
    }

    /// Returns `(p/r, p/r^2)` for the local offset `p`.
    #[inline]
    fn scaled(&self, point: &[T; D]) -> ([T; D], [T; D]) {
        let local = scalar::sub(point, &self.center);
        let mut by_r = [T::zero(); D];
        let mut by_r2 = [T::zero(); D];
        for (k, (&lk, &rk)) in local.iter().zip(self.radii.iter()).enumerate() {
            by_r[k] = lk / rk;
            by_r2[k] = lk / (rk * rk);
        }
        (by_r, by_r2)
    }
}

impl<T: Scalar, const D: usize> Boundary<T, D> for Ellipsoid<T, D> {
    fn signed_distance(&self, point: &[T; D], _time: T) -> T {
        let (by_r, by_r2) = self.scaled(point);
        let k1 = scalar::norm(&by_r2);
        if !(k1 > T::lit(NORM_EPS)) {
            // At the center the nearest surface point lies on the shortest axis.
            return -self.radii[self.min_axis()];
        }
        let k0 = scalar::norm(&by_r);
        k0 * (k0 - T::one()) / k1
    }

    fn surface_normal(&self, point: &[T; D], _time: T) -> [T; D] {
        let (_, by_r2) = self.scaled(point);
        scalar::normalize_or(&by_r2, scalar::unit_axis(self.min_axis(), T::one()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::test_util::assert_normal_matches_gradient;

    #[test]
    fn equal_radii_reduce_to_sphere() -> Result<()> {
        let e = Ellipsoid::<f64, 3>::at_origin([2.0, 2.0, 2.0])?;
        assert!((e.signed_distance(&[0.0, 3.0, 0.0], 0.0) - 1.0).abs() < 1e-12);
        assert!((e.signed_distance(&[0.0, 0.0, 1.0], 0.0) + 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn sign_and_surface_exactness() -> Result<()> {
        let e = Ellipsoid::<f64, 2>::at_origin([3.0, 1.0])?;
        assert!(e.signed_distance(&[0.0, 0.0], 0.0) < 0.0);
        assert!(e.signed_distance(&[10.0, 0.0], 0.0) > 0.0);
        assert!(e.signed_distance(&[3.0, 0.0], 0.0).abs() < 1e-12);
        assert!(e.signed_distance(&[0.0, 1.0], 0.0).abs() < 1e-12);
        // Along a principal axis the approximation is exact.
        assert!((e.signed_distance(&[0.0, 1.5], 0.0) - 0.5).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn center_fallbacks_are_finite() -> Result<()> {
        let e = Ellipsoid::<f64, 3>::at_origin([3.0, 1.0, 2.0])?;
        assert_eq!(e.signed_distance(&[0.0, 0.0, 0.0], 0.0), -1.0);
        assert_eq!(e.surface_normal(&[0.0, 0.0, 0.0], 0.0), [0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn normal_matches_gradient_near_surface() -> Result<()> {
        let e = Ellipsoid::<f64, 3>::at_origin([3.0, 1.0, 2.0])?;
        // Points just inside and outside the surface point (3 cos a, sin a cos b, ...)
        let s = [3.0 * 0.6, 1.0 * 0.8 * 0.6, 2.0 * 0.8 * 0.8];
        for f in [0.999, 1.001] {
            assert_normal_matches_gradient(&e, scalar::scale(&s, f), 0.0, 1e-2);
        }
        Ok(())
    }
}
