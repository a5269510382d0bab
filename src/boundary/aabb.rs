use crate::boundary::Boundary;
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};

/// Axis-aligned box container with half-extents `h` about `center`.
///
/// With `q_i = |p_i| - h_i` the distance is `|max(q, 0)| + min(max_i q_i, 0)`,
/// which is exact both inside and outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedBox<T: Scalar, const D: usize> {
    pub center: [T; D],
    pub half_extents: [T; D],
}

impl<T: Scalar, const D: usize> AxisAlignedBox<T, D> {
    /// Errors:
    /// - `Error::InvalidParam` if any half-extent is not finite and positive.
    pub fn new(center: [T; D], half_extents: [T; D]) -> Result<Self> {
        if !half_extents.iter().all(|&h| h.is_finite() && h > T::zero()) {
            return Err(Error::InvalidParam(
                "half_extents components must be finite and > 0".into(),
            ));
        }
        if !scalar::is_finite(&center) {
            return Err(Error::InvalidParam("box center must be finite".into()));
        }
        Ok(Self {
            center,
            half_extents,
        })
    }

    pub fn at_origin(half_extents: [T; D]) -> Result<Self> {
        Self::new(scalar::zero(), half_extents)
    }

    /// Cube with the same half-extent on every axis.
    pub fn cube(half_extent: T) -> Result<Self> {
        Self::at_origin([half_extent; D])
    }

    /// Local offset and per-axis excess `q`.
    #[inline]
    fn excess(&self, point: &[T; D]) -> ([T; D], [T; D]) {
        let local = scalar::sub(point, &self.center);
        let mut q = [T::zero(); D];
        for ((qk, &lk), &hk) in q.iter_mut().zip(local.iter()).zip(self.half_extents.iter()) {
            *qk = lk.abs() - hk;
        }
        (local, q)
    }
}

#[inline]
fn sign_or_positive<T: Scalar>(x: T) -> T {
    if x < T::zero() {
        -T::one()
    } else {
        T::one()
    }
}

impl<T: Scalar, const D: usize> Boundary<T, D> for AxisAlignedBox<T, D> {
    fn signed_distance(&self, point: &[T; D], _time: T) -> T {
        let (_, q) = self.excess(point);
        let mut outside_sq = T::zero();
        let mut max_q = T::neg_infinity();
        for &qk in &q {
            let pos = qk.max(T::zero());
            outside_sq = outside_sq + pos * pos;
            max_q = max_q.max(qk);
        }
        outside_sq.sqrt() + max_q.min(T::zero())
    }

    fn surface_normal(&self, point: &[T; D], _time: T) -> [T; D] {
        let (local, q) = self.excess(point);

        if q.iter().any(|&qk| qk > T::zero()) {
            let mut n = [T::zero(); D];
            for ((nk, &lk), &qk) in n.iter_mut().zip(local.iter()).zip(q.iter()) {
                *nk = sign_or_positive(lk) * qk.max(T::zero());
            }
            return scalar::normalize_or(&n, scalar::unit_axis(0, T::one()));
        }

        // Inside: the face with the least-negative excess is nearest.
        let mut axis = 0;
        for (k, &qk) in q.iter().enumerate() {
            if qk > q[axis] {
                axis = k;
            }
        }
        scalar::unit_axis(axis, sign_or_positive(local[axis]))
    }
}
