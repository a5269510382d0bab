//! Floating-point abstraction and small fixed-size vector helpers.
//!
//! Vectors are plain `[T; D]` arrays so particle columns stay contiguous and
//! `Copy`. All helpers are `#[inline]` and allocation-free.

use num_traits::Float;
use std::fmt::Debug;

/// Numeric precision of a simulation (`f32` or `f64`).
pub trait Scalar: Float + Debug + Send + Sync + 'static {
    /// Convert an `f64` literal into this precision.
    fn lit(v: f64) -> Self;

    /// Widen to `f64` (diagnostics, Python export).
    fn as_f64(self) -> f64;
}

impl Scalar for f32 {
    #[inline]
    fn lit(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    #[inline]
    fn lit(v: f64) -> Self {
        v
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Lengths below this are treated as zero when normalizing.
pub const NORM_EPS: f64 = 1e-12;

#[inline]
pub fn zero<T: Scalar, const D: usize>() -> [T; D] {
    [T::zero(); D]
}

/// Unit vector along axis `k`, multiplied by `sign`.
#[inline]
pub fn unit_axis<T: Scalar, const D: usize>(k: usize, sign: T) -> [T; D] {
    let mut out = [T::zero(); D];
    if let Some(c) = out.get_mut(k) {
        *c = sign;
    }
    out
}

#[inline]
pub fn dot<T: Scalar, const D: usize>(a: &[T; D], b: &[T; D]) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

#[inline]
pub fn norm<T: Scalar, const D: usize>(a: &[T; D]) -> T {
    dot(a, a).sqrt()
}

#[inline]
pub fn sub<T: Scalar, const D: usize>(a: &[T; D], b: &[T; D]) -> [T; D] {
    let mut out = *a;
    for (o, &y) in out.iter_mut().zip(b.iter()) {
        *o = *o - y;
    }
    out
}

#[inline]
pub fn add<T: Scalar, const D: usize>(a: &[T; D], b: &[T; D]) -> [T; D] {
    let mut out = *a;
    for (o, &y) in out.iter_mut().zip(b.iter()) {
        *o = *o + y;
    }
    out
}

#[inline]
pub fn scale<T: Scalar, const D: usize>(a: &[T; D], s: T) -> [T; D] {
    let mut out = *a;
    for o in &mut out {
        *o = *o * s;
    }
    out
}

#[inline]
pub fn neg<T: Scalar, const D: usize>(a: &[T; D]) -> [T; D] {
    let mut out = *a;
    for o in &mut out {
        *o = -*o;
    }
    out
}

/// `y += alpha * x`
#[inline]
pub fn axpy<T: Scalar, const D: usize>(y: &mut [T; D], alpha: T, x: &[T; D]) {
    for (yk, &xk) in y.iter_mut().zip(x.iter()) {
        *yk = *yk + alpha * xk;
    }
}

/// Normalize `a`, returning `fallback` when `|a|` is below [`NORM_EPS`].
#[inline]
pub fn normalize_or<T: Scalar, const D: usize>(a: &[T; D], fallback: [T; D]) -> [T; D] {
    let n = norm(a);
    if !(n > T::lit(NORM_EPS)) {
        return fallback;
    }
    scale(a, T::one() / n)
}

#[inline]
pub fn is_finite<T: Scalar, const D: usize>(a: &[T; D]) -> bool {
    a.iter().all(|x| x.is_finite())
}

/// Rotate `p` by `angle` radians.
///
/// In 2-D this is the counter-clockwise in-plane rotation and `axis` is
/// ignored. In 3-D the rotation is about the unit vector `axis` (Rodrigues).
/// Other dimensions are returned unchanged.
#[inline]
pub fn rotate<T: Scalar, const D: usize>(p: &[T; D], angle: T, axis: &[T; 3]) -> [T; D] {
    let (s, c) = angle.sin_cos();
    let mut out = *p;
    match (p.as_slice(), out.as_mut_slice()) {
        ([x, y], [ox, oy]) => {
            *ox = c * *x - s * *y;
            *oy = s * *x + c * *y;
        }
        ([x, y, z], [ox, oy, oz]) => {
            let [kx, ky, kz] = *axis;
            let k_dot_v = kx * *x + ky * *y + kz * *z;
            let cross = [ky * *z - kz * *y, kz * *x - kx * *z, kx * *y - ky * *x];
            let w = (T::one() - c) * k_dot_v;
            *ox = *x * c + cross[0] * s + kx * w;
            *oy = *y * c + cross[1] * s + ky * w;
            *oz = *z * c + cross[2] * s + kz * w;
        }
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn normalize_falls_back_on_zero() {
        let fallback = unit_axis::<f64, 3>(1, 1.0);
        assert_eq!(normalize_or(&[0.0, 0.0, 0.0], fallback), fallback);
        let n = normalize_or(&[3.0, 4.0, 0.0], fallback);
        assert!((n[0] - 0.6).abs() < 1e-12 && (n[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rotate_2d_quarter_turn() {
        let r = rotate(&[1.0_f64, 0.0], FRAC_PI_2, &[0.0, 0.0, 1.0]);
        assert!(r[0].abs() < 1e-12);
        assert!((r[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_3d_about_z_matches_2d() {
        let r3 = rotate(&[1.0_f64, 2.0, 5.0], 0.7, &[0.0, 0.0, 1.0]);
        let r2 = rotate(&[1.0_f64, 2.0], 0.7, &[0.0, 0.0, 1.0]);
        assert!((r3[0] - r2[0]).abs() < 1e-12);
        assert!((r3[1] - r2[1]).abs() < 1e-12);
        assert!((r3[2] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_preserves_length() {
        let axis = normalize_or(&[1.0_f64, 1.0, 1.0], [0.0, 0.0, 1.0]);
        let p = [0.3, -1.2, 2.5];
        let r = rotate(&p, 2.1, &axis);
        assert!((norm(&r) - norm(&p)).abs() < 1e-12);
    }

    #[test]
    fn axpy_accumulates() {
        let mut y = [1.0_f32, 2.0];
        axpy(&mut y, 2.0, &[0.5, -1.0]);
        assert_eq!(y, [2.0, 0.0]);
    }
}
