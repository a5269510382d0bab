use crate::boundary::Boundary;
use crate::core::scalar::{self, Scalar, NORM_EPS};
use crate::error::{Error, Result};

/// Convex polygon container in 2-D.
///
/// Vertices may be given in either winding; they are stored
/// counter-clockwise. Inside, the distance is the largest signed distance to
/// any edge line, which is exact for convex shapes. Outside, it is the
/// Euclidean distance to the nearest edge segment, so points in a vertex
/// region report their true distance to that vertex rather than the smaller
/// distance to an extended edge line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon<T: Scalar> {
    vertices: Vec<[T; 2]>,
    /// Outward unit normal of edge `i` (from vertex `i` to `i + 1`).
    normals: Vec<[T; 2]>,
}

impl<T: Scalar> ConvexPolygon<T> {
    /// Errors:
    /// - `Error::InvalidParam` for fewer than three vertices, non-finite
    ///   coordinates, zero area, or a non-convex outline.
    /// - `Error::MathError` for a zero-length edge.
    pub fn new(mut vertices: Vec<[T; 2]>) -> Result<Self> {
        let n = vertices.len();
        if n < 3 {
            return Err(Error::InvalidParam(format!(
                "polygon needs at least 3 vertices, got {}",
                n
            )));
        }
        if !vertices.iter().all(scalar::is_finite) {
            return Err(Error::InvalidParam("polygon vertices must be finite".into()));
        }

        let mut twice_area = T::zero();
        for i in 0..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            twice_area = twice_area + (a[0] * b[1] - b[0] * a[1]);
        }
        if !(twice_area.abs() > T::lit(NORM_EPS)) {
            return Err(Error::InvalidParam("polygon has zero area".into()));
        }
        if twice_area < T::zero() {
            vertices.reverse();
        }

        let mut normals = Vec::with_capacity(n);
        for i in 0..n {
            let edge = scalar::sub(&vertices[(i + 1) % n], &vertices[i]);
            let len = scalar::norm(&edge);
            if !(len > T::lit(NORM_EPS)) {
                return Err(Error::MathError(format!(
                    "degenerate polygon edge at vertex {}",
                    i
                )));
            }
            normals.push([edge[1] / len, -edge[0] / len]);
        }

        for i in 0..n {
            let e0 = scalar::sub(&vertices[(i + 1) % n], &vertices[i]);
            let e1 = scalar::sub(&vertices[(i + 2) % n], &vertices[(i + 1) % n]);
            let cross = e0[0] * e1[1] - e0[1] * e1[0];
            if cross < -T::lit(NORM_EPS) {
                return Err(Error::InvalidParam(format!(
                    "polygon is not convex at vertex {}",
                    (i + 1) % n
                )));
            }
        }

        Ok(Self { vertices, normals })
    }

    /// Axis-aligned rectangle `[min, max]`.
    pub fn rectangle(min: [T; 2], max: [T; 2]) -> Result<Self> {
        Self::new(vec![min, [max[0], min[1]], max, [min[0], max[1]]])
    }

    /// Regular `sides`-gon of circumradius `radius` about the origin.
    pub fn regular(sides: usize, radius: T) -> Result<Self> {
        if !radius.is_finite() || radius <= T::zero() {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        let step = T::lit(std::f64::consts::TAU / sides.max(1) as f64);
        let vertices = (0..sides)
            .map(|k| {
                let (s, c) = (step * T::lit(k as f64)).sin_cos();
                [radius * c, radius * s]
            })
            .collect();
        Self::new(vertices)
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[[T; 2]] {
        &self.vertices
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Largest signed edge-line distance and the edge achieving it.
    #[inline]
    fn max_edge_distance(&self, point: &[T; 2]) -> (T, usize) {
        let mut best = (T::neg_infinity(), 0);
        for (i, (v, n)) in self.vertices.iter().zip(self.normals.iter()).enumerate() {
            let d = scalar::dot(n, &scalar::sub(point, v));
            if d > best.0 {
                best = (d, i);
            }
        }
        best
    }

    /// Closest point on the outline and its distance.
    fn closest_on_outline(&self, point: &[T; 2]) -> ([T; 2], T) {
        let n = self.edge_count();
        let mut best = (self.vertices[0], T::infinity());
        for i in 0..n {
            let a = self.vertices[i];
            let ab = scalar::sub(&self.vertices[(i + 1) % n], &a);
            let ap = scalar::sub(point, &a);
            let t = (scalar::dot(&ap, &ab) / scalar::dot(&ab, &ab))
                .max(T::zero())
                .min(T::one());
            let mut c = a;
            scalar::axpy(&mut c, t, &ab);
            let dist = scalar::norm(&scalar::sub(point, &c));
            if dist < best.1 {
                best = (c, dist);
            }
        }
        best
    }
}

impl<T: Scalar> Boundary<T, 2> for ConvexPolygon<T> {
    fn signed_distance(&self, point: &[T; 2], _time: T) -> T {
        let (d, _) = self.max_edge_distance(point);
        if d <= T::zero() {
            return d;
        }
        self.closest_on_outline(point).1
    }

    fn surface_normal(&self, point: &[T; 2], _time: T) -> [T; 2] {
        let (d, edge) = self.max_edge_distance(point);
        let edge_normal = self.normals[edge];
        if d <= T::zero() {
            return edge_normal;
        }
        let (closest, _) = self.closest_on_outline(point);
        scalar::normalize_or(&scalar::sub(point, &closest), edge_normal)
    }
}
