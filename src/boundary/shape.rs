use crate::boundary::{
    AxisAlignedBox, Boundary, Collision, ConvexPolygon, Ellipsoid, Inverted, Rotating, Sphere,
};
use crate::core::scalar::Scalar;
use crate::error::{Error, Result};

/// Closed set of boundary shapes, dispatched by `match`.
///
/// Use this when the boundary is chosen at runtime (configuration, Python);
/// the individual shape types can be used directly when the geometry is known
/// at compile time. Wrappers own their inner shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<T: Scalar, const D: usize> {
    Sphere(Sphere<T, D>),
    Aabb(AxisAlignedBox<T, D>),
    Ellipsoid(Ellipsoid<T, D>),
    Polygon(PlanarPolygon<T, D>),
    Inverted(Inverted<Box<Shape<T, D>>>),
    Rotating(Rotating<T, Box<Shape<T, D>>>),
}

impl<T: Scalar, const D: usize> Shape<T, D> {
    pub fn sphere(radius: T) -> Result<Self> {
        Ok(Self::Sphere(Sphere::at_origin(radius)?))
    }

    pub fn aabb(half_extents: [T; D]) -> Result<Self> {
        Ok(Self::Aabb(AxisAlignedBox::at_origin(half_extents)?))
    }

    pub fn ellipsoid(radii: [T; D]) -> Result<Self> {
        Ok(Self::Ellipsoid(Ellipsoid::at_origin(radii)?))
    }

    /// Errors:
    /// - `Error::Unsupported` unless `D == 2`.
    /// - Any error from [`ConvexPolygon::new`].
    pub fn polygon(vertices: Vec<[T; 2]>) -> Result<Self> {
        Self::from_polygon(ConvexPolygon::new(vertices)?)
    }

    /// Errors:
    /// - `Error::Unsupported` unless `D == 2`.
    pub fn from_polygon(polygon: ConvexPolygon<T>) -> Result<Self> {
        if D != 2 {
            return Err(Error::Unsupported("convex polygon boundaries are 2-D only"));
        }
        Ok(Self::Polygon(PlanarPolygon { polygon }))
    }

    /// Swap valid and forbidden regions (container ↔ obstacle).
    pub fn inverted(self) -> Self {
        Self::Inverted(Inverted::new(Box::new(self)))
    }

    /// Spin about `+z` (in-plane in 2-D).
    pub fn rotating(self, angular_velocity: T) -> Result<Self> {
        Ok(Self::Rotating(Rotating::new(
            Box::new(self),
            angular_velocity,
        )?))
    }
}

impl<T: Scalar> Shape<T, 3> {
    /// Spin about an arbitrary axis through the origin.
    pub fn rotating_about(self, angular_velocity: T, axis: [T; 3]) -> Result<Self> {
        Ok(Self::Rotating(Rotating::about_axis(
            Box::new(self),
            angular_velocity,
            axis,
        )?))
    }
}

/// A convex polygon held by [`Shape::Polygon`].
///
/// Built only through [`Shape::polygon`] or [`Shape::from_polygon`], which
/// reject every dimension but 2.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPolygon<T: Scalar, const D: usize> {
    polygon: ConvexPolygon<T>,
}

impl<T: Scalar, const D: usize> PlanarPolygon<T, D> {
    pub fn polygon(&self) -> &ConvexPolygon<T> {
        &self.polygon
    }
}

#[inline]
fn to_plane<T: Scalar, const D: usize>(p: &[T; D]) -> [T; 2] {
    let mut out = [T::zero(); 2];
    for (o, &x) in out.iter_mut().zip(p.iter()) {
        *o = x;
    }
    out
}

#[inline]
fn from_plane<T: Scalar, const D: usize>(p: &[T; 2]) -> [T; D] {
    let mut out = [T::zero(); D];
    for (o, &x) in out.iter_mut().zip(p.iter()) {
        *o = x;
    }
    out
}

impl<T: Scalar, const D: usize> Boundary<T, D> for Shape<T, D> {
    fn signed_distance(&self, point: &[T; D], time: T) -> T {
        match self {
            Self::Sphere(s) => s.signed_distance(point, time),
            Self::Aabb(b) => b.signed_distance(point, time),
            Self::Ellipsoid(e) => e.signed_distance(point, time),
            Self::Polygon(poly) => poly.polygon.signed_distance(&to_plane(point), time),
            Self::Inverted(inv) => inv.signed_distance(point, time),
            Self::Rotating(rot) => rot.signed_distance(point, time),
        }
    }

    fn surface_normal(&self, point: &[T; D], time: T) -> [T; D] {
        match self {
            Self::Sphere(s) => s.surface_normal(point, time),
            Self::Aabb(b) => b.surface_normal(point, time),
            Self::Ellipsoid(e) => e.surface_normal(point, time),
            Self::Polygon(poly) => {
                from_plane(&poly.polygon.surface_normal(&to_plane(point), time))
            }
            Self::Inverted(inv) => inv.surface_normal(point, time),
            Self::Rotating(rot) => rot.surface_normal(point, time),
        }
    }

    fn detect_collision(&self, point: &[T; D], time: T) -> Collision<T, D> {
        match self {
            Self::Rotating(rot) => rot.detect_collision(point, time),
            _ => {
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
    }
}
