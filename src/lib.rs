//! Collision-aware integration of large particle populations inside
//! signed-distance boundaries.
//!
//! The crate provides:
//! - [`ParticleState`]: structure-of-arrays particle columns in 2-D or 3-D,
//!   `f32` or `f64`.
//! - [`Boundary`]: signed distance + surface normal, with spheres, boxes,
//!   ellipsoids, convex polygons and the [`Inverted`]/[`Rotating`] wrappers.
//! - [`ForceField`]: any pure `(position, velocity, mass, time) -> force`.
//! - [`DiscreteSolver`] (fixed substeps, post-hoc correction) and
//!   [`CcdSolver`] (distance-bounded adaptive slicing), driven by [`step`].
//!
//! ```
//! use ccdsim::prelude::*;
//!
//! let mut state = ParticleState::<f64, 2>::new(1)?;
//! state.set_particle(0, [0.0, 0.0], [0.0, 0.0], 1.0)?;
//! let boundary = AxisAlignedBox::cube(5.0)?;
//! let gravity = ConstantForce { force: [0.0, -10.0] };
//! let solver = DiscreteSolver::new(0.1, 1.0, 1)?;
//!
//! step(&mut state, &solver, &boundary, &gravity)?;
//! assert!((state.velocities()[0][1] + 1.0).abs() < 1e-12);
//! assert!((state.positions()[0][1] + 0.1).abs() < 1e-12);
//! # Ok::<(), ccdsim::error::Error>(())
//! ```

pub mod boundary;
pub mod core;
pub mod error;
pub mod solver;

#[cfg(feature = "python")]
mod python;

pub use crate::boundary::{
    AxisAlignedBox, Boundary, Collision, ConvexPolygon, Ellipsoid, Inverted, Rotating, Shape,
    Sphere,
};
pub use crate::core::{
    ConstantForce, ForceField, LinearDrag, ParticleState, RadialSpring, Scalar, Superposition,
    UniformAcceleration, ZeroField,
};
pub use crate::error::{Error, Result};
pub use crate::solver::{
    step, CcdSolver, DiscreteSolver, ParticleIntegrator, Solver, StepReport,
};

/// Convenient glob import of the public API.
pub mod prelude {
    pub use crate::boundary::{
        AxisAlignedBox, Boundary, Collision, ConvexPolygon, Ellipsoid, Inverted, Rotating, Shape,
        Sphere,
    };
    pub use crate::core::scenario::fill_inside;
    pub use crate::core::{
        ConstantForce, ForceField, LinearDrag, ParticleState, RadialSpring, Scalar,
        Superposition, UniformAcceleration, ZeroField,
    };
    pub use crate::solver::{
        step, CcdSolver, DiscreteSolver, ParticleIntegrator, Solver, StepReport,
    };
}
