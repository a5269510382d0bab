//! Particle state, numeric helpers, force fields and initial conditions.

pub mod force;
pub mod particle;
pub mod scalar;
pub mod scenario;

pub use force::{
    ConstantForce, ForceField, LinearDrag, RadialSpring, Superposition, UniformAcceleration,
    ZeroField,
};
pub use particle::ParticleState;
pub use scalar::Scalar;
