//! Adaptive continuous collision detection.
//!
//! Each particle consumes the macro step in slices whose travel is bounded by
//! its current distance to the boundary (conservative advancement, as in
//! sphere tracing). Far from walls a single slice covers the whole step; near
//! walls slices shrink so that a fast particle reaches the surface instead of
//! jumping across it.
//!
//! Known limitations: the bound uses the velocity at the start of each slice,
//! so strong forces can still carry a particle slightly past a wall, and a
//! particle skimming nearly parallel to a thin curved wall may exhaust
//! `max_iterations`. Hitting the cap drops the remaining time for that
//! particle in this step; it is still checked against the boundary at the
//! end of the step.

use crate::boundary::Boundary;
use crate::core::force::ForceField;
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};
use crate::solver::{integrate, resolve_contact, validate_common, Advance, ParticleIntegrator};

/// Added to the speed before dividing so a particle at rest takes the whole
/// remaining time in one slice.
const SPEED_EPS: f64 = 1e-12;

/// Remaining time below `dt * REMAINING_REL_EPS` counts as consumed.
const REMAINING_REL_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcdSolver<T: Scalar> {
    pub dt: T,
    pub restitution: T,
    /// Upper bound on slices per particle per macro step.
    pub max_iterations: u32,
    /// Contact band: a particle within `tolerance` of the surface is treated
    /// as touching it and is left `tolerance` inside afterwards.
    pub tolerance: T,
    /// Minimum travel per slice; prevents zero-progress slices on the surface.
    pub min_step: T,
}

impl<T: Scalar> Default for CcdSolver<T> {
    fn default() -> Self {
        Self {
            dt: T::lit(1.0 / 60.0),
            restitution: T::one(),
            max_iterations: 64,
            tolerance: T::lit(1e-4),
            min_step: T::lit(1e-6),
        }
    }
}

impl<T: Scalar> CcdSolver<T> {
    /// Solver with default `tolerance` and `min_step`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `dt <= 0`, `restitution` is outside
    ///   `[0, 1]`, or `max_iterations == 0`.
    pub fn new(dt: T, restitution: T, max_iterations: u32) -> Result<Self> {
        let solver = Self {
            dt,
            restitution,
            max_iterations,
            ..Self::default()
        };
        solver.validate()?;
        Ok(solver)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(self.dt, self.restitution)?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidParam("max_iterations must be >= 1".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < T::zero() {
            return Err(Error::InvalidParam(
                "tolerance must be finite and >= 0".into(),
            ));
        }
        if !self.min_step.is_finite() || self.min_step <= T::zero() {
            return Err(Error::InvalidParam(
                "min_step must be finite and > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn with_tolerance(self, tolerance: T) -> Result<Self> {
        let solver = Self { tolerance, ..self };
        solver.validate()?;
        Ok(solver)
    }

    pub fn with_min_step(self, min_step: T) -> Result<Self> {
        let solver = Self { min_step, ..self };
        solver.validate()?;
        Ok(solver)
    }

    pub fn with_max_iterations(self, max_iterations: u32) -> Result<Self> {
        let solver = Self {
            max_iterations,
            ..self
        };
        solver.validate()?;
        Ok(solver)
    }
}

impl<T: Scalar> ParticleIntegrator<T> for CcdSolver<T> {
    fn dt(&self) -> T {
        self.dt
    }

    fn validate(&self) -> Result<()> {
        CcdSolver::validate(self)
    }

    fn advance<B, F, const D: usize>(
        &self,
        position: &mut [T; D],
        velocity: &mut [T; D],
        mass: T,
        time: T,
        boundary: &B,
        force_field: &F,
    ) -> Advance
    where
        B: Boundary<T, D> + ?Sized,
        F: ForceField<T, D> + ?Sized,
    {
        let speed_eps = T::lit(SPEED_EPS);
        let done = self.dt * T::lit(REMAINING_REL_EPS);
        let mut remaining = self.dt;
        let mut t = time;
        let mut reflections = 0u64;
        let mut iterations = 0u32;

        while remaining > done && iterations < self.max_iterations {
            iterations += 1;

            let speed = scalar::norm(velocity);
            let clearance = boundary.signed_distance(position, t).abs();
            let travel = clearance.max(self.min_step);
            let h = remaining.min(travel / (speed + speed_eps));

            integrate(position, velocity, mass, t, h, force_field);
            remaining = remaining - h;
            t = t + h;

            if self.contact(position, velocity, boundary, t) {
                reflections += 1;
            }
        }

        let capped = remaining > done;
        // The clock still moves to the end of the step; a moving wall may
        // have swept past the particle in the dropped time.
        if capped && self.contact(position, velocity, boundary, time + self.dt) {
            reflections += 1;
        }

        Advance {
            reflections,
            capped,
        }
    }
}

impl<T: Scalar> CcdSolver<T> {
    /// Resolve a contact if the particle is within the contact band at
    /// `time`. Returns whether the velocity was reflected.
    #[inline]
    fn contact<B, const D: usize>(
        &self,
        position: &mut [T; D],
        velocity: &mut [T; D],
        boundary: &B,
        time: T,
    ) -> bool
    where
        B: Boundary<T, D> + ?Sized,
    {
        let d = boundary.signed_distance(position, time);
        if d < -self.tolerance {
            return false;
        }
        let normal = boundary.surface_normal(position, time);
        resolve_contact(
            position,
            velocity,
            boundary,
            time,
            d,
            normal,
            self.restitution,
            self.tolerance,
        )
    }
}
