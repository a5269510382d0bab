//! Collision-aware stepping.
//!
//! [`step`] advances a [`ParticleState`] by one macro time-step. Particles are
//! processed in parallel; each worker runs one particle's whole
//! substep/iteration sequence and writes back only that particle's columns.
//! The kernel itself lives in a [`ParticleIntegrator`] so the boundary, force
//! field and solver are all resolved statically inside the hot loop.

pub mod ccd;
pub mod discrete;

pub use ccd::CcdSolver;
pub use discrete::DiscreteSolver;

use crate::boundary::Boundary;
use crate::core::force::ForceField;
use crate::core::particle::{ColumnsMut, ParticleState};
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Outcome of advancing one particle through one macro step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advance {
    /// Number of velocity reflections applied.
    pub reflections: u64,
    /// The iteration cap was hit before the macro step was consumed.
    pub capped: bool,
}

/// Per-step aggregate over all active particles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub active: usize,
    pub reflections: u64,
    /// Particles that ran out of iterations and dropped the remaining time.
    pub capped: usize,
    /// Particles whose position became NaN/inf.
    pub non_finite: usize,
}

impl StepReport {
    fn merge(self, other: Self) -> Self {
        Self {
            active: self.active + other.active,
            reflections: self.reflections + other.reflections,
            capped: self.capped + other.capped,
            non_finite: self.non_finite + other.non_finite,
        }
    }
}

/// A per-particle stepping algorithm.
pub trait ParticleIntegrator<T: Scalar>: Sync {
    /// Macro time-step.
    fn dt(&self) -> T;

    /// Check the configuration before a step.
    fn validate(&self) -> Result<()>;

    /// Advance a single particle by one macro step starting at `time`.
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
        F: ForceField<T, D> + ?Sized;
}

/// Either stepping algorithm, selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solver<T: Scalar> {
    Discrete(DiscreteSolver<T>),
    Ccd(CcdSolver<T>),
}

impl<T: Scalar> Solver<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discrete(_) => "discrete",
            Self::Ccd(_) => "ccd",
        }
    }

    pub fn restitution(&self) -> T {
        match self {
            Self::Discrete(s) => s.restitution,
            Self::Ccd(s) => s.restitution,
        }
    }
}

impl<T: Scalar> From<DiscreteSolver<T>> for Solver<T> {
    fn from(s: DiscreteSolver<T>) -> Self {
        Self::Discrete(s)
    }
}

impl<T: Scalar> From<CcdSolver<T>> for Solver<T> {
    fn from(s: CcdSolver<T>) -> Self {
        Self::Ccd(s)
    }
}

impl<T: Scalar> ParticleIntegrator<T> for Solver<T> {
    fn dt(&self) -> T {
        match self {
            Self::Discrete(s) => s.dt,
            Self::Ccd(s) => s.dt,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Discrete(s) => s.validate(),
            Self::Ccd(s) => s.validate(),
        }
    }

    #[inline]
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
        match self {
            Self::Discrete(s) => s.advance(position, velocity, mass, time, boundary, force_field),
            Self::Ccd(s) => s.advance(position, velocity, mass, time, boundary, force_field),
        }
    }
}

/// Advance every active particle by one macro step.
///
/// Postconditions: each active particle reflects one step of motion,
/// `state.time()` grows by exactly `solver.dt()`, `state.step_count()` by one,
/// and each collision counter by the number of reflections that particle
/// underwent. Inactive particles are left bit-for-bit unchanged.
///
/// Errors:
/// - `Error::InvalidParam` if the solver configuration is invalid; the state
///   is not touched in that case.
pub fn step<T, S, B, F, const D: usize>(
    state: &mut ParticleState<T, D>,
    solver: &S,
    boundary: &B,
    force_field: &F,
) -> Result<StepReport>
where
    T: Scalar,
    S: ParticleIntegrator<T>,
    B: Boundary<T, D> + ?Sized,
    F: ForceField<T, D> + ?Sized,
{
    solver.validate()?;
    let dt = solver.dt();
    let t0 = state.time();

    let ColumnsMut {
        position,
        velocity,
        collision_count,
        mass,
        active,
    } = state.columns_mut();
    let report = position
        .par_iter_mut()
        .zip(velocity.par_iter_mut())
        .zip(collision_count.par_iter_mut())
        .zip(mass.par_iter().zip(active.par_iter()))
        .map(|(((position, velocity), count), (&mass, &active))| {
            if !active {
                return StepReport::default();
            }
            let outcome = solver.advance(position, velocity, mass, t0, boundary, force_field);
            *count = count.saturating_add(outcome.reflections);
            StepReport {
                active: 1,
                reflections: outcome.reflections,
                capped: usize::from(outcome.capped),
                non_finite: usize::from(!scalar::is_finite(position)),
            }
        })
        .reduce(StepReport::default, StepReport::merge);

    state.advance_clock(dt);

    log::debug!(
        "step {}: t={:?} active={} reflections={}",
        state.step_count(),
        state.time(),
        report.active,
        report.reflections
    );
    if report.capped > 0 {
        log::debug!(
            "{} particles hit the iteration cap and dropped remaining time",
            report.capped
        );
    }
    if report.non_finite > 0 {
        log::warn!(
            "{} particles have non-finite positions after step {}",
            report.non_finite,
            state.step_count()
        );
    }
    Ok(report)
}

// ============ Shared kernel pieces ============

/// Semi-implicit Euler: `v += (F/m) h`, then `p += v h`.
#[inline]
pub(crate) fn integrate<T, F, const D: usize>(
    position: &mut [T; D],
    velocity: &mut [T; D],
    mass: T,
    time: T,
    h: T,
    force_field: &F,
) where
    T: Scalar,
    F: ForceField<T, D> + ?Sized,
{
    let force = force_field.force(position, velocity, mass, time);
    for (vk, &fk) in velocity.iter_mut().zip(force.iter()) {
        *vk = *vk + (fk / mass) * h;
    }
    scalar::axpy(position, h, velocity);
}

/// Reflect `velocity` about `normal` with restitution `e` if it points into
/// the forbidden region. Returns whether a reflection happened.
#[inline]
pub(crate) fn reflect<T: Scalar, const D: usize>(
    velocity: &mut [T; D],
    normal: &[T; D],
    restitution: T,
) -> bool {
    let vn = scalar::dot(velocity, normal);
    if vn > T::zero() {
        scalar::axpy(velocity, -(T::one() + restitution) * vn, normal);
        true
    } else {
        false
    }
}

/// Upper bound on push-out moves per contact.
const MAX_PUSH_OUT: usize = 8;

/// Resolve a contact at `time`: reflect once against `normal`, then push the
/// particle along the local normal until it is back in the valid region.
///
/// `depth` and `normal` are the signed distance and normal already evaluated
/// at `position`. Each move is `-(d + margin) n`; for shapes whose distance
/// is only approximate a single move can fall short, so the distance is
/// re-evaluated and the move repeated up to `MAX_PUSH_OUT` times. Returns
/// whether a reflection happened.
#[allow(clippy::too_many_arguments)]
pub(crate) fn resolve_contact<T, B, const D: usize>(
    position: &mut [T; D],
    velocity: &mut [T; D],
    boundary: &B,
    time: T,
    depth: T,
    normal: [T; D],
    restitution: T,
    margin: T,
) -> bool
where
    T: Scalar,
    B: Boundary<T, D> + ?Sized,
{
    let reflected = reflect(velocity, &normal, restitution);
    let mut d = depth;
    let mut n = normal;
    for _ in 0..MAX_PUSH_OUT {
        scalar::axpy(position, -(d + margin), &n);
        d = boundary.signed_distance(position, time);
        if d <= T::zero() {
            break;
        }
        n = boundary.surface_normal(position, time);
    }
    reflected
}

pub(crate) fn validate_common<T: Scalar>(dt: T, restitution: T) -> Result<()> {
    if !dt.is_finite() || dt <= T::zero() {
        return Err(Error::InvalidParam("dt must be finite and > 0".into()));
    }
    if !restitution.is_finite() || restitution < T::zero() || restitution > T::one() {
        return Err(Error::InvalidParam(
            "restitution must lie in [0, 1]".into(),
        ));
    }
    Ok(())
}
