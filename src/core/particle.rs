use crate::boundary::Boundary;
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};

/// Structure-of-arrays particle container for `D`-dimensional point masses.
///
/// Columns are index-aligned and fixed in length for the lifetime of the
/// state: accessors hand out slices, never the underlying `Vec`s, so the
/// particle count cannot change after construction.
///
/// Columns:
/// - `position`, `velocity`: `[T; D]` per particle
/// - `mass`: defaults to 1
/// - `active`: inactive particles are skipped by every kernel but keep their
///   stale position/velocity
/// - `collision_count`: number of boundary reflections undergone
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState<T: Scalar, const D: usize> {
    position: Vec<[T; D]>,
    velocity: Vec<[T; D]>,
    mass: Vec<T>,
    active: Vec<bool>,
    collision_count: Vec<u64>,
    time: T,
    step_count: u64,
}

/// Simultaneous mutable borrows of the per-particle columns, used by solvers
/// to fan out over particles.
pub(crate) struct ColumnsMut<'a, T: Scalar, const D: usize> {
    pub position: &'a mut [[T; D]],
    pub velocity: &'a mut [[T; D]],
    pub collision_count: &'a mut [u64],
    pub mass: &'a [T],
    pub active: &'a [bool],
}

impl<T: Scalar, const D: usize> ParticleState<T, D> {
    /// Create a zero-initialized state of `n` particles.
    ///
    /// Every particle starts at the origin at rest with unit mass and is
    /// inactive; `time` starts at 0.
    ///
    /// Errors:
    /// - `Error::DimensionMismatch` if `D` is not 2 or 3.
    pub fn new(n: usize) -> Result<Self> {
        if D != 2 && D != 3 {
            return Err(Error::DimensionMismatch {
                expected: 3,
                found: D,
            });
        }
        Ok(Self {
            position: vec![scalar::zero(); n],
            velocity: vec![scalar::zero(); n],
            mass: vec![T::one(); n],
            active: vec![false; n],
            collision_count: vec![0; n],
            time: T::zero(),
            step_count: 0,
        })
    }

    /// Number of particles (active or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Spatial dimension.
    #[inline]
    pub const fn dim(&self) -> usize {
        D
    }

    /// Simulated time; advances by exactly one macro `dt` per step.
    #[inline]
    pub fn time(&self) -> T {
        self.time
    }

    /// Number of completed steps.
    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn positions(&self) -> &[[T; D]] {
        &self.position
    }

    pub fn positions_mut(&mut self) -> &mut [[T; D]] {
        &mut self.position
    }

    pub fn velocities(&self) -> &[[T; D]] {
        &self.velocity
    }

    pub fn velocities_mut(&mut self) -> &mut [[T; D]] {
        &mut self.velocity
    }

    pub fn masses(&self) -> &[T] {
        &self.mass
    }

    pub fn masses_mut(&mut self) -> &mut [T] {
        &mut self.mass
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [bool] {
        &mut self.active
    }

    pub fn collision_counts(&self) -> &[u64] {
        &self.collision_count
    }

    /// Populate particle `i` and mark it active.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `i` is out of range, `mass` is not finite and
    ///   positive, or any vector component is NaN/inf.
    pub fn set_particle(
        &mut self,
        i: usize,
        position: [T; D],
        velocity: [T; D],
        mass: T,
    ) -> Result<()> {
        self.check_index(i)?;
        if !mass.is_finite() || mass <= T::zero() {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !scalar::is_finite(&position) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !scalar::is_finite(&velocity) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.position[i] = position;
        self.velocity[i] = velocity;
        self.mass[i] = mass;
        self.active[i] = true;
        Ok(())
    }

    pub fn activate(&mut self, i: usize) -> Result<()> {
        self.check_index(i)?;
        self.active[i] = true;
        Ok(())
    }

    /// Mark particle `i` inactive. Its columns are left untouched.
    pub fn deactivate(&mut self, i: usize) -> Result<()> {
        self.check_index(i)?;
        self.active[i] = false;
        Ok(())
    }

    /// Overwrite every position. The slice length must equal `len()`.
    pub fn set_positions(&mut self, positions: &[[T; D]]) -> Result<()> {
        self.check_len(positions.len())?;
        if !positions.iter().all(scalar::is_finite) {
            return Err(Error::InvalidParam("position values must be finite".into()));
        }
        self.position.copy_from_slice(positions);
        Ok(())
    }

    /// Overwrite every velocity. The slice length must equal `len()`.
    pub fn set_velocities(&mut self, velocities: &[[T; D]]) -> Result<()> {
        self.check_len(velocities.len())?;
        if !velocities.iter().all(scalar::is_finite) {
            return Err(Error::InvalidParam("velocity values must be finite".into()));
        }
        self.velocity.copy_from_slice(velocities);
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Total kinetic energy of the active particles: sum of 1/2 m |v|^2.
    pub fn kinetic_energy(&self) -> T {
        let half = T::lit(0.5);
        self.iter_active()
            .map(|i| half * self.mass[i] * scalar::dot(&self.velocity[i], &self.velocity[i]))
            .fold(T::zero(), |acc, e| acc + e)
    }

    /// Sum of all collision counters.
    pub fn total_collisions(&self) -> u64 {
        self.collision_count.iter().sum()
    }

    pub fn reset_collision_counts(&mut self) {
        self.collision_count.iter_mut().for_each(|c| *c = 0);
    }

    /// Number of active particles whose signed distance to `boundary` at the
    /// current time exceeds `tolerance` (i.e. that ended up in the forbidden
    /// region).
    pub fn escaped_count<B: Boundary<T, D>>(&self, boundary: &B, tolerance: T) -> usize {
        self.iter_active()
            .filter(|&i| boundary.signed_distance(&self.position[i], self.time) > tolerance)
            .count()
    }

    /// Indices of active particles.
    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
    }

    // ============ Solver-facing helpers ============

    pub(crate) fn columns_mut(&mut self) -> ColumnsMut<'_, T, D> {
        ColumnsMut {
            position: &mut self.position,
            velocity: &mut self.velocity,
            collision_count: &mut self.collision_count,
            mass: &self.mass,
            active: &self.active,
        }
    }

    /// Advance the global clock by one macro step.
    pub(crate) fn advance_clock(&mut self, dt: T) {
        self.time = self.time + dt;
        self.step_count = self.step_count.saturating_add(1);
    }

    fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.len() {
            return Err(Error::InvalidParam(format!(
                "particle index {} out of range for {} particles",
                i,
                self.len()
            )));
        }
        Ok(())
    }

    fn check_len(&self, found: usize) -> Result<()> {
        if found != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                found,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_zeroed() -> Result<()> {
        let s = ParticleState::<f64, 3>::new(4)?;
        assert_eq!(s.len(), 4);
        assert_eq!(s.dim(), 3);
        assert!(s.positions().iter().all(|p| *p == [0.0; 3]));
        assert!(s.velocities().iter().all(|v| *v == [0.0; 3]));
        assert!(s.masses().iter().all(|&m| m == 1.0));
        assert!(s.active().iter().all(|&a| !a));
        assert_eq!(s.time(), 0.0);
        assert_eq!(s.step_count(), 0);
        Ok(())
    }

    #[test]
    fn unsupported_dimension_rejected() {
        let err = ParticleState::<f64, 4>::new(1).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }

    #[test]
    fn empty_state_allowed() -> Result<()> {
        let s = ParticleState::<f32, 2>::new(0)?;
        assert!(s.is_empty());
        assert_eq!(s.kinetic_energy(), 0.0);
        Ok(())
    }

    #[test]
    fn set_particle_activates_and_validates() -> Result<()> {
        let mut s = ParticleState::<f64, 2>::new(2)?;
        s.set_particle(1, [1.0, 2.0], [3.0, 4.0], 2.0)?;
        assert_eq!(s.active(), &[false, true]);
        assert_eq!(s.active_count(), 1);
        // KE = 0.5 * 2 * 25
        assert!((s.kinetic_energy() - 25.0).abs() < 1e-12);

        let err = s.set_particle(0, [0.0, 0.0], [0.0, 0.0], 0.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
        let err = s.set_particle(5, [0.0, 0.0], [0.0, 0.0], 1.0).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        let err = s
            .set_particle(0, [f64::NAN, 0.0], [0.0, 0.0], 1.0)
            .unwrap_err();
        assert!(err.to_string().contains("position"));
        Ok(())
    }

    #[test]
    fn deactivate_keeps_columns() -> Result<()> {
        let mut s = ParticleState::<f64, 3>::new(1)?;
        s.set_particle(0, [1.0, 1.0, 1.0], [2.0, 0.0, 0.0], 1.0)?;
        s.deactivate(0)?;
        assert_eq!(s.positions()[0], [1.0, 1.0, 1.0]);
        assert_eq!(s.velocities()[0], [2.0, 0.0, 0.0]);
        assert_eq!(s.kinetic_energy(), 0.0);
        Ok(())
    }

    #[test]
    fn bulk_setters_check_length() -> Result<()> {
        let mut s = ParticleState::<f64, 2>::new(2)?;
        let err = s.set_positions(&[[0.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
        s.set_velocities(&[[1.0, 0.0], [0.0, 1.0]])?;
        assert_eq!(s.velocities()[1], [0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn advance_clock_counts_steps() -> Result<()> {
        let mut s = ParticleState::<f64, 2>::new(1)?;
        s.advance_clock(0.25);
        s.advance_clock(0.25);
        assert_eq!(s.time(), 0.5);
        assert_eq!(s.step_count(), 2);
        Ok(())
    }
}
