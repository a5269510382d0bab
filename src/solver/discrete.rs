use crate::boundary::Boundary;
use crate::core::force::ForceField;
use crate::core::scalar::Scalar;
use crate::error::{Error, Result};
use crate::solver::{integrate, resolve_contact, validate_common, Advance, ParticleIntegrator};

/// Absolute distance a penetrating particle is pushed past the surface.
pub const PUSH_OUT_EPS: f64 = 1e-6;

/// Fixed-substep integrator with post-hoc collision correction.
///
/// Each macro step is split into `substeps` equal substeps of semi-implicit
/// Euler. After every substep a particle found in the forbidden region has
/// its velocity reflected (if still moving outward) and is pushed back
/// inside the surface. A particle fast enough to cross a thin region within one
/// substep is not caught; raise `substeps` to reduce that risk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteSolver<T: Scalar> {
    pub dt: T,
    pub restitution: T,
    pub substeps: u32,
}

impl<T: Scalar> Default for DiscreteSolver<T> {
    fn default() -> Self {
        Self {
            dt: T::lit(1.0 / 60.0),
            restitution: T::one(),
            substeps: 8,
        }
    }
}

impl<T: Scalar> DiscreteSolver<T> {
    /// Errors:
    /// - `Error::InvalidParam` if `dt <= 0`, `restitution` is outside
    ///   `[0, 1]`, or `substeps == 0`.
    pub fn new(dt: T, restitution: T, substeps: u32) -> Result<Self> {
        let solver = Self {
            dt,
            restitution,
            substeps,
        };
        solver.validate()?;
        Ok(solver)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(self.dt, self.restitution)?;
        if self.substeps == 0 {
            return Err(Error::InvalidParam("substeps must be >= 1".into()));
        }
        Ok(())
    }

    pub fn with_substeps(self, substeps: u32) -> Result<Self> {
        Self::new(self.dt, self.restitution, substeps)
    }

    pub fn with_restitution(self, restitution: T) -> Result<Self> {
        Self::new(self.dt, restitution, self.substeps)
    }

    /// Length of one substep.
    #[inline]
    pub fn substep_dt(&self) -> T {
        self.dt / T::lit(f64::from(self.substeps))
    }
}

impl<T: Scalar> ParticleIntegrator<T> for DiscreteSolver<T> {
    fn dt(&self) -> T {
        self.dt
    }

    fn validate(&self) -> Result<()> {
        DiscreteSolver::validate(self)
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
        let h = self.substep_dt();
        let push_out = T::lit(PUSH_OUT_EPS);
        let mut t = time;
        let mut reflections = 0u64;

        for _ in 0..self.substeps {
            integrate(position, velocity, mass, t, h, force_field);
            t = t + h;

            let hit = boundary.detect_collision(position, t);
            if hit.collided
                && resolve_contact(
                    position,
                    velocity,
                    boundary,
                    t,
                    hit.depth,
                    hit.normal,
                    self.restitution,
                    push_out,
                )
            {
                reflections += 1;
            }
        }

        Advance {
            reflections,
            capped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{AxisAlignedBox, Ellipsoid, Sphere};
    use crate::core::force::{ConstantForce, ZeroField};

    #[test]
    fn free_fall_single_substep() -> Result<()> {
        let solver = DiscreteSolver::new(0.1, 1.0, 1)?;
        let b = AxisAlignedBox::<f64, 2>::cube(5.0)?;
        let g = ConstantForce { force: [0.0, -10.0] };
        let mut p = [0.0, 0.0];
        let mut v = [0.0, 0.0];
        let out = solver.advance(&mut p, &mut v, 1.0, 0.0, &b, &g);
        assert_eq!(out.reflections, 0);
        assert!(v[0].abs() < 1e-12 && (v[1] + 1.0).abs() < 1e-12);
        assert!(p[0].abs() < 1e-12 && (p[1] + 0.1).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn penetration_is_corrected_and_reflected() -> Result<()> {
        let solver = DiscreteSolver::new(0.1, 0.5, 1)?;
        let c = Sphere::<f64, 2>::at_origin(1.0)?;
        let mut p = [0.95, 0.0];
        let mut v = [2.0, 0.0];
        let out = solver.advance(&mut p, &mut v, 1.0, 0.0, &c, &ZeroField);
        assert_eq!(out.reflections, 1);
        assert!((v[0] + 1.0).abs() < 1e-12);
        assert!(c.signed_distance(&p, 0.1) < 0.0);
        Ok(())
    }

    #[test]
    fn deep_penetration_of_thin_ellipse_is_undone() -> Result<()> {
        let solver = DiscreteSolver::new(0.01, 1.0, 1)?;
        let e = Ellipsoid::<f64, 2>::at_origin([1.0, 0.2])?;
        let mut p = [0.5, 0.0];
        let mut v = [0.0, -80.0];
        let out = solver.advance(&mut p, &mut v, 1.0, 0.0, &e, &ZeroField);
        assert_eq!(out.reflections, 1);
        assert!(e.signed_distance(&p, 0.01) <= 0.0);
        assert!(v[1] > 0.0);
        Ok(())
    }

    #[test]
    fn config_validation() {
        assert!(DiscreteSolver::new(0.0, 1.0, 1).is_err());
        assert!(DiscreteSolver::new(0.1, 1.5, 1).is_err());
        assert!(DiscreteSolver::new(0.1, -0.1, 1).is_err());
        assert!(DiscreteSolver::new(0.1, 1.0, 0).is_err());
        assert!(DiscreteSolver::<f32>::default().validate().is_ok());
    }

    #[test]
    fn substep_dt_divides_macro_step() -> Result<()> {
        let s = DiscreteSolver::<f64>::new(0.2, 1.0, 4)?;
        assert!((s.substep_dt() - 0.05).abs() < 1e-15);
        Ok(())
    }
}
