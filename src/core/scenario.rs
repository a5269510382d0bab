//! Seeded initial-condition generators.

use crate::boundary::Boundary;
use crate::core::particle::ParticleState;
use crate::core::scalar::{self, Scalar};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Attempt budget per particle for rejection sampling.
const MAX_ATTEMPTS: usize = 100_000;

/// Place `num_particles` active particles uniformly inside the valid region
/// of `boundary` (evaluated at time 0).
///
/// Candidates are drawn from the cube `[-extent, extent]^D` and rejected
/// unless `signed_distance < -margin`. Each particle gets a uniformly random
/// direction scaled to `speed`, and mass `mass`.
///
/// Errors:
/// - `Error::InvalidParam` for non-positive `extent`/`mass`, negative
///   `speed`/`margin`, or when a particle cannot be placed within the attempt
///   budget (the sampling cube misses the valid region).
pub fn fill_inside<T, B, const D: usize>(
    num_particles: usize,
    boundary: &B,
    extent: T,
    speed: T,
    mass: T,
    margin: T,
    seed: Option<u64>,
) -> Result<ParticleState<T, D>>
where
    T: Scalar,
    B: Boundary<T, D> + ?Sized,
{
    if !extent.is_finite() || extent <= T::zero() {
        return Err(Error::InvalidParam("extent must be finite and > 0".into()));
    }
    if !speed.is_finite() || speed < T::zero() {
        return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
    }
    if !mass.is_finite() || mass <= T::zero() {
        return Err(Error::InvalidParam("mass must be finite and > 0".into()));
    }
    if !margin.is_finite() || margin < T::zero() {
        return Err(Error::InvalidParam("margin must be finite and >= 0".into()));
    }

    let mut rng: StdRng = match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    };

    let mut state = ParticleState::new(num_particles)?;
    let half_width = extent.as_f64();
    let mut total_attempts = 0usize;

    for i in 0..num_particles {
        let mut attempts = 0usize;
        let position = loop {
            if attempts >= MAX_ATTEMPTS {
                return Err(Error::InvalidParam(format!(
                    "failed to place particle {} inside the boundary; check extent and margin",
                    i
                )));
            }
            attempts += 1;
            let mut p = [T::zero(); D];
            for pk in &mut p {
                *pk = T::lit(rng.random_range(-half_width..=half_width));
            }
            if boundary.signed_distance(&p, T::zero()) < -margin {
                break p;
            }
        };
        total_attempts += attempts;

        let velocity = scalar::scale(&random_direction::<T, D>(&mut rng), speed);
        state.set_particle(i, position, velocity, mass)?;
    }

    log::info!(
        "placed {} particles in {} attempts (seed {:?})",
        num_particles,
        total_attempts,
        seed
    );
    Ok(state)
}

/// Half-width of a sampling cube for a shape with the given half-sizes.
///
/// A container fits in the cube spanned by its largest half-size. An
/// obstacle's valid region is the exterior, which that cube can miss
/// entirely (a box fills it exactly), so the cube is doubled.
pub fn sampling_extent<T: Scalar>(half_sizes: &[T], obstacle: bool) -> T {
    let largest = half_sizes
        .iter()
        .fold(T::zero(), |acc, &s| if s > acc { s } else { acc });
    if obstacle {
        largest * T::lit(2.0)
    } else {
        largest
    }
}

/// Uniform direction on the unit sphere by rejection from the unit ball.
fn random_direction<T: Scalar, const D: usize>(rng: &mut StdRng) -> [T; D] {
    loop {
        let mut v = [0.0_f64; D];
        v.iter_mut().for_each(|x| *x = rng.random_range(-1.0..=1.0));
        let len_sq: f64 = v.iter().map(|x| x * x).sum();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            let inv = 1.0 / len_sq.sqrt();
            let mut out = [T::zero(); D];
            for (o, &x) in out.iter_mut().zip(v.iter()) {
                *o = T::lit(x * inv);
            }
            return out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{AxisAlignedBox, Sphere};

    #[test]
    fn particles_start_inside_with_requested_speed() -> Result<()> {
        let s = Sphere::<f64, 3>::at_origin(2.0)?;
        let state = fill_inside(200, &s, 2.0, 3.0, 1.0, 0.05, Some(42))?;
        assert_eq!(state.active_count(), 200);
        for (p, v) in state.positions().iter().zip(state.velocities()) {
            assert!(s.signed_distance(p, 0.0) < -0.05);
            assert!((scalar::norm(v) - 3.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_state() -> Result<()> {
        let b = AxisAlignedBox::<f32, 2>::cube(1.0)?;
        let a = fill_inside(50, &b, 1.0, 1.0, 1.0, 0.0, Some(7))?;
        let c = fill_inside(50, &b, 1.0, 1.0, 1.0, 0.0, Some(7))?;
        assert_eq!(a, c);
        Ok(())
    }

    #[test]
    fn mass_checked_even_without_particles() -> Result<()> {
        let s = Sphere::<f64, 2>::at_origin(1.0)?;
        for mass in [0.0, -1.0, f64::NAN] {
            let err = fill_inside(0, &s, 1.0, 1.0, mass, 0.0, Some(1)).unwrap_err();
            assert!(matches!(err, Error::InvalidParam(_)));
        }
        assert!(fill_inside(0, &s, 1.0, 1.0, 2.0, 0.0, Some(1))?.is_empty());
        Ok(())
    }

    #[test]
    fn obstacle_extent_reaches_past_the_shape() {
        assert_eq!(sampling_extent(&[1.0, 0.5, 2.0], false), 2.0);
        assert_eq!(sampling_extent(&[1.0, 0.5, 2.0], true), 4.0);
        assert_eq!(sampling_extent(&[3.0_f32], true), 6.0);
    }

    #[test]
    fn unreachable_interior_errors() -> Result<()> {
        // No point of a radius-0.1 circle lies 1.0 below its surface.
        let s = Sphere::<f64, 2>::at_origin(0.1)?;
        let err = fill_inside(1, &s, 1.0, 0.0, 1.0, 1.0, Some(1)).unwrap_err();
        assert!(err.to_string().contains("failed to place"));
        Ok(())
    }
}
