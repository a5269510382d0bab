use ccdsim::core::scenario::sampling_extent;
use ccdsim::prelude::*;

/// Populate a hexagonal arena, then let a spring pull everything inward
/// while the walls bounce particles back.
#[test]
fn hexagon_arena_with_spring() -> ccdsim::Result<()> {
    let arena = Shape::<f64, 2>::from_polygon(ConvexPolygon::regular(6, 1.0)?)?;
    let mut state = fill_inside(200, &arena, 1.0, 2.0, 0.5, 0.02, Some(8))?;
    assert_eq!(state.active_count(), 200);
    assert_eq!(state.escaped_count(&arena, 0.0), 0);

    let spring = RadialSpring {
        center: [0.0, 0.0],
        stiffness: 3.0,
    };
    let solver = DiscreteSolver::new(0.01, 1.0, 4)?;
    for _ in 0..300 {
        step(&mut state, &solver, &arena, &spring)?;
    }
    assert_eq!(state.escaped_count(&arena, 1e-3), 0);
    assert!(state.total_collisions() > 0);
    Ok(())
}

#[test]
fn seeds_control_the_initial_state() -> ccdsim::Result<()> {
    let ball = Sphere::<f64, 3>::at_origin(1.0)?;
    let a = fill_inside(32, &ball, 1.0, 1.0, 1.0, 0.0, Some(1))?;
    let b = fill_inside(32, &ball, 1.0, 1.0, 1.0, 0.0, Some(1))?;
    let c = fill_inside(32, &ball, 1.0, 1.0, 1.0, 0.0, Some(2))?;
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.velocities(), b.velocities());
    assert_ne!(a.positions(), c.positions());
    Ok(())
}

#[test]
fn invalid_inputs_are_rejected() -> ccdsim::Result<()> {
    let ball = Sphere::<f64, 2>::at_origin(1.0)?;
    assert!(fill_inside(4, &ball, 0.0, 1.0, 1.0, 0.0, None).is_err());
    assert!(fill_inside(4, &ball, 1.0, -1.0, 1.0, 0.0, None).is_err());
    assert!(fill_inside(4, &ball, 1.0, 1.0, 0.0, 0.0, None).is_err());
    assert!(fill_inside(4, &ball, 1.0, 1.0, 1.0, -0.1, None).is_err());
    let unseeded = fill_inside(4, &ball, 1.0, 1.0, 1.0, 0.0, None)?;
    assert_eq!(unseeded.len(), 4);
    Ok(())
}

/// The valid region of a box obstacle is its exterior, which the box's own
/// bounding cube does not contain.
#[test]
fn box_obstacle_is_populated_outside() -> ccdsim::Result<()> {
    let size = [1.0, 1.0, 1.0];
    let obstacle = Shape::<f64, 3>::aabb(size)?.inverted();
    assert!(fill_inside(1, &obstacle, 1.0, 1.0, 1.0, 0.0, Some(3)).is_err());

    let extent = sampling_extent(&size, true);
    let state = fill_inside(64, &obstacle, extent, 1.0, 1.0, 0.0, Some(3))?;
    assert_eq!(state.active_count(), 64);
    for p in state.positions() {
        assert!(obstacle.signed_distance(p, 0.0) < 0.0);
        assert!(p.iter().all(|x| x.abs() <= extent));
    }
    Ok(())
}
