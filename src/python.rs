use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::boundary::Shape;
use crate::core::force::UniformAcceleration;
use crate::core::particle::ParticleState;
use crate::core::scenario::{fill_inside, sampling_extent};
use crate::solver::{step, CcdSolver, DiscreteSolver, Solver};

const DIM: usize = 3;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_vec3(values: &[f64], what: &str) -> PyResult<[f64; DIM]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(py_err(format!(
            "{} must have length {}, got {}",
            what,
            DIM,
            values.len()
        ))),
    }
}

fn build_shape(kind: &str, size: &[f64]) -> PyResult<Shape<f64, DIM>> {
    match kind {
        "sphere" => match size {
            [r] => Shape::sphere(*r).map_err(py_err),
            _ => Err(py_err("sphere size must be [radius]")),
        },
        "box" => Shape::aabb(to_vec3(size, "box size")?).map_err(py_err),
        "ellipsoid" => Shape::ellipsoid(to_vec3(size, "ellipsoid size")?).map_err(py_err),
        other => Err(py_err(format!(
            "unknown boundary '{}'; expected 'sphere', 'box' or 'ellipsoid'",
            other
        ))),
    }
}

fn columns_to_array(columns: &[[f64; DIM]]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((columns.len(), DIM));
    for (i, row) in columns.iter().enumerate() {
        for k in 0..DIM {
            arr[[i, k]] = row[k];
        }
    }
    arr
}

fn array_to_columns(arr: &PyReadonlyArray2<'_, f64>, n: usize, what: &str) -> PyResult<Vec<[f64; DIM]>> {
    let view = arr.as_array();
    if view.shape() != [n, DIM] {
        return Err(py_err(format!(
            "{} must have shape ({}, {}), got {:?}",
            what,
            n,
            DIM,
            view.shape()
        )));
    }
    Ok(view
        .rows()
        .into_iter()
        .map(|row| [row[0], row[1], row[2]])
        .collect())
}

/// 3-D particle simulation inside a single boundary, exposed to Python.
///
/// __new__(num_particles, size, boundary="sphere", obstacle=False,
///         angular_velocity=0.0, solver="ccd", dt=0.01, restitution=1.0,
///         iterations=64, gravity=None, speed=1.0, seed=None)
#[pyclass]
pub struct CollisionSim {
    state: ParticleState<f64, DIM>,
    boundary: Shape<f64, DIM>,
    solver: Solver<f64>,
    gravity: UniformAcceleration<f64, DIM>,
}

#[pymethods]
impl CollisionSim {
    /// Build the boundary and solver and place `num_particles` inside the
    /// valid region with random directions at `speed`.
    ///
    /// Parameters
    /// - size: [radius] for "sphere", [hx, hy, hz] for "box" and "ellipsoid"
    /// - obstacle: invert the shape so the valid region is its exterior
    /// - angular_velocity: spin the boundary about +z (rad/s)
    /// - solver: "ccd" or "discrete"; `iterations` is max_iterations or substeps
    /// - gravity: optional [gx, gy, gz] acceleration
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        num_particles,
        size,
        boundary="sphere",
        obstacle=false,
        angular_velocity=0.0,
        solver="ccd",
        dt=0.01,
        restitution=1.0,
        iterations=64,
        gravity=None,
        speed=1.0,
        seed=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_particles: usize,
        size: Vec<f64>,
        boundary: &str,
        obstacle: bool,
        angular_velocity: f64,
        solver: &str,
        dt: f64,
        restitution: f64,
        iterations: u32,
        gravity: Option<Vec<f64>>,
        speed: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut shape = build_shape(boundary, &size)?;
        if obstacle {
            shape = shape.inverted();
        }
        if angular_velocity != 0.0 {
            shape = shape.rotating(angular_velocity).map_err(py_err)?;
        }

        let solver: Solver<f64> = match solver {
            "ccd" => CcdSolver::new(dt, restitution, iterations)
                .map_err(py_err)?
                .into(),
            "discrete" => DiscreteSolver::new(dt, restitution, iterations)
                .map_err(py_err)?
                .into(),
            other => {
                return Err(py_err(format!(
                    "unknown solver '{}'; expected 'ccd' or 'discrete'",
                    other
                )))
            }
        };

        let acceleration = match gravity {
            Some(g) => to_vec3(&g, "gravity")?,
            None => [0.0; DIM],
        };

        let extent = sampling_extent(&size, obstacle);
        let state = fill_inside(num_particles, &shape, extent, speed, 1.0, 0.0, seed)
            .map_err(py_err)?;

        Ok(Self {
            state,
            boundary: shape,
            solver,
            gravity: UniformAcceleration { acceleration },
        })
    }

    /// Advance `n` macro steps (releases the GIL during computation).
    #[pyo3(signature = (n=1))]
    fn step(&mut self, py: Python<'_>, n: usize) -> PyResult<()> {
        let Self {
            state,
            boundary,
            solver,
            gravity,
        } = self;
        py.detach(|| {
            for _ in 0..n {
                step(state, &*solver, &*boundary, &*gravity)?;
            }
            Ok::<(), crate::error::Error>(())
        })
        .map_err(py_err)
    }

    /// Current simulated time.
    fn time(&self) -> f64 {
        self.state.time()
    }

    /// Number of completed steps.
    fn step_count(&self) -> u64 {
        self.state.step_count()
    }

    /// Total kinetic energy of active particles.
    fn kinetic_energy(&self) -> f64 {
        self.state.kinetic_energy()
    }

    /// Return positions as a NumPy array of shape (N, 3), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let arr = columns_to_array(self.state.positions());
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return velocities as a NumPy array of shape (N, 3), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let arr = columns_to_array(self.state.velocities());
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return per-particle reflection counts as a NumPy array of shape (N,).
    fn get_collision_counts<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<u64>>> {
        let arr = Array1::from(self.state.collision_counts().to_vec());
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Set all positions from a NumPy array of shape (N, 3); values must be finite.
    fn set_positions<'py>(&mut self, positions: PyReadonlyArray2<'py, f64>) -> PyResult<()> {
        let cols = array_to_columns(&positions, self.state.len(), "positions")?;
        self.state.set_positions(&cols).map_err(py_err)
    }

    /// Set all velocities from a NumPy array of shape (N, 3); values must be finite.
    fn set_velocities<'py>(&mut self, velocities: PyReadonlyArray2<'py, f64>) -> PyResult<()> {
        let cols = array_to_columns(&velocities, self.state.len(), "velocities")?;
        self.state.set_velocities(&cols).map_err(py_err)
    }

    /// Number of active particles currently outside the valid region.
    #[pyo3(signature = (tolerance=1e-6))]
    fn escaped_count(&self, tolerance: f64) -> usize {
        self.state.escaped_count(&self.boundary, tolerance)
    }
}

/// The ccdsim Python module entry point.
#[pymodule]
fn ccdsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<CollisionSim>()?;
    Ok(())
}
