//! Shared fixtures of the integration tests

#![allow(dead_code)]

use math_hydro_bem::core::mesh::{hemisphere_profile, sphere_patch};
use math_hydro_bem::core::{
    AxialSymmetry, Axis, BemSolver, BodyMesh, InfluenceMatrices, Plane, ReflectionSymmetry,
    SolverConfig,
};
use math_hydro_green::{Delhommeau, GreenFunction, TabulationConfig};
use ndarray::Array2;
use num_complex::Complex64;
use once_cell::sync::Lazy;
use std::f64::consts::PI;
use std::sync::Arc;

/// One set of tables per test binary
pub static GREEN: Lazy<Arc<Delhommeau>> =
    Lazy::new(|| Arc::new(Delhommeau::new(TabulationConfig::default().with_nb_theta(81))));

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn solver() -> BemSolver {
    solver_with(SolverConfig::default())
}

pub fn solver_with(config: SolverConfig) -> BemSolver {
    init_logger();
    let green: Arc<dyn GreenFunction> = GREEN.clone();
    BemSolver::with_green_function(config, green)
}

/// Immersed hemisphere of radius 1 made of two halves mirrored across y = 0
pub fn reflected_hemisphere() -> BodyMesh {
    let half = sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (0.0, PI), 5, 8, "half").unwrap();
    ReflectionSymmetry::new(half, Plane::xoz()).unwrap().into()
}

/// Immersed hemisphere built from a quarter and two reflections
pub fn quarter_hemisphere() -> BodyMesh {
    let quarter =
        sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (0.0, PI / 2.0), 4, 4, "quarter").unwrap();
    let half = ReflectionSymmetry::new(quarter, Plane::yoz()).unwrap();
    ReflectionSymmetry::new(half, Plane::xoz()).unwrap().into()
}

/// Immersed hemisphere of radius 1 revolved around the vertical axis
pub fn axial_hemisphere(nb_slices: usize) -> BodyMesh {
    AxialSymmetry::from_profile(&hemisphere_profile(1.0, 6), Axis::oz(), nb_slices, "hemisphere")
        .unwrap()
        .into()
}

/// Same faces, without any symmetry
pub fn flattened(mesh: &BodyMesh) -> BodyMesh {
    BodyMesh::Plain(Arc::clone(mesh.mesh()))
}

/// Largest entry of |a − b| relative to the largest entry of |b|
pub fn relative_difference(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    assert_eq!(a.dim(), b.dim());
    let scale = b.iter().map(|x| x.norm()).fold(0.0, f64::max);
    let diff = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max);
    diff / scale
}

/// Compare structured and dense matrices
pub fn assert_same_matrices(structured: &InfluenceMatrices, full: &InfluenceMatrices, tolerance: f64) {
    let s = relative_difference(&structured.0.to_dense(), &full.0.to_dense());
    let v = relative_difference(&structured.1.to_dense(), &full.1.to_dense());
    assert!(s < tolerance, "S differs by {s:e}");
    assert!(v < tolerance, "V differs by {v:e}");
}
