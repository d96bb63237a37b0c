//! Symmetric assembly against dense assembly of the same faces

mod common;

use approx::assert_relative_eq;
use common::*;
use math_hydro_bem::core::assembly::{image_term, rankine_term};
use math_hydro_bem::core::mesh::{barge_slice, sphere_patch};
use math_hydro_bem::core::{
    AxialSymmetry, Axis, BemError, BodyMesh, FloatingBody, GreenParameters,
    LinearPotentialFlowProblem, MeshError, Plane, RecordingObserver, ReflectionSymmetry,
    SymmetryKind, TranslationalSymmetry,
};
use math_hydro_green::Delhommeau;
use math_hydro_solvers::BlockMatrix;
use std::f64::consts::PI;
use std::sync::Arc;

#[test]
fn test_reflection_matches_full_assembly() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    let mesh = reflected_hemisphere();
    let params = GreenParameters::infinite_depth(1.0 / 9.81);

    let structured = solver.build_matrices(&mesh, &mesh, &params, false).unwrap();
    assert!(matches!(structured.0, BlockMatrix::Toeplitz(_)));
    let full = solver.build_matrices(&mesh, &mesh, &params, true).unwrap();
    assert!(full.0.is_dense());
    assert_same_matrices(&structured, &full, 1e-10);

    assert_eq!(observer.count_symmetric(SymmetryKind::Reflection), 1);
    // Two sub-blocks in the symmetric pass, one block in the full pass
    assert_eq!(observer.count_dense(), 3);
}

#[test]
fn test_hemisphere_coefficients_with_and_without_symmetry() {
    let mut solver = solver();
    let symmetric = reflected_hemisphere();
    let plain = flattened(&symmetric);

    let mut results = Vec::new();
    for mesh in [symmetric, plain] {
        let mut body = FloatingBody::new(mesh);
        body.add_all_rigid_body_dofs([0.0; 3]).unwrap();
        let body = Arc::new(body);
        for dof in ["Heave", "Surge"] {
            let problem = LinearPotentialFlowProblem::radiation(body.clone(), dof, 1.5).unwrap();
            results.push(solver.solve(&problem, false).unwrap());
        }
    }

    let (symmetric, plain) = results.split_at(2);
    for (a, b) in symmetric.iter().zip(plain) {
        for dof in ["Surge", "Heave", "Pitch"] {
            let (ma, mb) = (a.added_mass(dof).unwrap(), b.added_mass(dof).unwrap());
            let (da, db) = (a.radiation_damping(dof).unwrap(), b.radiation_damping(dof).unwrap());
            assert_relative_eq!(ma, mb, max_relative = 1e-6, epsilon = 1e-6);
            assert_relative_eq!(da, db, max_relative = 1e-6, epsilon = 1e-6);
        }
    }
    // Heave is the largest coefficient of the heave problem
    let heave = &symmetric[0];
    assert!(heave.added_mass("Heave").unwrap().abs() > heave.added_mass("Surge").unwrap().abs());
}

#[test]
fn test_nested_reflections() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    let mesh = quarter_hemisphere();
    assert_eq!(mesh.structure(), "reflection(reflection(plain))");
    let params = GreenParameters::infinite_depth(0.5);

    let structured = solver.build_matrices(&mesh, &mesh, &params, false).unwrap();
    let full = solver.build_matrices(&mesh, &mesh, &params, true).unwrap();
    assert_same_matrices(&structured, &full, 1e-10);
    // Outer reflection, then the inner one for both sub-blocks
    assert_eq!(observer.count_symmetric(SymmetryKind::Reflection), 3);
    assert_eq!(observer.max_depth(), 3);
}

#[test]
fn test_translation_matches_full_assembly() {
    let mut solver = solver();
    let slice = barge_slice(2.0, 1.0, 0.5, 2, 2, "slice").unwrap();
    let barge: BodyMesh = TranslationalSymmetry::new(slice, [2.0, 0.0, 0.0], 4).unwrap().into();
    let params = GreenParameters::infinite_depth(0.8);

    let structured = solver.build_matrices(&barge, &barge, &params, false).unwrap();
    assert!(matches!(structured.0, BlockMatrix::Toeplitz(_)));
    let full = solver.build_matrices(&barge, &barge, &params, true).unwrap();
    assert_same_matrices(&structured, &full, 1e-10);
}

#[test]
fn test_axial_matches_full_assembly() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    let mesh = axial_hemisphere(12);
    let params = GreenParameters::infinite_depth(1.2);

    let structured = solver.build_matrices(&mesh, &mesh, &params, false).unwrap();
    assert!(matches!(structured.0, BlockMatrix::Circulant(_)));
    let full = solver.build_matrices(&mesh, &mesh, &params, true).unwrap();
    assert_same_matrices(&structured, &full, 1e-10);
    assert_eq!(observer.count_symmetric(SymmetryKind::Axial), 1);
}

#[test]
fn test_axial_symmetry_needs_same_mesh() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    let a = axial_hemisphere(6);
    let b = axial_hemisphere(6).translated([4.0, 0.0, 0.0], "other").unwrap();
    let params = GreenParameters::infinite_depth(1.0);

    let (s, _) = solver.build_matrices(&a, &b, &params, false).unwrap();
    assert!(s.is_dense());
    assert_eq!(observer.count_symmetric(SymmetryKind::Axial), 0);
}

#[test]
fn test_horizontal_axis_is_only_used_without_free_surface() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    // Horizontal cylinder of radius 0.5 along x, 2 m below the surface
    let axis = Axis::new([1.0, 0.0, 0.0], [0.0, 0.0, -2.0]).unwrap();
    let profile = [[0.0, 0.0, -1.5], [1.0, 0.0, -1.5]];
    let mesh: BodyMesh = AxialSymmetry::from_profile(&profile, axis, 8, "cylinder").unwrap().into();

    let (s, _) = solver
        .build_matrices(&mesh, &mesh, &GreenParameters::infinite_depth(1.0), false)
        .unwrap();
    assert!(s.is_dense());
    assert_eq!(observer.count_symmetric(SymmetryKind::Axial), 0);

    let structured = solver
        .build_matrices(&mesh, &mesh, &GreenParameters::no_free_surface(), false)
        .unwrap();
    assert!(matches!(structured.0, BlockMatrix::Circulant(_)));
    assert_eq!(observer.count_symmetric(SymmetryKind::Axial), 1);
    let full = solver
        .build_matrices(&mesh, &mesh, &GreenParameters::no_free_surface(), true)
        .unwrap();
    assert_same_matrices(&structured, &full, 1e-10);
}

#[test]
fn test_mismatched_planes_fall_back_to_dense() {
    let mut solver = solver();
    let a: BodyMesh = ReflectionSymmetry::new(
        sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (0.0, PI), 3, 4, "a").unwrap(),
        Plane::xoz(),
    )
    .unwrap()
    .into();
    let b: BodyMesh = ReflectionSymmetry::new(
        sphere_patch(1.0, [3.0, 0.0, 0.0], (PI / 2.0, PI), (-PI / 2.0, PI / 2.0), 3, 4, "b").unwrap(),
        Plane::new([1.0, 0.0, 0.0], [3.0, 0.0, 0.0]).unwrap(),
    )
    .unwrap()
    .into();
    let (s, v) = solver
        .build_matrices(&a, &b, &GreenParameters::infinite_depth(1.0), false)
        .unwrap();
    assert!(s.is_dense() && v.is_dense());
    assert_eq!(s.shape(), (a.nb_faces(), b.nb_faces()));
}

#[test]
fn test_image_term_sign() {
    let mesh = sphere_patch(0.5, [0.0, 0.0, -1.0], (0.0, PI), (0.0, 2.0 * PI), 4, 6, "sphere").unwrap();
    let green: &Delhommeau = &GREEN;

    // Deep water: receivers mirrored across the free surface, negated
    let above = mesh.mirrored(&Plane::new([0.0, 0.0, 1.0], [0.0; 3]).unwrap(), "above");
    let (s_image, v_image) = image_term(green, &mesh, &mesh, &GreenParameters::infinite_depth(1.0));
    let (s_direct, v_direct) = rankine_term(green, &above, &mesh);
    assert!(relative_difference(&s_image, &s_direct.mapv(|x| -x)) < 1e-12);
    assert!(relative_difference(&v_image, &v_direct.mapv(|x| -x)) < 1e-12);
    // Rankine S is negative, so the deep water image is positive
    assert!(s_image.iter().all(|x| x.re > 0.0));

    // Finite depth: receivers mirrored across the sea bottom, same sign
    let below = mesh.mirrored(&Plane::new([0.0, 0.0, 1.0], [0.0, 0.0, -3.0]).unwrap(), "below");
    let params = GreenParameters::finite_depth(3.0, 1.0, 1.0f64.tanh() * 3.0);
    let (s_image, v_image) = image_term(green, &mesh, &mesh, &params);
    let (s_direct, v_direct) = rankine_term(green, &below, &mesh);
    assert!(relative_difference(&s_image, &s_direct) < 1e-12);
    assert!(relative_difference(&v_image, &v_direct) < 1e-12);
    assert!(s_image.iter().all(|x| x.re < 0.0));
}

#[test]
fn test_image_terms_have_opposite_signs_at_mirrored_depths() {
    // Sphere halfway between the free surface and the sea bottom: its image
    // above z = 0 and its image below z = -3 are mirror images of each other
    let mesh = sphere_patch(0.5, [0.0, 0.0, -1.5], (0.0, PI), (0.0, 2.0 * PI), 4, 6, "sphere").unwrap();
    let green: &Delhommeau = &GREEN;
    let (deep, _) = image_term(green, &mesh, &mesh, &GreenParameters::infinite_depth(1.0));
    let params = GreenParameters::finite_depth(3.0, 1.0, 1.0f64.tanh() * 3.0);
    let (finite, _) = image_term(green, &mesh, &mesh, &params);

    let (deep_total, finite_total) = (deep.sum(), finite.sum());
    assert!((deep_total + finite_total).norm() < 1e-10 * deep_total.norm());
    assert!(deep_total.re > 0.0 && finite_total.re < 0.0);
}

#[test]
fn test_joined_bodies_keep_their_symmetry() {
    let observer = RecordingObserver::shared();
    let mut solver = solver().with_observer(observer.clone());
    let first = reflected_hemisphere();
    let second = first.translated([4.0, 0.0, 0.0], "second").unwrap();
    let both = BodyMesh::join(&[&first, &second], "both").unwrap();
    assert_eq!(both.structure(), "reflection(plain)");
    assert_eq!(both.nb_faces(), first.nb_faces() + second.nb_faces());

    let params = GreenParameters::infinite_depth(1.0);
    let structured = solver.build_matrices(&both, &both, &params, false).unwrap();
    assert!(matches!(structured.0, BlockMatrix::Toeplitz(_)));
    assert_eq!(observer.count_symmetric(SymmetryKind::Reflection), 1);
    let full = solver.build_matrices(&both, &both, &params, true).unwrap();
    assert_same_matrices(&structured, &full, 1e-10);

    let (BodyMesh::Reflection(a), BodyMesh::Reflection(b)) = (&first, &second) else {
        panic!("reflected bodies expected");
    };
    let across_yoz = ReflectionSymmetry::new(
        sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (-PI / 2.0, PI / 2.0), 3, 4, "across_yoz").unwrap(),
        Plane::yoz(),
    )
    .unwrap();
    assert!(ReflectionSymmetry::join(&[a, b], "pair").is_ok());
    assert!(matches!(
        ReflectionSymmetry::join(&[a, &across_yoz], "pair"),
        Err(MeshError::SymmetryMismatch { .. })
    ));
}

#[test]
fn test_malformed_symmetry_parameters() {
    let patch = sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (0.0, PI), 2, 2, "patch").unwrap();
    let tilted = Plane::new([1.0, 0.0, 1.0], [0.0; 3]).unwrap();
    let err: BemError = ReflectionSymmetry::new(patch.clone(), tilted).unwrap_err().into();
    assert!(err.is_input_error());

    assert!(matches!(
        TranslationalSymmetry::new(patch.clone(), [0.0, 0.0, 1.0], 3),
        Err(MeshError::InvalidTranslation { .. })
    ));
    assert_eq!(
        AxialSymmetry::new(patch, Axis::oz(), 0).unwrap_err(),
        MeshError::InvalidRepetitions(0)
    );
}
