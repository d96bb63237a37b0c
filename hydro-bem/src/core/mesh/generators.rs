//! Mesh generators for simple floating bodies
//!
//! Spherical patches, revolution profiles, rectangles and barge slices,
//! enough to build the symmetric bodies used for validation.

use super::surface::Mesh;
use crate::core::error::MeshError;
use math_hydro_green::geometry::{Vec3, add, scale};
use ndarray::Array2;
use std::f64::consts::PI;

fn to_array(points: &[Vec3]) -> Array2<f64> {
    let mut vertices = Array2::zeros((points.len(), 3));
    for (i, p) in points.iter().enumerate() {
        for k in 0..3 {
            vertices[[i, k]] = p[k];
        }
    }
    vertices
}

/// Part of a sphere between two polar angles (measured from +z) and two
/// azimuths, with outward normals.
///
/// Vertices at the poles are merged, which gives triangles there.
///
/// # Example
/// ```ignore
/// // Quarter of an immersed hemisphere, x ≥ 0 and y ≥ 0
/// let quarter = sphere_patch(1.0, [0.0; 3], (PI / 2.0, PI), (0.0, PI / 2.0), 6, 6, "quarter")?;
/// ```
pub fn sphere_patch(
    radius: f64,
    center: Vec3,
    polar: (f64, f64),
    azimuth: (f64, f64),
    nb_polar: usize,
    nb_azimuth: usize,
    name: &str,
) -> Result<Mesh, MeshError> {
    let nb_polar = nb_polar.max(1);
    let nb_azimuth = nb_azimuth.max(1);
    let mut points = Vec::new();
    let mut index = vec![vec![0; nb_azimuth + 1]; nb_polar + 1];

    for (i, row) in index.iter_mut().enumerate() {
        let theta = polar.0 + (polar.1 - polar.0) * i as f64 / nb_polar as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();
        if sin_theta.abs() < 1e-12 {
            row.fill(points.len());
            points.push(add(center, [0.0, 0.0, radius * cos_theta]));
            continue;
        }
        for (j, slot) in row.iter_mut().enumerate() {
            let phi = azimuth.0 + (azimuth.1 - azimuth.0) * j as f64 / nb_azimuth as f64;
            *slot = points.len();
            points.push(add(
                center,
                [
                    radius * sin_theta * phi.cos(),
                    radius * sin_theta * phi.sin(),
                    radius * cos_theta,
                ],
            ));
        }
    }

    let mut faces = Vec::with_capacity(nb_polar * nb_azimuth);
    for i in 0..nb_polar {
        for j in 0..nb_azimuth {
            faces.push([
                index[i][j],
                index[i + 1][j],
                index[i + 1][j + 1],
                index[i][j + 1],
            ]);
        }
    }
    Mesh::new(to_array(&points), faces, name)
}

/// Profile of an immersed hemisphere centered at the origin, from the
/// waterline (`x = radius`) down to the bottom pole, for
/// [`AxialSymmetry::from_profile`](super::AxialSymmetry::from_profile).
pub fn hemisphere_profile(radius: f64, nb_points: usize) -> Vec<Vec3> {
    let nb_points = nb_points.max(2);
    (0..nb_points)
        .map(|i| {
            let theta = PI / 2.0 + PI / 2.0 * i as f64 / (nb_points - 1) as f64;
            let x = if i == nb_points - 1 { 0.0 } else { radius * theta.sin() };
            [x, 0.0, radius * theta.cos()]
        })
        .collect()
}

/// Flat rectangle `corner + s u + t v`, `s, t ∈ [0, 1]`, split into
/// `nb_u × nb_v` panels with normal along `u × v`.
pub fn rectangle(
    corner: Vec3,
    u: Vec3,
    v: Vec3,
    nb_u: usize,
    nb_v: usize,
    name: &str,
) -> Result<Mesh, MeshError> {
    let nb_u = nb_u.max(1);
    let nb_v = nb_v.max(1);
    let mut points = Vec::with_capacity((nb_u + 1) * (nb_v + 1));
    for i in 0..=nb_u {
        for j in 0..=nb_v {
            let s = i as f64 / nb_u as f64;
            let t = j as f64 / nb_v as f64;
            points.push(add(corner, add(scale(u, s), scale(v, t))));
        }
    }
    let at = |i: usize, j: usize| i * (nb_v + 1) + j;
    let mut faces = Vec::with_capacity(nb_u * nb_v);
    for i in 0..nb_u {
        for j in 0..nb_v {
            faces.push([at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    Mesh::new(to_array(&points), faces, name)
}

/// Hull of a barge between `x = 0` and `x = length`: both sides and the
/// bottom, without end caps, so that slices can be repeated along x.
pub fn barge_slice(
    length: f64,
    width: f64,
    draft: f64,
    nb_width: usize,
    nb_depth: usize,
    name: &str,
) -> Result<Mesh, MeshError> {
    let half = width / 2.0;
    let port = rectangle(
        [0.0, half, 0.0],
        [length, 0.0, 0.0],
        [0.0, 0.0, -draft],
        1,
        nb_depth,
        "port",
    )?;
    let starboard = rectangle(
        [0.0, -half, 0.0],
        [0.0, 0.0, -draft],
        [length, 0.0, 0.0],
        nb_depth,
        1,
        "starboard",
    )?;
    let bottom = rectangle(
        [0.0, -half, -draft],
        [0.0, width, 0.0],
        [length, 0.0, 0.0],
        nb_width,
        1,
        "bottom",
    )?;
    Mesh::merged(&[&port, &starboard, &bottom], name)
}

/// Horizontal panels on the plane `z`, with upward normals, for the free
/// surface elevation
pub fn free_surface(
    x_range: (f64, f64),
    y_range: (f64, f64),
    z: f64,
    nb_x: usize,
    nb_y: usize,
) -> Result<Mesh, MeshError> {
    rectangle(
        [x_range.0, y_range.0, z],
        [x_range.1 - x_range.0, 0.0, 0.0],
        [0.0, y_range.1 - y_range.0, 0.0],
        nb_x,
        nb_y,
        "free_surface",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_patch_normals_point_outward() {
        let mesh = sphere_patch(2.0, [0.0; 3], (PI / 2.0, PI), (0.0, 2.0 * PI), 6, 12, "hemi").unwrap();
        assert_eq!(mesh.nb_faces(), 72);
        for j in 0..mesh.nb_faces() {
            let c = mesh.center(j);
            let n = mesh.normal(j);
            assert!(c[0] * n[0] + c[1] * n[1] + c[2] * n[2] > 0.0);
            assert!(c[2] < 0.0);
        }
        // Last ring made of triangles around the pole
        let last = mesh.faces()[mesh.nb_faces() - 1];
        assert_eq!(last[2], last[3]);

        let area: f64 = mesh.areas().sum();
        assert!(area < 2.0 * PI * 4.0);
        assert_relative_eq!(area, 2.0 * PI * 4.0, max_relative = 0.05);
    }

    #[test]
    fn test_hemisphere_profile() {
        let profile = hemisphere_profile(1.5, 5);
        assert_eq!(profile.len(), 5);
        assert_relative_eq!(profile[0][0], 1.5, epsilon = 1e-14);
        assert_relative_eq!(profile[0][2], 0.0, epsilon = 1e-14);
        assert_eq!(profile[4][0], 0.0);
        assert_relative_eq!(profile[4][2], -1.5, epsilon = 1e-14);
    }

    #[test]
    fn test_barge_slice_orientation() {
        let mesh = barge_slice(2.0, 4.0, 1.0, 4, 2, "barge").unwrap();
        assert_eq!(mesh.nb_faces(), 2 + 2 + 4);
        assert_relative_eq!(mesh.normal(0)[1], 1.0, epsilon = 1e-14);
        assert_relative_eq!(mesh.normal(2)[1], -1.0, epsilon = 1e-14);
        assert_relative_eq!(mesh.normal(4)[2], -1.0, epsilon = 1e-14);
        let area: f64 = mesh.areas().sum();
        assert_relative_eq!(area, 2.0 * 2.0 * 1.0 + 2.0 * 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_free_surface_faces_up() {
        let mesh = free_surface((-1.0, 1.0), (-2.0, 2.0), 0.0, 2, 4).unwrap();
        assert_eq!(mesh.nb_faces(), 8);
        assert_eq!(mesh.normal(3), [0.0, 0.0, 1.0]);
    }
}
