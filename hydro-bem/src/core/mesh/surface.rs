//! Panel meshes of floating bodies
//!
//! Faces are quadrilaterals stored as four vertex indices; triangles repeat
//! their last vertex (`[a, b, c, c]`). Vertices are ordered so that the
//! normal `(v₂ − v₀) × (v₃ − v₁)` points out of the body, into the fluid.

use super::geometry::{Axis, Plane};
use crate::core::error::MeshError;
use math_hydro_green::geometry::{Panels, Vec3, add, cross, norm, scale, sub};
use ndarray::{Array1, Array2};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a mesh.
///
/// Two meshes built separately never share an id, even when they are
/// geometrically identical; caches rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    /// A fresh identity
    pub fn new() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for MeshId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-face properties derived from the vertices
#[derive(Debug, Clone)]
struct FaceProperties {
    centers: Array2<f64>,
    normals: Array2<f64>,
    areas: Array1<f64>,
    radiuses: Array1<f64>,
}

fn vertex(vertices: &Array2<f64>, i: usize) -> Vec3 {
    [vertices[[i, 0]], vertices[[i, 1]], vertices[[i, 2]]]
}

fn triangle(a: Vec3, b: Vec3, c: Vec3) -> (f64, Vec3) {
    let area = 0.5 * norm(cross(sub(b, a), sub(c, a)));
    let centroid = scale(add(add(a, b), c), 1.0 / 3.0);
    (area, centroid)
}

/// Bring a face to canonical form: four distinct vertices, or a triangle
/// `[a, b, c, c]`.
fn canonical_face(face: [usize; 4], index: usize) -> Result<[usize; 4], MeshError> {
    let mut distinct: Vec<usize> = Vec::with_capacity(4);
    for &v in &face {
        if distinct.last() != Some(&v) {
            distinct.push(v);
        }
    }
    while distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }
    match distinct[..] {
        [a, b, c, d] => Ok([a, b, c, d]),
        [a, b, c] => Ok([a, b, c, c]),
        _ => Err(MeshError::DegenerateFace { face: index }),
    }
}

fn compute_properties(
    vertices: &Array2<f64>,
    faces: &[[usize; 4]],
) -> Result<FaceProperties, MeshError> {
    let n = faces.len();
    let mut centers = Array2::zeros((n, 3));
    let mut normals = Array2::zeros((n, 3));
    let mut areas = Array1::zeros(n);
    let mut radiuses = Array1::zeros(n);

    for (j, face) in faces.iter().enumerate() {
        let [a, b, c, d] = face.map(|i| vertex(vertices, i));
        let normal = cross(sub(c, a), sub(d, b));
        let length = norm(normal);

        let (area_1, centroid_1) = triangle(a, b, c);
        let (area_2, centroid_2) = triangle(a, c, d);
        let area = area_1 + area_2;
        if length <= f64::MIN_POSITIVE || area <= f64::MIN_POSITIVE {
            return Err(MeshError::DegenerateFace { face: j });
        }
        let center = scale(
            add(scale(centroid_1, area_1), scale(centroid_2, area_2)),
            1.0 / area,
        );
        let radius = [a, b, c, d]
            .iter()
            .map(|&v| norm(sub(v, center)))
            .fold(0.0, f64::max);

        for k in 0..3 {
            centers[[j, k]] = center[k];
            normals[[j, k]] = normal[k] / length;
        }
        areas[j] = area;
        radiuses[j] = radius;
    }

    Ok(FaceProperties {
        centers,
        normals,
        areas,
        radiuses,
    })
}

/// Mesh of planar panels with precomputed face properties
#[derive(Debug, Clone)]
pub struct Mesh {
    id: MeshId,
    name: String,
    vertices: Array2<f64>,
    faces: Vec<[usize; 4]>,
    properties: FaceProperties,
}

impl Mesh {
    /// Build a mesh from an `(n, 3)` vertex array and faces.
    ///
    /// Faces with a repeated vertex are stored as triangles; faces with
    /// fewer than three distinct vertices or no area are rejected.
    pub fn new(
        vertices: Array2<f64>,
        faces: Vec<[usize; 4]>,
        name: impl Into<String>,
    ) -> Result<Self, MeshError> {
        if vertices.ncols() != 3 {
            return Err(MeshError::VertexShape {
                rows: vertices.nrows(),
                cols: vertices.ncols(),
            });
        }
        let nb_vertices = vertices.nrows();
        let mut canonical = Vec::with_capacity(faces.len());
        for (index, face) in faces.into_iter().enumerate() {
            if let Some(&vertex) = face.iter().find(|&&v| v >= nb_vertices) {
                return Err(MeshError::VertexOutOfRange {
                    face: index,
                    vertex,
                    nb_vertices,
                });
            }
            canonical.push(canonical_face(face, index)?);
        }
        let properties = compute_properties(&vertices, &canonical)?;
        Ok(Self {
            id: MeshId::new(),
            name: name.into(),
            vertices,
            faces: canonical,
            properties,
        })
    }

    /// Same geometry under a new identity, with vertices mapped by `f`
    /// and faces optionally reordered.
    fn transformed(
        &self,
        name: String,
        f: impl Fn(Vec3) -> Vec3,
        reverse_faces: bool,
    ) -> Self {
        let mut vertices = Array2::zeros(self.vertices.raw_dim());
        for i in 0..self.vertices.nrows() {
            let v = f(vertex(&self.vertices, i));
            for k in 0..3 {
                vertices[[i, k]] = v[k];
            }
        }
        let faces: Vec<[usize; 4]> = if reverse_faces {
            self.faces
                .iter()
                .map(|&[a, b, c, d]| if c == d { [a, c, b, b] } else { [a, d, c, b] })
                .collect()
        } else {
            self.faces.clone()
        };
        let mut properties = self.properties.clone();
        for j in 0..faces.len() {
            let center = f(self.center(j));
            let shifted = f(add(self.center(j), self.normal(j)));
            let normal = sub(shifted, center);
            let length = norm(normal);
            for k in 0..3 {
                properties.centers[[j, k]] = center[k];
                properties.normals[[j, k]] = normal[k] / length;
            }
        }
        Self {
            id: MeshId::new(),
            name,
            vertices,
            faces,
            properties,
        }
    }

    /// Mirror image; faces are reordered to keep outward normals
    pub fn mirrored(&self, plane: &Plane, name: impl Into<String>) -> Self {
        self.transformed(name.into(), |v| plane.reflect_point(v), true)
    }

    /// Translated copy
    pub fn translated(&self, vector: Vec3, name: impl Into<String>) -> Self {
        self.transformed(name.into(), |v| add(v, vector), false)
    }

    /// Copy rotated by `angle` around `axis`
    pub fn rotated(&self, axis: &Axis, angle: f64, name: impl Into<String>) -> Self {
        self.transformed(name.into(), |v| axis.rotate_point(v, angle), false)
    }

    /// Concatenation of several meshes, faces in order. Face properties are
    /// copied, not recomputed.
    pub fn merged(meshes: &[&Mesh], name: impl Into<String>) -> Result<Self, MeshError> {
        if meshes.is_empty() {
            return Err(MeshError::EmptyMerge);
        }
        let nb_vertices: usize = meshes.iter().map(|m| m.nb_vertices()).sum();
        let nb_faces: usize = meshes.iter().map(|m| m.nb_faces()).sum();

        let mut vertices = Array2::zeros((nb_vertices, 3));
        let mut faces = Vec::with_capacity(nb_faces);
        let mut centers = Array2::zeros((nb_faces, 3));
        let mut normals = Array2::zeros((nb_faces, 3));
        let mut areas = Array1::zeros(nb_faces);
        let mut radiuses = Array1::zeros(nb_faces);

        let mut vertex_offset = 0;
        let mut face_offset = 0;
        for mesh in meshes {
            for i in 0..mesh.nb_vertices() {
                for k in 0..3 {
                    vertices[[vertex_offset + i, k]] = mesh.vertices[[i, k]];
                }
            }
            for (j, face) in mesh.faces.iter().enumerate() {
                faces.push(face.map(|v| v + vertex_offset));
                for k in 0..3 {
                    centers[[face_offset + j, k]] = mesh.properties.centers[[j, k]];
                    normals[[face_offset + j, k]] = mesh.properties.normals[[j, k]];
                }
                areas[face_offset + j] = mesh.properties.areas[j];
                radiuses[face_offset + j] = mesh.properties.radiuses[j];
            }
            vertex_offset += mesh.nb_vertices();
            face_offset += mesh.nb_faces();
        }

        Ok(Self {
            id: MeshId::new(),
            name: name.into(),
            vertices,
            faces,
            properties: FaceProperties {
                centers,
                normals,
                areas,
                radiuses,
            },
        })
    }

    /// Identity of this mesh
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Name given at construction
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of faces
    pub fn nb_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices
    pub fn nb_vertices(&self) -> usize {
        self.vertices.nrows()
    }

    /// Vertex coordinates, `(nb_vertices, 3)`
    pub fn vertices(&self) -> &Array2<f64> {
        &self.vertices
    }

    /// Faces as four vertex indices
    pub fn faces(&self) -> &[[usize; 4]] {
        &self.faces
    }

    /// Face centers, `(nb_faces, 3)`
    pub fn centers(&self) -> &Array2<f64> {
        &self.properties.centers
    }

    /// Outward unit normals, `(nb_faces, 3)`
    pub fn normals(&self) -> &Array2<f64> {
        &self.properties.normals
    }

    /// Face areas
    pub fn areas(&self) -> &Array1<f64> {
        &self.properties.areas
    }

    /// Largest distance from a face center to its vertices
    pub fn radiuses(&self) -> &Array1<f64> {
        &self.properties.radiuses
    }

    /// Center of face `j`
    pub fn center(&self, j: usize) -> Vec3 {
        let c = &self.properties.centers;
        [c[[j, 0]], c[[j, 1]], c[[j, 2]]]
    }

    /// Normal of face `j`
    pub fn normal(&self, j: usize) -> Vec3 {
        let n = &self.properties.normals;
        [n[[j, 0]], n[[j, 1]], n[[j, 2]]]
    }

    /// Borrowed view for the Green function
    pub fn panels(&self) -> Panels<'_> {
        Panels {
            vertices: self.vertices.view(),
            faces: &self.faces,
            centers: self.properties.centers.view(),
            normals: self.properties.normals.view(),
            areas: self.properties.areas.view(),
            radiuses: self.properties.radiuses.view(),
        }
    }

    /// Face centers and normals mirrored across the horizontal plane at
    /// height `z`, as receivers of the image term
    pub fn reflected_collocation(&self, z: f64) -> (Array2<f64>, Array2<f64>) {
        let mut points = self.properties.centers.clone();
        let mut normals = self.properties.normals.clone();
        points.column_mut(2).mapv_inplace(|c| 2.0 * z - c);
        normals.column_mut(2).mapv_inplace(|n| -n);
        (points, normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_square() -> Mesh {
        let vertices = array![
            [0.0, 0.0, -1.0],
            [0.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, 0.0, -1.0],
        ];
        Mesh::new(vertices, vec![[0, 1, 2, 3]], "square").unwrap()
    }

    #[test]
    fn test_face_properties() {
        let mesh = unit_square();
        assert_eq!(mesh.nb_faces(), 1);
        assert_relative_eq!(mesh.areas()[0], 1.0, epsilon = 1e-14);
        for (c, expected) in mesh.center(0).iter().zip([0.5, 0.5, -1.0]) {
            assert_relative_eq!(*c, expected, epsilon = 1e-14);
        }
        assert_eq!(mesh.normal(0), [0.0, 0.0, -1.0]);
        assert_relative_eq!(mesh.radiuses()[0], 0.5_f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_triangles_are_canonical() {
        let vertices = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mesh = Mesh::new(vertices.clone(), vec![[0, 1, 1, 2], [0, 1, 2, 0]], "tri").unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2, 2], [0, 1, 2, 2]]);
        assert_relative_eq!(mesh.areas()[0], 0.5, epsilon = 1e-14);
        assert_eq!(mesh.normal(0), [0.0, 0.0, 1.0]);
        assert_relative_eq!(mesh.center(0)[0], 1.0 / 3.0, epsilon = 1e-14);

        assert_eq!(
            Mesh::new(vertices.clone(), vec![[0, 1, 1, 0]], "bad").unwrap_err(),
            MeshError::DegenerateFace { face: 0 }
        );
        assert!(matches!(
            Mesh::new(vertices, vec![[0, 1, 2, 7]], "bad"),
            Err(MeshError::VertexOutOfRange { vertex: 7, .. })
        ));
    }

    #[test]
    fn test_mirror_keeps_outward_normals() {
        let vertices = array![
            [0.5, 0.0, -1.0],
            [0.5, 1.0, -1.0],
            [0.5, 1.0, -2.0],
            [0.5, 0.0, -2.0],
        ];
        let mesh = Mesh::new(vertices, vec![[0, 1, 2, 3], [0, 1, 2, 2]], "wall").unwrap();
        assert_relative_eq!(mesh.normal(0)[0], -1.0, epsilon = 1e-14);

        let mirror = mesh.mirrored(&Plane::yoz(), "mirror");
        assert_ne!(mirror.id(), mesh.id());
        // Recomputing from the reordered faces gives the mirrored normals
        let rebuilt = Mesh::new(mirror.vertices().clone(), mirror.faces().to_vec(), "x").unwrap();
        for j in 0..2 {
            assert_relative_eq!(mirror.normal(j)[0], 1.0, epsilon = 1e-14);
            for k in 0..3 {
                assert_relative_eq!(rebuilt.normal(j)[k], mirror.normal(j)[k], epsilon = 1e-14);
                assert_relative_eq!(rebuilt.center(j)[k], mirror.center(j)[k], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_merge_and_translate() {
        let a = unit_square();
        let b = a.translated([2.0, 0.0, 0.0], "b");
        assert_relative_eq!(b.center(0)[0], 2.5, epsilon = 1e-14);
        let merged = Mesh::merged(&[&a, &b], "ab").unwrap();
        assert_eq!(merged.nb_faces(), 2);
        assert_eq!(merged.faces()[1], [4, 5, 6, 7]);
        assert_eq!(merged.center(1), b.center(0));
        assert_eq!(Mesh::merged(&[], "none").unwrap_err(), MeshError::EmptyMerge);
    }

    #[test]
    fn test_reflected_collocation() {
        let mesh = unit_square();
        let (points, normals) = mesh.reflected_collocation(0.0);
        assert_eq!(points[[0, 2]], 1.0);
        assert_eq!(normals[[0, 2]], 1.0);
        let (points, _) = mesh.reflected_collocation(-10.0);
        assert_eq!(points[[0, 2]], -19.0);
    }
}
