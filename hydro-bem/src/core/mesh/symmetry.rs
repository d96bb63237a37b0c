//! Meshes with a symmetry
//!
//! A [`BodyMesh`] is either a plain mesh or a composite generated from a
//! sub-mesh by a reflection, a translation lattice or a rotation around an
//! axis. The copies are built by the composite itself, so they are exact
//! images of the generator. Composites nest: the generator of a composite
//! may itself be a composite.
//!
//! Each composite also keeps the flattened mesh (faces of the copies in
//! order), which is what the dense path of the assembler sees.

use super::geometry::{Axis, GEOMETRY_TOLERANCE, Plane};
use super::surface::{Mesh, MeshId};
use crate::core::error::MeshError;
use math_hydro_green::geometry::{Panels, Vec3, add, cross, norm, scale};
use ndarray::Array2;
use std::f64::consts::PI;
use std::sync::Arc;

/// Mesh of a body, with its symmetries
#[derive(Debug, Clone)]
pub enum BodyMesh {
    /// No exploitable symmetry
    Plain(Arc<Mesh>),
    /// Two halves mirrored across a vertical plane
    Reflection(ReflectionSymmetry),
    /// Copies along a horizontal translation vector
    Translation(TranslationalSymmetry),
    /// Copies rotated around an axis
    Axial(AxialSymmetry),
}

impl From<Mesh> for BodyMesh {
    fn from(mesh: Mesh) -> Self {
        BodyMesh::Plain(Arc::new(mesh))
    }
}

impl From<ReflectionSymmetry> for BodyMesh {
    fn from(mesh: ReflectionSymmetry) -> Self {
        BodyMesh::Reflection(mesh)
    }
}

impl From<TranslationalSymmetry> for BodyMesh {
    fn from(mesh: TranslationalSymmetry) -> Self {
        BodyMesh::Translation(mesh)
    }
}

impl From<AxialSymmetry> for BodyMesh {
    fn from(mesh: AxialSymmetry) -> Self {
        BodyMesh::Axial(mesh)
    }
}

impl BodyMesh {
    /// Flattened mesh, faces of the sub-meshes in order
    pub fn mesh(&self) -> &Arc<Mesh> {
        match self {
            BodyMesh::Plain(mesh) => mesh,
            BodyMesh::Reflection(m) => &m.merged,
            BodyMesh::Translation(m) => &m.merged,
            BodyMesh::Axial(m) => &m.merged,
        }
    }

    /// Identity of the mesh (of the flattened mesh for composites)
    pub fn id(&self) -> MeshId {
        self.mesh().id()
    }

    /// Name
    pub fn name(&self) -> &str {
        self.mesh().name()
    }

    /// Total number of faces
    pub fn nb_faces(&self) -> usize {
        self.mesh().nb_faces()
    }

    /// Borrowed view of the flattened panels
    pub fn panels(&self) -> Panels<'_> {
        self.mesh().panels()
    }

    /// Whether the mesh carries a symmetry
    pub fn is_symmetric(&self) -> bool {
        !matches!(self, BodyMesh::Plain(_))
    }

    /// Short description of the structure, e.g. `reflection(axial(12, plain))`
    pub fn structure(&self) -> String {
        match self {
            BodyMesh::Plain(_) => "plain".to_string(),
            BodyMesh::Reflection(m) => format!("reflection({})", m.half.structure()),
            BodyMesh::Translation(m) => {
                format!("translation({}, {})", m.slices.len(), m.slices[0].structure())
            }
            BodyMesh::Axial(m) => format!("axial({}, {})", m.slices.len(), m.slices[0].structure()),
        }
    }

    /// Mirror image, keeping the symmetry structure
    pub fn mirrored(&self, plane: &Plane, name: &str) -> Result<BodyMesh, MeshError> {
        match self {
            BodyMesh::Plain(mesh) => Ok(mesh.mirrored(plane, name).into()),
            BodyMesh::Reflection(m) => ReflectionSymmetry::build(
                m.half.mirrored(plane, &format!("{name}_half"))?,
                m.plane.mirrored(plane),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Translation(m) => TranslationalSymmetry::build(
                m.slices[0].mirrored(plane, &format!("{name}_slice"))?,
                plane.reflect_vector(m.translation),
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Axial(m) => AxialSymmetry::build(
                m.slices[0].mirrored(plane, &format!("{name}_slice"))?,
                m.axis.mirrored(plane),
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
        }
    }

    /// Translated copy, keeping the symmetry structure
    pub fn translated(&self, vector: Vec3, name: &str) -> Result<BodyMesh, MeshError> {
        match self {
            BodyMesh::Plain(mesh) => Ok(mesh.translated(vector, name).into()),
            BodyMesh::Reflection(m) => ReflectionSymmetry::build(
                m.half.translated(vector, &format!("{name}_half"))?,
                m.plane.translated(vector),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Translation(m) => TranslationalSymmetry::build(
                m.slices[0].translated(vector, &format!("{name}_slice"))?,
                m.translation,
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Axial(m) => AxialSymmetry::build(
                m.slices[0].translated(vector, &format!("{name}_slice"))?,
                m.axis.translated(vector),
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
        }
    }

    /// Rotated copy, keeping the symmetry structure
    pub fn rotated(&self, axis: &Axis, angle: f64, name: &str) -> Result<BodyMesh, MeshError> {
        match self {
            BodyMesh::Plain(mesh) => Ok(mesh.rotated(axis, angle, name).into()),
            BodyMesh::Reflection(m) => ReflectionSymmetry::build(
                m.half.rotated(axis, angle, &format!("{name}_half"))?,
                m.plane.rotated(axis, angle),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Translation(m) => TranslationalSymmetry::build(
                m.slices[0].rotated(axis, angle, &format!("{name}_slice"))?,
                axis.rotate_vector(m.translation, angle),
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
            BodyMesh::Axial(m) => AxialSymmetry::build(
                m.slices[0].rotated(axis, angle, &format!("{name}_slice"))?,
                m.axis.rotated(axis, angle),
                m.slices.len(),
                name,
            )
            .map(BodyMesh::from),
        }
    }

    /// Union of several meshes.
    ///
    /// Composites sharing the same symmetry are joined into one composite
    /// whose generator is the union of their generators; anything else
    /// gives a plain mesh.
    pub fn join(parts: &[&BodyMesh], name: &str) -> Result<BodyMesh, MeshError> {
        match parts {
            [] => return Err(MeshError::EmptyMerge),
            [single] => return Ok((*single).clone()),
            _ => {}
        }
        let reflections: Option<Vec<&ReflectionSymmetry>> = parts
            .iter()
            .map(|p| match p {
                BodyMesh::Reflection(m) => Some(m),
                _ => None,
            })
            .collect();
        if let Some(Ok(joined)) = reflections.map(|r| ReflectionSymmetry::join(&r, name)) {
            return Ok(joined.into());
        }
        let translations: Option<Vec<&TranslationalSymmetry>> = parts
            .iter()
            .map(|p| match p {
                BodyMesh::Translation(m) => Some(m),
                _ => None,
            })
            .collect();
        if let Some(Ok(joined)) = translations.map(|t| TranslationalSymmetry::join(&t, name)) {
            return Ok(joined.into());
        }
        let axials: Option<Vec<&AxialSymmetry>> = parts
            .iter()
            .map(|p| match p {
                BodyMesh::Axial(m) => Some(m),
                _ => None,
            })
            .collect();
        if let Some(Ok(joined)) = axials.map(|a| AxialSymmetry::join(&a, name)) {
            return Ok(joined.into());
        }

        let meshes: Vec<&Mesh> = parts.iter().map(|p| p.mesh().as_ref()).collect();
        Ok(Mesh::merged(&meshes, name)?.into())
    }
}

fn mismatch(first: &Arc<Mesh>, other: &Arc<Mesh>, parameter: &'static str) -> MeshError {
    MeshError::SymmetryMismatch {
        first: first.name().to_string(),
        other: other.name().to_string(),
        parameter,
    }
}

fn merge_flat(parts: &[Arc<BodyMesh>], name: &str) -> Result<Arc<Mesh>, MeshError> {
    let meshes: Vec<&Mesh> = parts.iter().map(|p| p.mesh().as_ref()).collect();
    Ok(Arc::new(Mesh::merged(&meshes, name)?))
}

/// Body made of a half and its mirror image across a vertical plane
#[derive(Debug, Clone)]
pub struct ReflectionSymmetry {
    plane: Plane,
    half: Arc<BodyMesh>,
    mirror: Arc<BodyMesh>,
    merged: Arc<Mesh>,
}

impl ReflectionSymmetry {
    /// Complete `half` with its mirror image. The plane must be vertical so
    /// that the free surface is symmetric too.
    pub fn new(half: impl Into<BodyMesh>, plane: Plane) -> Result<Self, MeshError> {
        if !plane.is_vertical() {
            return Err(MeshError::NonVerticalPlane {
                normal: plane.normal,
            });
        }
        let half = half.into();
        let name = format!("{}_reflected", half.name());
        Self::build(half, plane, &name)
    }

    fn build(half: BodyMesh, plane: Plane, name: &str) -> Result<Self, MeshError> {
        let mirror = half.mirrored(&plane, &format!("{}_mirror", half.name()))?;
        let parts = [Arc::new(half), Arc::new(mirror)];
        let merged = merge_flat(&parts, name)?;
        let [half, mirror] = parts;
        Ok(Self {
            plane,
            half,
            mirror,
            merged,
        })
    }

    /// Symmetry plane
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Generating half
    pub fn half(&self) -> &Arc<BodyMesh> {
        &self.half
    }

    /// Mirror image of the half
    pub fn mirror(&self) -> &Arc<BodyMesh> {
        &self.mirror
    }

    /// Join bodies mirrored across the same plane into one body whose
    /// half is the union of their halves
    pub fn join(meshes: &[&ReflectionSymmetry], name: &str) -> Result<Self, MeshError> {
        let Some((first, rest)) = meshes.split_first() else {
            return Err(MeshError::EmptyMerge);
        };
        if let Some(other) = rest.iter().find(|m| !m.plane.is_close(&first.plane)) {
            return Err(mismatch(&first.merged, &other.merged, "planes"));
        }
        let halves: Vec<&BodyMesh> = meshes.iter().map(|m| m.half.as_ref()).collect();
        let half = BodyMesh::join(&halves, &format!("{name}_half"))?;
        Self::build(half, first.plane, name)
    }
}

/// Body made of copies of a slice translated by multiples of a vector
#[derive(Debug, Clone)]
pub struct TranslationalSymmetry {
    translation: Vec3,
    slices: Vec<Arc<BodyMesh>>,
    merged: Arc<Mesh>,
}

impl TranslationalSymmetry {
    /// `nb_repetitions` copies of `slice`, the k-th translated by
    /// `k × translation`. The translation must be horizontal and non-zero.
    pub fn new(
        slice: impl Into<BodyMesh>,
        translation: Vec3,
        nb_repetitions: usize,
    ) -> Result<Self, MeshError> {
        if norm(translation) <= GEOMETRY_TOLERANCE
            || translation[2].abs() > GEOMETRY_TOLERANCE * norm(translation)
        {
            return Err(MeshError::InvalidTranslation {
                vector: translation,
            });
        }
        if nb_repetitions == 0 {
            return Err(MeshError::InvalidRepetitions(nb_repetitions));
        }
        let slice = slice.into();
        let name = format!("{}_array", slice.name());
        Self::build(slice, translation, nb_repetitions, &name)
    }

    fn build(
        slice: BodyMesh,
        translation: Vec3,
        nb_repetitions: usize,
        name: &str,
    ) -> Result<Self, MeshError> {
        let mut slices = Vec::with_capacity(nb_repetitions);
        for k in 1..nb_repetitions {
            let copy = slice.translated(
                scale(translation, k as f64),
                &format!("{}_{}", slice.name(), k),
            )?;
            slices.push(Arc::new(copy));
        }
        slices.insert(0, Arc::new(slice));
        let merged = merge_flat(&slices, name)?;
        Ok(Self {
            translation,
            slices,
            merged,
        })
    }

    /// Translation between consecutive slices
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Slices, the first one being the generator
    pub fn slices(&self) -> &[Arc<BodyMesh>] {
        &self.slices
    }

    /// Same lattice (same vector and number of copies)
    pub fn same_lattice(&self, other: &TranslationalSymmetry) -> bool {
        self.slices.len() == other.slices.len()
            && (0..3).all(|k| (self.translation[k] - other.translation[k]).abs() < GEOMETRY_TOLERANCE)
    }

    /// Join arrays on the same lattice into one array whose slice is the
    /// union of their first slices
    pub fn join(meshes: &[&TranslationalSymmetry], name: &str) -> Result<Self, MeshError> {
        let Some((first, rest)) = meshes.split_first() else {
            return Err(MeshError::EmptyMerge);
        };
        if let Some(other) = rest.iter().find(|m| !m.same_lattice(first)) {
            return Err(mismatch(&first.merged, &other.merged, "lattices"));
        }
        let slices: Vec<&BodyMesh> = meshes.iter().map(|m| m.slices[0].as_ref()).collect();
        let slice = BodyMesh::join(&slices, &format!("{name}_slice"))?;
        Self::build(slice, first.translation, first.slices.len(), name)
    }
}

fn warn_if_not_vertical(axis: &Axis) {
    if !axis.is_vertical() {
        log::warn!(
            "Rotation axis {:?} is not vertical: the axial symmetry is ignored with a free surface",
            axis.vector
        );
    }
}

/// Body made of copies of a slice rotated by `2π/N` around an axis
#[derive(Debug, Clone)]
pub struct AxialSymmetry {
    axis: Axis,
    slices: Vec<Arc<BodyMesh>>,
    merged: Arc<Mesh>,
}

impl AxialSymmetry {
    /// `nb_repetitions` copies of `slice` rotated by `2πk/N` around `axis`.
    ///
    /// A non vertical axis is accepted, but the symmetry can then only be
    /// used without free surface.
    pub fn new(slice: impl Into<BodyMesh>, axis: Axis, nb_repetitions: usize) -> Result<Self, MeshError> {
        if nb_repetitions == 0 {
            return Err(MeshError::InvalidRepetitions(nb_repetitions));
        }
        warn_if_not_vertical(&axis);
        let slice = slice.into();
        let name = format!("{}_revolved", slice.name());
        Self::build(slice, axis, nb_repetitions, &name)
    }

    /// Surface of revolution of `profile` around `axis`, discretized in
    /// `nb_repetitions` angular slices.
    ///
    /// Points of the profile on the axis give triangles.
    pub fn from_profile(
        profile: &[Vec3],
        axis: Axis,
        nb_repetitions: usize,
        name: &str,
    ) -> Result<Self, MeshError> {
        if profile.len() < 2 {
            return Err(MeshError::ProfileTooShort(profile.len()));
        }
        if nb_repetitions == 0 {
            return Err(MeshError::InvalidRepetitions(nb_repetitions));
        }
        let angle = 2.0 * PI / nb_repetitions as f64;

        let n = profile.len();
        let mut points: Vec<Vec3> = profile.to_vec();
        let mut rotated_index = Vec::with_capacity(n);
        for (i, &p) in profile.iter().enumerate() {
            if axis.distance(p) < GEOMETRY_TOLERANCE {
                rotated_index.push(i);
            } else {
                rotated_index.push(points.len());
                points.push(axis.rotate_point(p, angle));
            }
        }
        let faces: Vec<[usize; 4]> = (0..n - 1)
            .map(|i| [i, i + 1, rotated_index[i + 1], rotated_index[i]])
            .collect();

        let mut vertices = Array2::zeros((points.len(), 3));
        for (i, p) in points.iter().enumerate() {
            for k in 0..3 {
                vertices[[i, k]] = p[k];
            }
        }
        let slice = Mesh::new(vertices, faces, format!("{name}_slice"))?;
        warn_if_not_vertical(&axis);
        Self::build(slice.into(), axis, nb_repetitions, name)
    }

    /// Surface of revolution of the curve `r(z)` sampled at `z_values`.
    ///
    /// `z` is measured along the axis from `axis.point` and `r` away from
    /// it, towards +x for a vertical axis.
    pub fn from_profile_fn(
        radius: impl Fn(f64) -> f64,
        z_values: &[f64],
        axis: Axis,
        nb_repetitions: usize,
        name: &str,
    ) -> Result<Self, MeshError> {
        let side = if (axis.vector[1].abs() - 1.0).abs() < GEOMETRY_TOLERANCE {
            cross(axis.vector, [0.0, 0.0, 1.0])
        } else {
            cross([0.0, 1.0, 0.0], axis.vector)
        };
        let side = scale(side, 1.0 / norm(side));
        let profile: Vec<Vec3> = z_values
            .iter()
            .map(|&z| {
                add(
                    add(axis.point, scale(axis.vector, z)),
                    scale(side, radius(z)),
                )
            })
            .collect();
        Self::from_profile(&profile, axis, nb_repetitions, name)
    }

    fn build(
        slice: BodyMesh,
        axis: Axis,
        nb_repetitions: usize,
        name: &str,
    ) -> Result<Self, MeshError> {
        let angle = 2.0 * PI / nb_repetitions as f64;
        let mut slices = Vec::with_capacity(nb_repetitions);
        for k in 1..nb_repetitions {
            let copy =
                slice.rotated(&axis, k as f64 * angle, &format!("{}_{}", slice.name(), k))?;
            slices.push(Arc::new(copy));
        }
        slices.insert(0, Arc::new(slice));
        let merged = merge_flat(&slices, name)?;
        Ok(Self {
            axis,
            slices,
            merged,
        })
    }

    /// Rotation axis
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Slices, the first one being the generator
    pub fn slices(&self) -> &[Arc<BodyMesh>] {
        &self.slices
    }

    /// Join bodies revolved around the same axis with the same number of
    /// slices into one body whose slice is the union of their first slices
    pub fn join(meshes: &[&AxialSymmetry], name: &str) -> Result<Self, MeshError> {
        let Some((first, rest)) = meshes.split_first() else {
            return Err(MeshError::EmptyMerge);
        };
        if let Some(other) = rest.iter().find(|m| !m.axis.is_close(&first.axis)) {
            return Err(mismatch(&first.merged, &other.merged, "axes"));
        }
        if let Some(other) = rest.iter().find(|m| m.slices.len() != first.slices.len()) {
            return Err(mismatch(&first.merged, &other.merged, "numbers of slices"));
        }
        let slices: Vec<&BodyMesh> = meshes.iter().map(|m| m.slices[0].as_ref()).collect();
        let slice = BodyMesh::join(&slices, &format!("{name}_slice"))?;
        Self::build(slice, first.axis, first.slices.len(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn panel() -> Mesh {
        let vertices = array![
            [1.0, 0.2, -0.5],
            [1.0, 0.2, -1.5],
            [1.0, 1.2, -1.5],
            [1.0, 1.2, -0.5],
        ];
        Mesh::new(vertices, vec![[0, 1, 2, 3]], "panel").unwrap()
    }

    #[test]
    fn test_reflection_builds_mirror() {
        let body = ReflectionSymmetry::new(panel(), Plane::xoz()).unwrap();
        assert_eq!(body.half().nb_faces(), 1);
        let mirror = body.mirror().mesh();
        assert_relative_eq!(mirror.center(0)[1], -0.7, epsilon = 1e-14);
        assert_relative_eq!(mirror.normal(0)[0], panel().normal(0)[0], epsilon = 1e-14);

        let body = BodyMesh::from(body);
        assert_eq!(body.nb_faces(), 2);
        assert_eq!(body.structure(), "reflection(plain)");
    }

    #[test]
    fn test_malformed_symmetries_are_rejected() {
        let horizontal = Plane::new([0.0, 0.0, 1.0], [0.0; 3]).unwrap();
        assert!(matches!(
            ReflectionSymmetry::new(panel(), horizontal),
            Err(MeshError::NonVerticalPlane { .. })
        ));
        assert!(matches!(
            TranslationalSymmetry::new(panel(), [1.0, 0.0, 0.5], 3),
            Err(MeshError::InvalidTranslation { .. })
        ));
        assert!(matches!(
            TranslationalSymmetry::new(panel(), [0.0, 0.0, 0.0], 3),
            Err(MeshError::InvalidTranslation { .. })
        ));
        assert_eq!(
            TranslationalSymmetry::new(panel(), [1.0, 0.0, 0.0], 0).unwrap_err(),
            MeshError::InvalidRepetitions(0)
        );
        assert_eq!(
            AxialSymmetry::new(panel(), Axis::oz(), 0).unwrap_err(),
            MeshError::InvalidRepetitions(0)
        );
    }

    #[test]
    fn test_translation_slices() {
        let body = TranslationalSymmetry::new(panel(), [2.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(body.slices().len(), 3);
        assert_relative_eq!(body.slices()[2].mesh().center(0)[0], 5.0, epsilon = 1e-14);
        let other = TranslationalSymmetry::new(panel(), [2.0, 0.0, 0.0], 3).unwrap();
        assert!(body.same_lattice(&other));
        let shorter = TranslationalSymmetry::new(panel(), [2.0, 0.0, 0.0], 2).unwrap();
        assert!(!body.same_lattice(&shorter));
    }

    #[test]
    fn test_profile_revolution() {
        // Vertical cylinder wall of radius 1 closed by a bottom disk
        let profile = [[1.0, 0.0, 0.0], [1.0, 0.0, -1.0], [0.0, 0.0, -1.0]];
        let body = AxialSymmetry::from_profile(&profile, Axis::oz(), 8, "cylinder").unwrap();
        let mesh = BodyMesh::from(body.clone());
        assert_eq!(mesh.nb_faces(), 16);

        let slice = body.slices()[0].mesh();
        assert_eq!(slice.faces()[1][3], slice.faces()[1][2]);
        // Outward normals: radial on the wall, downward at the bottom
        let half_angle = PI / 8.0;
        assert_relative_eq!(slice.normal(0)[0], half_angle.cos(), epsilon = 1e-12);
        assert_relative_eq!(slice.normal(0)[1], half_angle.sin(), epsilon = 1e-12);
        assert_relative_eq!(slice.normal(1)[2], -1.0, epsilon = 1e-12);

        let total: f64 = mesh.mesh().areas().sum();
        let exact = 8.0 * (2.0 * half_angle.sin()) + 8.0 * 0.5 * (2.0 * half_angle).sin();
        assert_relative_eq!(total, exact, epsilon = 1e-12);
    }

    #[test]
    fn test_profile_function() {
        let z_values = [0.0, -0.5, -1.0];
        let from_fn =
            AxialSymmetry::from_profile_fn(|_| 1.0, &z_values, Axis::oz(), 6, "wall").unwrap();
        let profile = [[1.0, 0.0, 0.0], [1.0, 0.0, -0.5], [1.0, 0.0, -1.0]];
        let from_points = AxialSymmetry::from_profile(&profile, Axis::oz(), 6, "wall").unwrap();
        let (a, b) = (BodyMesh::from(from_fn), BodyMesh::from(from_points));
        assert_eq!(a.nb_faces(), b.nb_faces());
        for j in 0..a.nb_faces() {
            for k in 0..3 {
                assert_relative_eq!(a.mesh().center(j)[k], b.mesh().center(j)[k], epsilon = 1e-14);
            }
        }

        // Cone around a shifted vertical axis, apex on the axis
        let axis = Axis::new([0.0, 0.0, 1.0], [2.0, 0.0, 0.0]).unwrap();
        let cone = AxialSymmetry::from_profile_fn(|z| 1.0 + z, &[0.0, -1.0], axis, 4, "cone").unwrap();
        let slice = cone.slices()[0].mesh();
        let first = slice.vertices().row(0);
        assert_eq!([first[0], first[1], first[2]], [3.0, 0.0, 0.0]);
        assert_eq!(slice.faces()[0][2], slice.faces()[0][3]);
    }

    #[test]
    fn test_join_reflections() {
        let a = ReflectionSymmetry::new(panel(), Plane::xoz()).unwrap();
        let b = ReflectionSymmetry::new(panel().translated([3.0, 0.0, 0.0], "other"), Plane::xoz())
            .unwrap();
        let joined = ReflectionSymmetry::join(&[&a, &b], "pair").unwrap();
        assert_eq!(joined.half().nb_faces(), 2);
        assert_relative_eq!(joined.mirror().mesh().center(1)[0], 4.0, epsilon = 1e-14);
        assert_relative_eq!(joined.mirror().mesh().center(1)[1], -0.7, epsilon = 1e-14);
        let joined = BodyMesh::from(joined);
        assert_eq!(joined.nb_faces(), 4);
        assert_eq!(joined.name(), "pair");
        assert_eq!(joined.structure(), "reflection(plain)");

        let c = ReflectionSymmetry::new(panel(), Plane::yoz()).unwrap();
        assert!(matches!(
            ReflectionSymmetry::join(&[&a, &c], "pair"),
            Err(MeshError::SymmetryMismatch { parameter: "planes", .. })
        ));
        assert_eq!(
            ReflectionSymmetry::join(&[], "none").unwrap_err(),
            MeshError::EmptyMerge
        );
    }

    #[test]
    fn test_join_keeps_nested_structure() {
        let body = |dy: f64, name: &str| {
            let quarter =
                ReflectionSymmetry::new(panel().translated([0.0, dy, 0.0], name), Plane::yoz()).unwrap();
            BodyMesh::from(ReflectionSymmetry::new(quarter, Plane::xoz()).unwrap())
        };
        let (a, b) = (body(0.0, "a"), body(2.0, "b"));
        let joined = BodyMesh::join(&[&a, &b], "both").unwrap();
        assert_eq!(joined.structure(), "reflection(reflection(plain))");
        assert_eq!(joined.nb_faces(), 8);
    }

    #[test]
    fn test_join_lattices_and_axes() {
        let a = TranslationalSymmetry::new(panel(), [2.0, 0.0, 0.0], 3).unwrap();
        let b = TranslationalSymmetry::new(panel().translated([0.0, 4.0, 0.0], "b"), [2.0, 0.0, 0.0], 3)
            .unwrap();
        let joined = TranslationalSymmetry::join(&[&a, &b], "rows").unwrap();
        assert_eq!(joined.slices().len(), 3);
        assert_eq!(joined.slices()[0].nb_faces(), 2);
        let shorter = TranslationalSymmetry::new(panel(), [2.0, 0.0, 0.0], 2).unwrap();
        assert!(matches!(
            TranslationalSymmetry::join(&[&a, &shorter], "rows"),
            Err(MeshError::SymmetryMismatch { parameter: "lattices", .. })
        ));

        let inner = AxialSymmetry::new(panel(), Axis::oz(), 4).unwrap();
        let outer = AxialSymmetry::new(panel().translated([2.0, 0.0, 0.0], "outer"), Axis::oz(), 4)
            .unwrap();
        let joined = AxialSymmetry::join(&[&inner, &outer], "rings").unwrap();
        assert_eq!(BodyMesh::from(joined).nb_faces(), 8);
        let finer = AxialSymmetry::new(panel(), Axis::oz(), 6).unwrap();
        assert!(matches!(
            AxialSymmetry::join(&[&inner, &finer], "rings"),
            Err(MeshError::SymmetryMismatch { parameter: "numbers of slices", .. })
        ));
        let shifted = AxialSymmetry::new(panel(), Axis::new([0.0, 0.0, 1.0], [5.0, 0.0, 0.0]).unwrap(), 4)
            .unwrap();
        assert!(matches!(
            AxialSymmetry::join(&[&inner, &shifted], "rings"),
            Err(MeshError::SymmetryMismatch { parameter: "axes", .. })
        ));

        // Different symmetries give a plain union
        let mixed = BodyMesh::join(&[&BodyMesh::from(inner), &BodyMesh::from(a)], "mixed").unwrap();
        assert!(!mixed.is_symmetric());
        assert_eq!(mixed.nb_faces(), 7);
    }

    #[test]
    fn test_nested_mirror_keeps_structure() {
        let quarter = ReflectionSymmetry::new(panel(), Plane::yoz()).unwrap();
        let half = ReflectionSymmetry::new(quarter, Plane::xoz()).unwrap();
        match half.mirror().as_ref() {
            BodyMesh::Reflection(inner) => assert!(inner.plane().is_close(&Plane::yoz())),
            other => panic!("unexpected structure {}", other.structure()),
        }
        assert_eq!(BodyMesh::from(half).nb_faces(), 4);
    }
}
