//! Panel geometry seen by the Green function
//!
//! The kernels work on borrowed views of the mesh arrays: sources are full
//! panels (vertices, centers, normals, areas, radii), receivers are
//! collocation points with the normal used for the normal derivative.

use ndarray::{ArrayView1, ArrayView2};

/// 3D vector
pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, factor: f64) -> Vec3 {
    [a[0] * factor, a[1] * factor, a[2] * factor]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn row(array: &ArrayView2<'_, f64>, i: usize) -> Vec3 {
    [array[[i, 0]], array[[i, 1]], array[[i, 2]]]
}

/// Source panels: a mesh's faces with their precomputed properties.
///
/// Faces are stored as four vertex indices; triangles repeat their last
/// vertex.
#[derive(Debug, Clone, Copy)]
pub struct Panels<'a> {
    pub vertices: ArrayView2<'a, f64>,
    pub faces: &'a [[usize; 4]],
    pub centers: ArrayView2<'a, f64>,
    pub normals: ArrayView2<'a, f64>,
    pub areas: ArrayView1<'a, f64>,
    pub radiuses: ArrayView1<'a, f64>,
}

impl<'a> Panels<'a> {
    pub fn nb_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn center(&self, j: usize) -> Vec3 {
        row(&self.centers, j)
    }

    pub fn normal(&self, j: usize) -> Vec3 {
        row(&self.normals, j)
    }

    /// Distinct vertices of face `j`, in order. Returns the buffer and the
    /// number of valid entries (3 or 4).
    pub fn polygon(&self, j: usize) -> ([Vec3; 4], usize) {
        let face = self.faces[j];
        let mut corners = [[0.0; 3]; 4];
        let mut count = 0;
        for (k, &index) in face.iter().enumerate() {
            if k > 0 && index == face[k - 1] {
                continue;
            }
            if k == 3 && index == face[0] {
                continue;
            }
            corners[count] = row(&self.vertices, index);
            count += 1;
        }
        (corners, count)
    }
}

/// Receiver points and the normals along which derivatives are taken
#[derive(Debug, Clone, Copy)]
pub struct Collocation<'a> {
    pub points: ArrayView2<'a, f64>,
    pub normals: ArrayView2<'a, f64>,
}

impl<'a> Collocation<'a> {
    /// Collocation at the face centers of a panel set
    pub fn from_panels(panels: &Panels<'a>) -> Self {
        Self {
            points: panels.centers,
            normals: panels.normals,
        }
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn point(&self, i: usize) -> Vec3 {
        row(&self.points, i)
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        row(&self.normals, i)
    }
}
