//! Planes and axes used by the symmetric meshes

use crate::core::error::MeshError;
use math_hydro_green::geometry::{Vec3, add, cross, dot, norm, scale, sub};
use serde::{Deserialize, Serialize};

/// Tolerance on unit vectors and distances when comparing planes and axes
pub const GEOMETRY_TOLERANCE: f64 = 1e-10;

fn normalized(vector: Vec3) -> Result<Vec3, MeshError> {
    let length = norm(vector);
    if length <= f64::EPSILON {
        return Err(MeshError::ZeroDirection);
    }
    Ok(scale(vector, 1.0 / length))
}

fn parallel(a: Vec3, b: Vec3) -> bool {
    norm(cross(a, b)) < GEOMETRY_TOLERANCE
}

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// A point of the plane
    pub point: Vec3,
}

impl Plane {
    /// Plane with the given normal (normalized) through `point`
    pub fn new(normal: Vec3, point: Vec3) -> Result<Self, MeshError> {
        Ok(Self {
            normal: normalized(normal)?,
            point,
        })
    }

    /// The plane y = 0
    pub fn xoz() -> Self {
        Self {
            normal: [0.0, 1.0, 0.0],
            point: [0.0, 0.0, 0.0],
        }
    }

    /// The plane x = 0
    pub fn yoz() -> Self {
        Self {
            normal: [1.0, 0.0, 0.0],
            point: [0.0, 0.0, 0.0],
        }
    }

    /// Whether the plane contains the vertical direction
    pub fn is_vertical(&self) -> bool {
        self.normal[2].abs() < GEOMETRY_TOLERANCE
    }

    /// Signed distance from the plane
    pub fn distance(&self, point: Vec3) -> f64 {
        dot(sub(point, self.point), self.normal)
    }

    /// Mirror image of a point
    pub fn reflect_point(&self, point: Vec3) -> Vec3 {
        sub(point, scale(self.normal, 2.0 * self.distance(point)))
    }

    /// Mirror image of a direction
    pub fn reflect_vector(&self, vector: Vec3) -> Vec3 {
        sub(vector, scale(self.normal, 2.0 * dot(vector, self.normal)))
    }

    /// Same geometric plane, whatever the orientation of the normal
    pub fn is_close(&self, other: &Plane) -> bool {
        parallel(self.normal, other.normal) && self.distance(other.point).abs() < GEOMETRY_TOLERANCE
    }

    /// Image of the plane by a reflection
    pub fn mirrored(&self, plane: &Plane) -> Self {
        Self {
            normal: plane.reflect_vector(self.normal),
            point: plane.reflect_point(self.point),
        }
    }

    /// Image of the plane by a translation
    pub fn translated(&self, vector: Vec3) -> Self {
        Self {
            normal: self.normal,
            point: add(self.point, vector),
        }
    }

    /// Image of the plane by a rotation
    pub fn rotated(&self, axis: &Axis, angle: f64) -> Self {
        Self {
            normal: axis.rotate_vector(self.normal, angle),
            point: axis.rotate_point(self.point, angle),
        }
    }
}

/// Oriented axis through `point` with unit direction `vector`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Unit direction
    pub vector: Vec3,
    /// A point of the axis
    pub point: Vec3,
}

impl Axis {
    /// Axis with the given direction (normalized) through `point`
    pub fn new(vector: Vec3, point: Vec3) -> Result<Self, MeshError> {
        Ok(Self {
            vector: normalized(vector)?,
            point,
        })
    }

    /// The vertical axis through the origin
    pub fn oz() -> Self {
        Self {
            vector: [0.0, 0.0, 1.0],
            point: [0.0, 0.0, 0.0],
        }
    }

    /// Whether the axis is vertical
    pub fn is_vertical(&self) -> bool {
        parallel(self.vector, [0.0, 0.0, 1.0])
    }

    /// Distance of a point to the axis
    pub fn distance(&self, point: Vec3) -> f64 {
        norm(cross(sub(point, self.point), self.vector))
    }

    /// Rodrigues rotation of a direction
    pub fn rotate_vector(&self, vector: Vec3, angle: f64) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        let k = self.vector;
        add(
            add(scale(vector, cos), scale(cross(k, vector), sin)),
            scale(k, dot(k, vector) * (1.0 - cos)),
        )
    }

    /// Rotation of a point around the axis
    pub fn rotate_point(&self, point: Vec3, angle: f64) -> Vec3 {
        add(self.point, self.rotate_vector(sub(point, self.point), angle))
    }

    /// Same line, whatever the orientation
    pub fn is_close(&self, other: &Axis) -> bool {
        parallel(self.vector, other.vector) && self.distance(other.point) < GEOMETRY_TOLERANCE
    }

    /// Image of the axis by a reflection; the direction is reversed so that
    /// positive rotations of mirrored slices keep their order
    pub fn mirrored(&self, plane: &Plane) -> Self {
        Self {
            vector: scale(plane.reflect_vector(self.vector), -1.0),
            point: plane.reflect_point(self.point),
        }
    }

    /// Image of the axis by a translation
    pub fn translated(&self, vector: Vec3) -> Self {
        Self {
            vector: self.vector,
            point: add(self.point, vector),
        }
    }

    /// Image of the axis by a rotation
    pub fn rotated(&self, axis: &Axis, angle: f64) -> Self {
        Self {
            vector: axis.rotate_vector(self.vector, angle),
            point: axis.rotate_point(self.point, angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_plane_reflection() {
        let plane = Plane::new([2.0, 0.0, 0.0], [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(plane.normal, [1.0, 0.0, 0.0]);
        assert_eq!(plane.reflect_point([3.0, 1.0, -2.0]), [-1.0, 1.0, -2.0]);
        assert_eq!(plane.reflect_vector([1.0, 1.0, 0.0]), [-1.0, 1.0, 0.0]);
        assert!(plane.is_vertical());
        assert!(!Plane::new([0.0, 1.0, 1.0], [0.0; 3]).unwrap().is_vertical());
    }

    #[test]
    fn test_plane_comparison_ignores_orientation() {
        let a = Plane::xoz();
        let b = Plane::new([0.0, -1.0, 0.0], [5.0, 0.0, -3.0]).unwrap();
        assert!(a.is_close(&b));
        assert!(!a.is_close(&Plane::yoz()));
        assert!(!a.is_close(&a.translated([0.0, 0.1, 0.0])));
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert_eq!(Plane::new([0.0; 3], [0.0; 3]), Err(MeshError::ZeroDirection));
        assert_eq!(Axis::new([0.0; 3], [0.0; 3]), Err(MeshError::ZeroDirection));
    }

    #[test]
    fn test_rotation_around_offset_axis() {
        let axis = Axis::new([0.0, 0.0, 1.0], [1.0, 1.0, 0.0]).unwrap();
        let p = axis.rotate_point([2.0, 1.0, -1.0], PI / 2.0);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(p[1], 2.0, epsilon = 1e-14);
        assert_relative_eq!(p[2], -1.0, epsilon = 1e-14);
        assert!(axis.is_vertical());
        assert!(axis.is_close(&Axis::new([0.0, 0.0, -1.0], [1.0, 1.0, 7.0]).unwrap()));
    }
}
