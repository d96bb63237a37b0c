//! Meshes of floating bodies and their symmetries

pub mod generators;
pub mod geometry;
pub mod surface;
pub mod symmetry;

pub use generators::{barge_slice, free_surface, hemisphere_profile, rectangle, sphere_patch};
pub use geometry::{Axis, GEOMETRY_TOLERANCE, Plane};
pub use surface::{Mesh, MeshId};
pub use symmetry::{AxialSymmetry, BodyMesh, ReflectionSymmetry, TranslationalSymmetry};
