//! Floating bodies and linear potential flow problems

use crate::core::assembly::GreenParameters;
use crate::core::error::{BemError, Result};
use crate::core::mesh::{Axis, BodyMesh};
use math_hydro_green::geometry::{Vec3, cross, dot, sub};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Default gravity (m/s²)
pub const DEFAULT_GRAVITY: f64 = 9.81;

/// Default water density (kg/m³)
pub const DEFAULT_DENSITY: f64 = 1000.0;

/// Degree of freedom: a motion vector on each face
#[derive(Debug, Clone)]
pub struct Dof {
    /// Name of the dof
    pub name: String,
    /// Motion of each face, `(nb_faces, 3)`
    pub motion: Array2<f64>,
}

/// A body in the fluid: its mesh and its degrees of freedom
#[derive(Debug, Clone)]
pub struct FloatingBody {
    mesh: BodyMesh,
    dofs: Vec<Dof>,
}

impl FloatingBody {
    /// Body without degree of freedom
    pub fn new(mesh: impl Into<BodyMesh>) -> Self {
        Self {
            mesh: mesh.into(),
            dofs: Vec::new(),
        }
    }

    /// Mesh of the body
    pub fn mesh(&self) -> &BodyMesh {
        &self.mesh
    }

    /// Name of the body
    pub fn name(&self) -> &str {
        self.mesh.name()
    }

    /// Number of faces
    pub fn nb_faces(&self) -> usize {
        self.mesh.nb_faces()
    }

    /// Degrees of freedom, in the order they were added
    pub fn dofs(&self) -> &[Dof] {
        &self.dofs
    }

    /// Names of the degrees of freedom
    pub fn dof_names(&self) -> impl Iterator<Item = &str> {
        self.dofs.iter().map(|d| d.name.as_str())
    }

    /// Degree of freedom by name
    pub fn dof(&self, name: &str) -> Option<&Dof> {
        self.dofs.iter().find(|d| d.name == name)
    }

    /// Add a dof from a motion per face. A dof with the same name is replaced.
    pub fn add_dof(&mut self, name: impl Into<String>, motion: Array2<f64>) -> Result<()> {
        if motion.dim() != (self.nb_faces(), 3) {
            return Err(BemError::SizeMismatch {
                expected: self.nb_faces() * 3,
                got: motion.len(),
            });
        }
        let name = name.into();
        match self.dofs.iter_mut().find(|d| d.name == name) {
            Some(dof) => dof.motion = motion,
            None => self.dofs.push(Dof { name, motion }),
        }
        Ok(())
    }

    /// Rigid translation along `direction`
    pub fn add_translation_dof(&mut self, direction: Vec3, name: impl Into<String>) -> Result<()> {
        let mut motion = Array2::zeros((self.nb_faces(), 3));
        for mut row in motion.rows_mut() {
            for k in 0..3 {
                row[k] = direction[k];
            }
        }
        self.add_dof(name, motion)
    }

    /// Rigid rotation around `axis`; the motion of a face is
    /// `axis × (center − point)`
    pub fn add_rotation_dof(&mut self, axis: &Axis, name: impl Into<String>) -> Result<()> {
        let mesh = self.mesh.mesh();
        let mut motion = Array2::zeros((self.nb_faces(), 3));
        for j in 0..self.nb_faces() {
            let velocity = cross(axis.vector, sub(mesh.center(j), axis.point));
            for k in 0..3 {
                motion[[j, k]] = velocity[k];
            }
        }
        self.add_dof(name, motion)
    }

    /// Surge, sway, heave, roll, pitch and yaw, rotations being around
    /// `rotation_center`
    pub fn add_all_rigid_body_dofs(&mut self, rotation_center: Vec3) -> Result<()> {
        self.add_translation_dof([1.0, 0.0, 0.0], "Surge")?;
        self.add_translation_dof([0.0, 1.0, 0.0], "Sway")?;
        self.add_translation_dof([0.0, 0.0, 1.0], "Heave")?;
        for (name, vector) in [
            ("Roll", [1.0, 0.0, 0.0]),
            ("Pitch", [0.0, 1.0, 0.0]),
            ("Yaw", [0.0, 0.0, 1.0]),
        ] {
            let axis = Axis {
                vector,
                point: rotation_center,
            };
            self.add_rotation_dof(&axis, name)?;
        }
        Ok(())
    }

    /// Normal component of a dof on each face, `n · motion`
    pub fn normal_motion(&self, name: &str) -> Result<Array1<f64>> {
        let dof = self
            .dof(name)
            .ok_or_else(|| BemError::UnknownDof(name.to_string()))?;
        let mesh = self.mesh.mesh();
        Ok(Array1::from_iter((0..self.nb_faces()).map(|j| {
            let motion = [dof.motion[[j, 0]], dof.motion[[j, 1]], dof.motion[[j, 2]]];
            dot(mesh.normal(j), motion)
        })))
    }
}

/// What the body does
#[derive(Debug, Clone)]
pub enum ProblemKind {
    /// The body oscillates along one of its dofs with unit velocity
    Radiation {
        /// Name of the radiating dof
        dof: String,
    },
    /// Normal velocity prescribed on each face
    Prescribed {
        /// Short description
        name: String,
        /// Normal velocity per face
        boundary_condition: Array1<Complex64>,
    },
}

/// Linear potential flow around a body at one frequency
#[derive(Debug, Clone)]
pub struct LinearPotentialFlowProblem {
    body: Arc<FloatingBody>,
    /// Angular frequency (rad/s)
    pub omega: f64,
    /// Height of the free surface; `f64::INFINITY` without free surface
    pub free_surface: f64,
    /// Height of the sea bottom; `f64::NEG_INFINITY` in deep water
    pub sea_bottom: f64,
    /// Gravity (m/s²)
    pub g: f64,
    /// Water density (kg/m³)
    pub rho: f64,
    kind: ProblemKind,
}

impl LinearPotentialFlowProblem {
    fn with_kind(body: Arc<FloatingBody>, omega: f64, kind: ProblemKind) -> Self {
        Self {
            body,
            omega,
            free_surface: 0.0,
            sea_bottom: f64::NEG_INFINITY,
            g: DEFAULT_GRAVITY,
            rho: DEFAULT_DENSITY,
            kind,
        }
    }

    /// Radiation of `dof` in deep water
    pub fn radiation(body: Arc<FloatingBody>, dof: &str, omega: f64) -> Result<Self> {
        if body.dof(dof).is_none() {
            return Err(BemError::UnknownDof(dof.to_string()));
        }
        Ok(Self::with_kind(
            body,
            omega,
            ProblemKind::Radiation {
                dof: dof.to_string(),
            },
        ))
    }

    /// Problem with a prescribed normal velocity on each face, in deep water
    pub fn with_boundary_condition(
        body: Arc<FloatingBody>,
        boundary_condition: Array1<Complex64>,
        omega: f64,
        name: impl Into<String>,
    ) -> Result<Self> {
        if boundary_condition.len() != body.nb_faces() {
            return Err(BemError::SizeMismatch {
                expected: body.nb_faces(),
                got: boundary_condition.len(),
            });
        }
        Ok(Self::with_kind(
            body,
            omega,
            ProblemKind::Prescribed {
                name: name.into(),
                boundary_condition,
            },
        ))
    }

    /// Sea bottom `depth` below the free surface
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.sea_bottom = self.free_surface - depth;
        self
    }

    /// Free surface at height `z`, keeping the depth
    pub fn with_free_surface(mut self, z: f64) -> Self {
        let depth = self.depth();
        self.free_surface = z;
        self.sea_bottom = z - depth;
        self
    }

    /// Unbounded fluid
    pub fn without_free_surface(mut self) -> Self {
        self.free_surface = f64::INFINITY;
        self.sea_bottom = f64::NEG_INFINITY;
        self
    }

    /// Set gravity
    pub fn with_gravity(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    /// Set water density
    pub fn with_density(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Body of the problem
    pub fn body(&self) -> &Arc<FloatingBody> {
        &self.body
    }

    /// Kind of problem
    pub fn kind(&self) -> &ProblemKind {
        &self.kind
    }

    /// Check the physical parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.omega.is_finite() && self.omega > 0.0) {
            return Err(BemError::InvalidProblem(format!(
                "angular frequency must be positive, got {}",
                self.omega
            )));
        }
        if !(self.g > 0.0 && self.rho > 0.0) {
            return Err(BemError::InvalidProblem(format!(
                "gravity and density must be positive, got g={} and rho={}",
                self.g, self.rho
            )));
        }
        if self.has_free_surface() && self.sea_bottom >= self.free_surface {
            return Err(BemError::InvalidProblem(format!(
                "sea bottom ({}) must be below the free surface ({})",
                self.sea_bottom, self.free_surface
            )));
        }
        Ok(())
    }

    /// Whether the fluid has a free surface
    pub fn has_free_surface(&self) -> bool {
        self.free_surface.is_finite()
    }

    /// Water depth, infinite in deep water
    pub fn depth(&self) -> f64 {
        self.free_surface - self.sea_bottom
    }

    /// Whether the sea bottom is at infinity
    pub fn is_infinite_depth(&self) -> bool {
        self.sea_bottom == f64::NEG_INFINITY
    }

    /// Wavenumber from the dispersion relation `ω² = g k tanh(k h)`
    pub fn wavenumber(&self) -> f64 {
        let deep = self.omega * self.omega / self.g;
        if self.is_infinite_depth() || !self.has_free_surface() {
            deep
        } else {
            solve_dispersion(deep * self.depth()) / self.depth()
        }
    }

    /// Wavelength `2π/k`
    pub fn wavelength(&self) -> f64 {
        2.0 * PI / self.wavenumber()
    }

    /// ω²h/g
    pub fn dimensionless_omega(&self) -> f64 {
        self.omega * self.omega * self.depth() / self.g
    }

    /// kh
    pub fn dimensionless_wavenumber(&self) -> f64 {
        self.wavenumber() * self.depth()
    }

    /// Normal velocity imposed on each face
    pub fn boundary_condition(&self) -> Result<Array1<Complex64>> {
        match &self.kind {
            ProblemKind::Radiation { dof } => Ok(self
                .body
                .normal_motion(dof)?
                .mapv(|v| Complex64::new(v, 0.0))),
            ProblemKind::Prescribed {
                boundary_condition, ..
            } => Ok(boundary_condition.clone()),
        }
    }

    /// Parameters of the Green function for this problem
    pub fn green_parameters(&self) -> GreenParameters {
        if !self.has_free_surface() {
            return GreenParameters::no_free_surface();
        }
        GreenParameters {
            free_surface: self.free_surface,
            sea_bottom: self.sea_bottom,
            wavenumber: self.wavenumber(),
            dimensionless_omega: if self.is_infinite_depth() {
                f64::INFINITY
            } else {
                self.dimensionless_omega()
            },
        }
    }

    /// Sort key used to group problems sharing caches
    pub(crate) fn sort_key(&self) -> (f64, f64) {
        (self.omega, self.depth())
    }
}

impl fmt::Display for LinearPotentialFlowProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProblemKind::Radiation { dof } => write!(
                f,
                "RadiationProblem(body={}, omega={:.3}, depth={}, dof={dof})",
                self.body.name(),
                self.omega,
                self.depth()
            ),
            ProblemKind::Prescribed { name, .. } => write!(
                f,
                "Problem {name}(body={}, omega={:.3}, depth={})",
                self.body.name(),
                self.omega,
                self.depth()
            ),
        }
    }
}

/// Root `x` of `x tanh(x) = ω̄` by Newton iterations
fn solve_dispersion(omega_bar: f64) -> f64 {
    let mut x = if omega_bar >= 1.0 {
        omega_bar
    } else {
        omega_bar.sqrt()
    };
    for _ in 0..100 {
        let t = x.tanh();
        let residual = x * t - omega_bar;
        let derivative = t + x * (1.0 - t * t);
        let step = residual / derivative;
        x = (x - step).max(0.5 * x);
        if step.abs() <= 1e-15 * x {
            break;
        }
    }
    x
}
