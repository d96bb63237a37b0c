//! Results of the resolution of a problem

use crate::core::mesh::MeshId;
use crate::core::problem::{LinearPotentialFlowProblem, ProblemKind};
use ndarray::Array1;
use num_complex::Complex64;
use std::collections::{BTreeMap, HashMap};

/// Forces on the body and, on request, the solution on the mesh
#[derive(Debug, Clone)]
pub struct LinearPotentialFlowResult {
    problem: LinearPotentialFlowProblem,
    forces: BTreeMap<String, Complex64>,
    /// Source strengths on the body faces
    pub sources: Option<Array1<Complex64>>,
    /// Potential on the body faces
    pub potential: Option<Array1<Complex64>>,
    fs_elevation: HashMap<MeshId, Array1<Complex64>>,
}

impl LinearPotentialFlowResult {
    /// Empty result of `problem`
    pub fn new(problem: LinearPotentialFlowProblem) -> Self {
        Self {
            problem,
            forces: BTreeMap::new(),
            sources: None,
            potential: None,
            fs_elevation: HashMap::new(),
        }
    }

    /// Solved problem
    pub fn problem(&self) -> &LinearPotentialFlowProblem {
        &self.problem
    }

    /// Angular frequency
    pub fn omega(&self) -> f64 {
        self.problem.omega
    }

    /// Gravity
    pub fn g(&self) -> f64 {
        self.problem.g
    }

    /// Water density
    pub fn rho(&self) -> f64 {
        self.problem.rho
    }

    /// Wavenumber
    pub fn wavenumber(&self) -> f64 {
        self.problem.wavenumber()
    }

    /// Record the force along `dof`
    pub fn store_force(&mut self, dof: impl Into<String>, force: Complex64) {
        self.forces.insert(dof.into(), force);
    }

    /// Force along `dof`
    pub fn force(&self, dof: &str) -> Option<Complex64> {
        self.forces.get(dof).copied()
    }

    /// Forces by dof name
    pub fn forces(&self) -> &BTreeMap<String, Complex64> {
        &self.forces
    }

    /// Added masses `Re F`, radiation problems only
    pub fn added_masses(&self) -> BTreeMap<String, f64> {
        if !self.is_radiation() {
            return BTreeMap::new();
        }
        self.forces
            .iter()
            .map(|(dof, force)| (dof.clone(), force.re))
            .collect()
    }

    /// Radiation dampings `ω Im F`, radiation problems only
    pub fn radiation_dampings(&self) -> BTreeMap<String, f64> {
        if !self.is_radiation() {
            return BTreeMap::new();
        }
        let omega = self.omega();
        self.forces
            .iter()
            .map(|(dof, force)| (dof.clone(), omega * force.im))
            .collect()
    }

    /// Added mass along `dof`
    pub fn added_mass(&self, dof: &str) -> Option<f64> {
        self.is_radiation()
            .then(|| self.force(dof).map(|f| f.re))
            .flatten()
    }

    /// Radiation damping along `dof`
    pub fn radiation_damping(&self, dof: &str) -> Option<f64> {
        self.is_radiation()
            .then(|| self.force(dof).map(|f| self.omega() * f.im))
            .flatten()
    }

    /// Name of the radiating dof
    pub fn radiating_dof(&self) -> Option<&str> {
        match self.problem.kind() {
            ProblemKind::Radiation { dof } => Some(dof),
            ProblemKind::Prescribed { .. } => None,
        }
    }

    fn is_radiation(&self) -> bool {
        self.radiating_dof().is_some()
    }

    /// Keep the free surface elevation computed on a mesh
    pub fn store_fs_elevation(&mut self, mesh: MeshId, elevation: Array1<Complex64>) {
        self.fs_elevation.insert(mesh, elevation);
    }

    /// Free surface elevation kept for a mesh
    pub fn fs_elevation(&self, mesh: MeshId) -> Option<&Array1<Complex64>> {
        self.fs_elevation.get(&mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::rectangle;
    use crate::core::problem::FloatingBody;
    use std::sync::Arc;

    fn body() -> Arc<FloatingBody> {
        let mesh = rectangle([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 1, 1, "plate").unwrap();
        let mut body = FloatingBody::new(mesh);
        body.add_translation_dof([0.0, 0.0, 1.0], "Heave").unwrap();
        Arc::new(body)
    }

    #[test]
    fn test_radiation_coefficients() {
        let problem = LinearPotentialFlowProblem::radiation(body(), "Heave", 2.0).unwrap();
        let mut result = LinearPotentialFlowResult::new(problem);
        result.store_force("Heave", Complex64::new(3.0, -0.5));
        assert_eq!(result.radiating_dof(), Some("Heave"));
        assert_eq!(result.added_mass("Heave"), Some(3.0));
        assert_eq!(result.radiation_damping("Heave"), Some(-1.0));
        assert_eq!(result.added_masses().len(), 1);
        assert_eq!(result.added_mass("Surge"), None);
    }

    #[test]
    fn test_prescribed_problem_has_no_coefficients() {
        let bc = Array1::from_elem(1, Complex64::new(1.0, 0.0));
        let problem = LinearPotentialFlowProblem::with_boundary_condition(body(), bc, 1.0, "bc").unwrap();
        let mut result = LinearPotentialFlowResult::new(problem);
        result.store_force("Heave", Complex64::new(1.0, 1.0));
        assert!(result.added_masses().is_empty());
        assert_eq!(result.force("Heave"), Some(Complex64::new(1.0, 1.0)));

        let id = MeshId::new();
        assert!(result.fs_elevation(id).is_none());
        result.store_fs_elevation(id, Array1::zeros(2));
        assert_eq!(result.fs_elevation(id).map(|e| e.len()), Some(2));
    }
}
