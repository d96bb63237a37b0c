//! Diagnostics of the solver
//!
//! The assembler and the solver report what they do to an
//! [`AssemblyObserver`] instead of writing to the logger directly.
//! [`LogObserver`] forwards the events to the `log` facade and is the
//! default; [`RecordingObserver`] keeps them for inspection.

use crate::core::cache::GreenTerm;
use crate::core::decomposition::DecompositionKey;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Symmetry used by a branch of the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryKind {
    /// Two mirrored halves
    Reflection,
    /// Translation lattice
    Translation,
    /// Rotation around an axis
    Axial,
}

/// Something the solver did
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyEvent {
    /// Start of a resolution
    SolveStarted {
        /// Description of the problem
        problem: String,
    },
    /// A symmetric pair of meshes is assembled from sub-blocks
    Symmetric {
        /// Recursion depth, 1 at the top
        depth: usize,
        /// Symmetry used
        kind: SymmetryKind,
        /// Receiving mesh
        receivers: String,
        /// Source mesh
        sources: String,
        /// Number of sub-blocks computed
        nb_blocks: usize,
    },
    /// A pair of meshes is assembled as a dense block
    Dense {
        /// Recursion depth, 1 at the top
        depth: usize,
        /// Receiving mesh
        receivers: String,
        /// Source mesh
        sources: String,
        /// Water depth
        water_depth: f64,
        /// Wavenumber
        wavenumber: f64,
    },
    /// One term of a dense block was taken from or stored in the cache
    Term {
        /// Recursion depth of the dense block
        depth: usize,
        /// Term of the Green function
        term: GreenTerm,
        /// Whether the block was already cached
        cached: bool,
    },
    /// A new exponential decomposition was fitted
    DecompositionComputed {
        /// Cache key
        key: DecompositionKey,
        /// Number of terms kept
        nb_terms: usize,
    },
    /// An exponential decomposition was found in the cache
    DecompositionReused {
        /// Cache key
        key: DecompositionKey,
    },
    /// No decomposition reached the tolerance; the last fit is used
    DecompositionNotConverged {
        /// Cache key
        key: DecompositionKey,
        /// Number of terms of the fit used
        nb_terms: usize,
    },
    /// The panels may be too large for the wavelength
    CoarseMesh {
        /// Wavelength of the problem
        wavelength: f64,
        /// Largest panel radius
        max_radius: f64,
    },
}

/// Receiver of solver events
pub trait AssemblyObserver: Send + Sync + Debug {
    /// Called for each event, in order
    fn notify(&self, event: &AssemblyEvent);
}

/// Forward events to the `log` facade.
///
/// Assembly events are indented by recursion depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl AssemblyObserver for LogObserver {
    fn notify(&self, event: &AssemblyEvent) {
        match event {
            AssemblyEvent::SolveStarted { problem } => log::info!("Solve {problem}."),
            AssemblyEvent::Symmetric {
                depth,
                kind,
                receivers,
                sources,
                nb_blocks,
            } => log::debug!(
                "{}Evaluating matrix of {receivers} on {sources} using {kind:?} symmetry ({nb_blocks} blocks)",
                "\t".repeat(*depth)
            ),
            AssemblyEvent::Dense {
                depth,
                receivers,
                sources,
                water_depth,
                wavenumber,
            } => log::debug!(
                "{}Evaluating matrix of {receivers} on {sources} for depth={water_depth:.2e} and k={wavenumber:.2e}",
                "\t".repeat(*depth)
            ),
            AssemblyEvent::Term {
                depth,
                term,
                cached,
            } => log::trace!(
                "{}{term:?} term {}",
                "\t".repeat(*depth + 1),
                if *cached { "from cache" } else { "computed" }
            ),
            AssemblyEvent::DecompositionComputed { key, nb_terms } => log::debug!(
                "Exponential decomposition with {nb_terms} terms for omega_bar={:.4e}, k_bar={:.4e}",
                key.dimensionless_omega(),
                key.dimensionless_wavenumber()
            ),
            AssemblyEvent::DecompositionReused { key } => log::debug!(
                "Reusing exponential decomposition for omega_bar={:.4e}, k_bar={:.4e}",
                key.dimensionless_omega(),
                key.dimensionless_wavenumber()
            ),
            AssemblyEvent::DecompositionNotConverged { key, nb_terms } => log::warn!(
                "No suitable exponential decomposition found for omega_bar={:.4e}, k_bar={:.4e}; using the last fit ({nb_terms} terms)",
                key.dimensionless_omega(),
                key.dimensionless_wavenumber()
            ),
            AssemblyEvent::CoarseMesh {
                wavelength,
                max_radius,
            } => log::warn!(
                "Resolution of the mesh (8×max_radius={:.2e}) might be insufficient for this wavelength (wavelength={wavelength:.2e})",
                8.0 * max_radius
            ),
        }
    }
}

/// Keep every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AssemblyEvent>>,
}

impl RecordingObserver {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared recorder, to be given to a solver and inspected afterwards
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Copy of the events received so far
    pub fn events(&self) -> Vec<AssemblyEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Forget the events received so far
    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Number of symmetric branches taken, per kind
    pub fn count_symmetric(&self, kind: SymmetryKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AssemblyEvent::Symmetric { kind: k, .. } if *k == kind))
            .count()
    }

    /// Number of dense blocks assembled
    pub fn count_dense(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AssemblyEvent::Dense { .. }))
            .count()
    }

    /// Deepest recursion level reached
    pub fn max_depth(&self) -> usize {
        self.events()
            .iter()
            .filter_map(|e| match e {
                AssemblyEvent::Symmetric { depth, .. } | AssemblyEvent::Dense { depth, .. } => {
                    Some(*depth)
                }
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl AssemblyObserver for RecordingObserver {
    fn notify(&self, event: &AssemblyEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer() {
        let observer = RecordingObserver::new();
        observer.notify(&AssemblyEvent::Symmetric {
            depth: 1,
            kind: SymmetryKind::Reflection,
            receivers: "a".into(),
            sources: "a".into(),
            nb_blocks: 2,
        });
        for _ in 0..2 {
            observer.notify(&AssemblyEvent::Dense {
                depth: 2,
                receivers: "half".into(),
                sources: "half".into(),
                water_depth: f64::INFINITY,
                wavenumber: 1.0,
            });
        }
        assert_eq!(observer.count_symmetric(SymmetryKind::Reflection), 1);
        assert_eq!(observer.count_symmetric(SymmetryKind::Axial), 0);
        assert_eq!(observer.count_dense(), 2);
        assert_eq!(observer.max_depth(), 2);

        observer.clear();
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_log_observer_accepts_every_event() {
        let key = DecompositionKey::new(1.0, 1.2);
        let events = [
            AssemblyEvent::SolveStarted {
                problem: "radiation".into(),
            },
            AssemblyEvent::Term {
                depth: 1,
                term: GreenTerm::Wave,
                cached: false,
            },
            AssemblyEvent::DecompositionNotConverged { key, nb_terms: 30 },
            AssemblyEvent::CoarseMesh {
                wavelength: 1.0,
                max_radius: 0.5,
            },
        ];
        for event in &events {
            LogObserver.notify(event);
        }
    }
}
