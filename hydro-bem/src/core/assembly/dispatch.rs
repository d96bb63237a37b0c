//! Recursive assembly of the influence matrices
//!
//! Pairs of symmetric meshes are split into sub-blocks and the resulting
//! matrices keep the block structure:
//!
//! | receivers   | sources     | condition                       | result                  |
//! |-------------|-------------|---------------------------------|-------------------------|
//! | reflection  | reflection  | same plane                      | symmetric 2×2 Toeplitz  |
//! | translation | translation | same vector and number of slices| block Toeplitz          |
//! | axial       | same mesh   | vertical axis or no free surface| block circulant         |
//!
//! Anything else, including a mismatch between the two symmetries, is
//! computed as a dense block made of the three terms of the Green function,
//! each memoized in the [`BlockCache`].

use super::terms::{GreenParameters, image_term, rankine_term, wave_term};
use crate::core::cache::{BlockCache, BlockKey, GreenTerm, MatrixPair};
use crate::core::decomposition::ExponentialDecomposition;
use crate::core::error::Result;
use crate::core::mesh::{BodyMesh, Mesh};
use crate::core::observer::{AssemblyEvent, AssemblyObserver, SymmetryKind};
use math_hydro_green::GreenFunction;
use math_hydro_solvers::{BlockCirculant, BlockMatrix, BlockToeplitz};
use num_complex::Complex64;
use std::sync::Arc;

/// Influence matrices S and V
pub type InfluenceMatrices = (BlockMatrix<Complex64>, BlockMatrix<Complex64>);

/// Assembler borrowing the Green function, the block cache and the
/// observer of a solver
pub struct Assembler<'a> {
    green: &'a dyn GreenFunction,
    blocks: &'a mut BlockCache,
    observer: &'a dyn AssemblyObserver,
}

impl<'a> Assembler<'a> {
    /// New assembler
    pub fn new(
        green: &'a dyn GreenFunction,
        blocks: &'a mut BlockCache,
        observer: &'a dyn AssemblyObserver,
    ) -> Self {
        Self {
            green,
            blocks,
            observer,
        }
    }

    /// Influence matrices of the sources on `mesh2` at the faces of `mesh1`,
    /// of shape `(mesh1.nb_faces(), mesh2.nb_faces())`.
    ///
    /// `decomposition` is used by the wave term in finite depth and ignored
    /// otherwise. With `force_full` the symmetries are not used.
    pub fn assemble(
        &mut self,
        mesh1: &BodyMesh,
        mesh2: &BodyMesh,
        params: &GreenParameters,
        decomposition: &ExponentialDecomposition,
        force_full: bool,
    ) -> Result<InfluenceMatrices> {
        self.assemble_at(mesh1, mesh2, params, decomposition, force_full, 1)
    }

    fn assemble_at(
        &mut self,
        mesh1: &BodyMesh,
        mesh2: &BodyMesh,
        params: &GreenParameters,
        decomposition: &ExponentialDecomposition,
        force_full: bool,
        depth: usize,
    ) -> Result<InfluenceMatrices> {
        if !force_full {
            match (mesh1, mesh2) {
                (BodyMesh::Reflection(a), BodyMesh::Reflection(b)) if a.plane().is_close(b.plane()) => {
                    self.notify_symmetric(depth, SymmetryKind::Reflection, mesh1, mesh2, 2);
                    let pairs = [(a.half(), b.half()), (a.half(), b.mirror())];
                    let (s, v) = self.assemble_all(&pairs, params, decomposition, depth)?;
                    return Ok((
                        BlockToeplitz::symmetric(s)?.into(),
                        BlockToeplitz::symmetric(v)?.into(),
                    ));
                }
                (BodyMesh::Translation(a), BodyMesh::Translation(b)) if a.same_lattice(b) => {
                    let slices1 = a.slices();
                    let slices2 = b.slices();
                    let row: Vec<_> = slices2.iter().map(|s2| (&slices1[0], s2)).collect();
                    let column: Vec<_> = slices1[1..].iter().map(|s1| (s1, &slices2[0])).collect();
                    self.notify_symmetric(
                        depth,
                        SymmetryKind::Translation,
                        mesh1,
                        mesh2,
                        row.len() + column.len(),
                    );
                    let (s_row, v_row) = self.assemble_all(&row, params, decomposition, depth)?;
                    let (s_column, v_column) =
                        self.assemble_all(&column, params, decomposition, depth)?;
                    return Ok((
                        BlockToeplitz::new(s_row, s_column)?.into(),
                        BlockToeplitz::new(v_row, v_column)?.into(),
                    ));
                }
                (BodyMesh::Axial(a), _)
                    if mesh1.id() == mesh2.id()
                        && (a.axis().is_vertical() || !params.has_free_surface()) =>
                {
                    let slices = a.slices();
                    let row: Vec<_> = slices.iter().map(|s| (&slices[0], s)).collect();
                    self.notify_symmetric(depth, SymmetryKind::Axial, mesh1, mesh2, row.len());
                    let (s, v) = self.assemble_all(&row, params, decomposition, depth)?;
                    return Ok((BlockCirculant::new(s)?.into(), BlockCirculant::new(v)?.into()));
                }
                _ => {}
            }
        }

        let (s, v) = self.dense(mesh1.mesh(), mesh2.mesh(), params, decomposition, depth);
        Ok((BlockMatrix::Dense(s), BlockMatrix::Dense(v)))
    }

    fn assemble_all(
        &mut self,
        pairs: &[(&Arc<BodyMesh>, &Arc<BodyMesh>)],
        params: &GreenParameters,
        decomposition: &ExponentialDecomposition,
        depth: usize,
    ) -> Result<(Vec<BlockMatrix<Complex64>>, Vec<BlockMatrix<Complex64>>)> {
        let mut s_blocks = Vec::with_capacity(pairs.len());
        let mut v_blocks = Vec::with_capacity(pairs.len());
        for (receivers, sources) in pairs {
            let (s, v) = self.assemble_at(receivers, sources, params, decomposition, false, depth + 1)?;
            s_blocks.push(s);
            v_blocks.push(v);
        }
        Ok((s_blocks, v_blocks))
    }

    fn notify_symmetric(
        &self,
        depth: usize,
        kind: SymmetryKind,
        mesh1: &BodyMesh,
        mesh2: &BodyMesh,
        nb_blocks: usize,
    ) {
        self.observer.notify(&AssemblyEvent::Symmetric {
            depth,
            kind,
            receivers: mesh1.name().to_string(),
            sources: describe_sources(mesh1, mesh2),
            nb_blocks,
        });
    }

    /// Sum of the memoized terms of the Green function
    fn dense(
        &mut self,
        mesh1: &Mesh,
        mesh2: &Mesh,
        params: &GreenParameters,
        decomposition: &ExponentialDecomposition,
        depth: usize,
    ) -> MatrixPair {
        self.observer.notify(&AssemblyEvent::Dense {
            depth,
            receivers: mesh1.name().to_string(),
            sources: if mesh1.id() == mesh2.id() {
                "itself".to_string()
            } else {
                mesh2.name().to_string()
            },
            water_depth: params.depth(),
            wavenumber: params.wavenumber,
        });

        let green = self.green;
        let rankine = self.term(
            BlockKey::new(GreenTerm::Rankine, mesh1.id(), mesh2.id(), &[]),
            depth,
            || rankine_term(green, mesh1, mesh2),
        );
        let (mut s, mut v) = (rankine.0.clone(), rankine.1.clone());

        if params.has_free_surface() {
            let image = self.term(
                BlockKey::new(GreenTerm::Image, mesh1.id(), mesh2.id(), &params.image_signature()),
                depth,
                || image_term(green, mesh1, mesh2, params),
            );
            s += &image.0;
            v += &image.1;

            let wave = self.term(
                BlockKey::new(GreenTerm::Wave, mesh1.id(), mesh2.id(), &params.wave_signature()),
                depth,
                || wave_term(green, mesh1, mesh2, params, decomposition),
            );
            s += &wave.0;
            v += &wave.1;
        }
        (s, v)
    }

    fn term<F>(&mut self, key: BlockKey, depth: usize, compute: F) -> Arc<MatrixPair>
    where
        F: FnOnce() -> MatrixPair,
    {
        let term = key.term();
        let cached = self.blocks.contains(&key);
        self.observer.notify(&AssemblyEvent::Term {
            depth,
            term,
            cached,
        });
        self.blocks.get_or_compute(key, compute)
    }
}

fn describe_sources(mesh1: &BodyMesh, mesh2: &BodyMesh) -> String {
    if mesh1.id() == mesh2.id() {
        "itself".to_string()
    } else {
        mesh2.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::{Plane, ReflectionSymmetry, TranslationalSymmetry, rectangle};
    use crate::core::observer::RecordingObserver;
    use approx::assert_abs_diff_eq;
    use math_hydro_green::{Collocation, Panels, WaveParameters};
    use ndarray::Array2;

    /// Point-source Green function, cheap and exact for the tests
    #[derive(Debug)]
    struct PointSources;

    impl GreenFunction for PointSources {
        fn rankine(
            &self,
            receivers: &Collocation<'_>,
            sources: &Panels<'_>,
        ) -> (Array2<f64>, Array2<f64>) {
            let n = receivers.len();
            let m = sources.nb_faces();
            let mut s = Array2::zeros((n, m));
            let mut v = Array2::zeros((n, m));
            for i in 0..n {
                let x = receivers.point(i);
                let normal = receivers.normal(i);
                for j in 0..m {
                    let c = sources.center(j);
                    let d = [x[0] - c[0], x[1] - c[1], x[2] - c[2]];
                    let r = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt().max(1e-3);
                    s[[i, j]] = -sources.areas[j] / r;
                    v[[i, j]] = (d[0] * normal[0] + d[1] * normal[1] + d[2] * normal[2]) / r.powi(3);
                }
            }
            (s, v)
        }

        fn wave(
            &self,
            receivers: &Collocation<'_>,
            sources: &Panels<'_>,
            params: &WaveParameters<'_>,
            _same_mesh: bool,
        ) -> (Array2<Complex64>, Array2<Complex64>) {
            let (s, v) = self.rankine(receivers, sources);
            let factor = Complex64::new(0.0, params.wavenumber);
            (s.mapv(|x| factor * x), v.mapv(|x| factor * x))
        }
    }

    fn plate(name: &str) -> Mesh {
        rectangle([0.5, 0.5, -0.2], [1.0, 0.0, 0.0], [0.0, 1.0, -0.5], 2, 2, name).unwrap()
    }

    #[test]
    fn test_reflection_matches_dense() {
        let body = BodyMesh::from(ReflectionSymmetry::new(plate("half"), Plane::xoz()).unwrap());
        let params = GreenParameters::infinite_depth(1.3);
        let zero = ExponentialDecomposition::zero();
        let observer = RecordingObserver::new();
        let mut cache = BlockCache::new(16);
        let mut assembler = Assembler::new(&PointSources, &mut cache, &observer);

        let (s, v) = assembler.assemble(&body, &body, &params, &zero, false).unwrap();
        assert!(matches!(s, BlockMatrix::Toeplitz(_)));
        let (s_full, v_full) = assembler.assemble(&body, &body, &params, &zero, true).unwrap();
        assert!(s_full.is_dense());

        let (s, s_full) = (s.to_dense(), s_full.to_dense());
        let (v, v_full) = (v.to_dense(), v_full.to_dense());
        for (a, b) in s.iter().zip(s_full.iter()).chain(v.iter().zip(v_full.iter())) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
        assert_eq!(observer.count_symmetric(SymmetryKind::Reflection), 1);
        assert_eq!(observer.max_depth(), 2);
    }

    #[test]
    fn test_translation_with_distinct_meshes() {
        let a = BodyMesh::from(TranslationalSymmetry::new(plate("a"), [2.0, 0.0, 0.0], 3).unwrap());
        let b = BodyMesh::from(
            TranslationalSymmetry::new(plate("b").translated([0.0, 3.0, 0.0], "b"), [2.0, 0.0, 0.0], 3)
                .unwrap(),
        );
        let params = GreenParameters::infinite_depth(0.7);
        let zero = ExponentialDecomposition::zero();
        let observer = RecordingObserver::new();
        let mut cache = BlockCache::disabled();
        let mut assembler = Assembler::new(&PointSources, &mut cache, &observer);

        let (s, _) = assembler.assemble(&a, &b, &params, &zero, false).unwrap();
        let (s_full, _) = assembler.assemble(&a, &b, &params, &zero, true).unwrap();
        assert_eq!(observer.count_symmetric(SymmetryKind::Translation), 1);
        assert_eq!(s.shape(), (12, 12));
        for (x, y) in s.to_dense().iter().zip(s_full.to_dense().iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-12);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mismatched_symmetries_fall_back_to_dense() {
        let a = BodyMesh::from(ReflectionSymmetry::new(plate("a"), Plane::xoz()).unwrap());
        let b = BodyMesh::from(ReflectionSymmetry::new(plate("b"), Plane::yoz()).unwrap());
        let params = GreenParameters::no_free_surface();
        let zero = ExponentialDecomposition::zero();
        let observer = RecordingObserver::new();
        let mut cache = BlockCache::new(4);
        let mut assembler = Assembler::new(&PointSources, &mut cache, &observer);

        let (s, _) = assembler.assemble(&a, &b, &params, &zero, false).unwrap();
        assert!(s.is_dense());
        assert_eq!(observer.count_dense(), 1);
        // Only the Rankine term without free surface
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_terms_are_memoized() {
        let body = BodyMesh::from(plate("plate"));
        let params = GreenParameters::infinite_depth(1.0);
        let zero = ExponentialDecomposition::zero();
        let observer = RecordingObserver::new();
        let mut cache = BlockCache::new(8);
        {
            let mut assembler = Assembler::new(&PointSources, &mut cache, &observer);
            assembler.assemble(&body, &body, &params, &zero, false).unwrap();
            // New frequency: only the wave term is recomputed
            let other = GreenParameters::infinite_depth(2.0);
            assembler.assemble(&body, &body, &other, &zero, false).unwrap();
        }
        assert_eq!(cache.len(), 4);
        let cached = observer
            .events()
            .iter()
            .filter(|e| matches!(e, AssemblyEvent::Term { cached: true, .. }))
            .count();
        assert_eq!(cached, 2);
    }
}
