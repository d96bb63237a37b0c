//! Free-surface Green function for linear water waves
//!
//! This crate evaluates the influence matrices of constant-strength source
//! panels for the linear potential flow around floating bodies.
//!
//! # Features
//!
//! - **Rankine part**: exact integrals of 1/r over planar polygons in the
//!   near field, one-point rule in the far field
//! - **Infinite depth wave part**: tabulated integrals of the exponential
//!   integral with far-field asymptotics
//! - **Finite depth wave part**: closed-form images, exponential
//!   decomposition of the auxiliary kernel and the propagating pole
//! - **Special functions**: complex exponential integral, Bessel functions
//!
//! # Example
//!
//! ```rust
//! use math_hydro_green::{Delhommeau, TabulationConfig};
//!
//! let green = Delhommeau::new(TabulationConfig { nb_r: 40, nb_z: 20, nb_theta: 21 });
//! let w = green.tables().wave_part(1.0, -0.5);
//! assert!(w.value.im > 0.0);
//! ```

pub mod finite_depth;
pub mod geometry;
pub mod green;
pub mod parallel;
pub mod rankine;
pub mod special;
pub mod tabulation;
pub mod wave;

pub use finite_depth::{finite_depth_kernel, pole_coefficient};
pub use geometry::{Collocation, Panels, Vec3};
pub use green::{Delhommeau, GreenFunction};
pub use tabulation::{TabulatedIntegrals, TabulationConfig, WaveValues};
pub use wave::WaveParameters;
