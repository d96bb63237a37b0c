//! Assembly of the influence matrices
//!
//! - `terms`: Rankine, image and wave terms of a dense block
//! - `dispatch`: recursive assembler exploiting the mesh symmetries

pub mod dispatch;
pub mod terms;

pub use dispatch::{Assembler, InfluenceMatrices};
pub use terms::{GreenParameters, image_term, rankine_term, wave_term};
