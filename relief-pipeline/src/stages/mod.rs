//! The three external stages driven by the controller.
//!
//! Each stage builds a [`StageInvocation`](crate::runner::StageInvocation)
//! from fixed parameters and hands it to a runner. Any failure is fatal.

pub mod convert;
pub mod mesh;
pub mod reconstruct;

pub use convert::{run_conversion, ConvertedArtifacts};
pub use mesh::run_meshing;
pub use reconstruct::run_reconstruction;

pub const RECONSTRUCT_STAGE: &str = "reconstruct";
pub const MESH_STAGE: &str = "mesh";
pub const CONVERT_STAGE: &str = "convert";

/// Render a float argument so it always reads as a float (`0.0`, not `0`).
pub(crate) fn float_arg(value: f64) -> String {
    format!("{:?}", value)
}
