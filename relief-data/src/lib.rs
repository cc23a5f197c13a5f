//! Relief Data Crate
//!
//! Data loading and analysis for sparse reconstructions and mesh artifacts.
//! This crate is process-agnostic: it parses what external tools leave on
//! disk and never launches anything itself.
//!
//! ## Modules
//!
//! - [`types`]: cameras, registered images, 3D points and their tracks
//! - [`colmap`]: COLMAP binary and text model readers
//! - [`visibility`]: track-length histogram and multi-view ratio
//! - [`ply`]: PLY header inspection for mesh artifacts

pub mod colmap;
pub mod error;
pub mod ply;
pub mod types;
pub mod visibility;

pub use colmap::{load_reconstruction, locate_model, ModelFormat, ModelLocation};
pub use error::ModelError;
pub use ply::{read_ply_header, PlyEncoding, PlyHeader};
pub use types::{Camera, CameraModel, Image, Keypoint, Point3D, Reconstruction, TrackElement};
pub use visibility::VisibilityStats;
