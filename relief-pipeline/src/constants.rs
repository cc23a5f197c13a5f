//! Constants used throughout the pipeline.
//!
//! Stage parameters are fixed for the default pipeline and are not exposed
//! as configuration.

/// Derived subdirectories cleared at the start of every run.
pub const DERIVED_DIRS: [&str; 3] = ["sparse", "dense", "mesh"];

/// Mesh stage output directory, relative to the scene.
pub const MVS_SUBDIR: &str = "mesh/mvs";

/// Source images directory, relative to the scene.
pub const IMAGES_SUBDIR: &str = "images";

/// Accepted source image extensions (compared case-insensitively).
/// HEIF captures must be converted before a run.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

// Reconstruction stage.
pub const RECON_VIS_THRESH: f64 = 0.2;
pub const RECON_QUERY_FRAME_NUM: u32 = 8;
pub const RECON_MAX_QUERY_PTS: u32 = 4096;
pub const RECON_MAX_REPROJ_ERROR: f64 = 8.0;

// Quality gate.
pub const MIN_MULTI_VIEW_RATIO: f64 = 0.10;

// Mesh stage.
pub const MESH_MAX_FACE_AREA: u32 = 16;
pub const MESH_REFINE_SCALES: &str = "1";

/// Mesh artifact filenames, highest quality tier first.
pub const TEXTURED_MESH_FILE: &str = "scene_dense_mesh_refine_texture.ply";
pub const REFINED_MESH_FILE: &str = "scene_dense_mesh_refine.ply";
pub const DENSE_CLOUD_FILE: &str = "scene_dense.ply";

// Format conversion.
pub const CONVERT_COLLISION_APPROXIMATION: &str = "meshSimplification";
pub const CONVERT_STATIC_FRICTION: f64 = 0.5;
pub const CONVERT_DYNAMIC_FRICTION: f64 = 0.5;
pub const CONVERT_RESTITUTION: f64 = 0.0;

/// Interchange formats produced by the converter, as file extensions.
pub const CONVERTED_EXTENSIONS: [&str; 2] = ["usd", "obj"];

/// Run summary filename, written under `scene/mesh/`.
pub const SUMMARY_FILE: &str = "run_summary.json";
