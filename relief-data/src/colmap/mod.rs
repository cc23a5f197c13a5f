//! COLMAP sparse model loading.
//!
//! A model directory holds `cameras`, `images` and `points3D` files, either
//! all binary (`.bin`) or all text (`.txt`). Binary wins when both exist.
//! Some tools write the model one level deeper, into `sparse/0`; that layout
//! is accepted when `sparse/` itself has no model.

mod binary;
mod text;

use crate::error::ModelError;
use crate::types::Reconstruction;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MODEL_FILES: [&str; 3] = ["cameras", "images", "points3D"];

/// On-disk encoding of a sparse model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Binary,
    Text,
}

impl ModelFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Binary => "bin",
            ModelFormat::Text => "txt",
        }
    }
}

/// A directory confirmed to hold a complete model in one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocation {
    pub dir: PathBuf,
    pub format: ModelFormat,
}

impl ModelLocation {
    fn file(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, self.format.extension()))
    }
}

fn probe(dir: &Path) -> Result<Option<ModelLocation>, ModelError> {
    for format in [ModelFormat::Binary, ModelFormat::Text] {
        let paths: Vec<PathBuf> = MODEL_FILES
            .iter()
            .map(|stem| dir.join(format!("{}.{}", stem, format.extension())))
            .collect();
        let present = paths.iter().filter(|p| p.is_file()).count();

        if present == MODEL_FILES.len() {
            return Ok(Some(ModelLocation {
                dir: dir.to_path_buf(),
                format,
            }));
        }
        if present > 0 {
            if let Some(missing) = paths.into_iter().find(|p| !p.is_file()) {
                return Err(ModelError::MissingFile(missing));
            }
        }
    }
    Ok(None)
}

/// Find the model inside a sparse directory.
pub fn locate_model(sparse_dir: &Path) -> Result<ModelLocation, ModelError> {
    if let Some(location) = probe(sparse_dir)? {
        return Ok(location);
    }
    if let Some(location) = probe(&sparse_dir.join("0"))? {
        debug!("Using nested sub-model at {}", location.dir.display());
        return Ok(location);
    }
    Err(ModelError::ModelNotFound(sparse_dir.to_path_buf()))
}

/// Load a full reconstruction from a sparse directory.
#[tracing::instrument(skip_all, fields(path = %sparse_dir.display()))]
pub fn load_reconstruction(sparse_dir: &Path) -> Result<Reconstruction, ModelError> {
    let location = locate_model(sparse_dir)?;
    debug!(
        "Reading {:?} model from {}",
        location.format,
        location.dir.display()
    );

    let open = |stem: &str| -> Result<BufReader<File>, ModelError> {
        Ok(BufReader::new(File::open(location.file(stem))?))
    };

    let recon = match location.format {
        ModelFormat::Binary => Reconstruction {
            cameras: binary::read_cameras(open("cameras")?)?,
            images: binary::read_images(open("images")?)?,
            points: binary::read_points3d(open("points3D")?)?,
        },
        ModelFormat::Text => Reconstruction {
            cameras: text::read_cameras(open("cameras")?)?,
            images: text::read_images(open("images")?)?,
            points: text::read_points3d(open("points3D")?)?,
        },
    };

    info!(
        "Loaded reconstruction: {} cameras{}, {} images, {} points",
        recon.cameras.len(),
        if recon.has_shared_camera() { " (shared)" } else { "" },
        recon.images.len(),
        recon.num_points()
    );
    for camera in recon.cameras.values() {
        let (fx, fy) = camera.focal_lengths();
        debug!(
            "Camera {}: {} {}x{} f=({:.1}, {:.1})",
            camera.id,
            camera.model.name(),
            camera.width,
            camera.height,
            fx,
            fy
        );
    }
    for image in recon.images.values() {
        let c = image.center();
        debug!(
            "Image {} '{}': {} triangulated keypoints, center [{:.3}, {:.3}, {:.3}]",
            image.id,
            image.name,
            image.num_points3d(),
            c.x,
            c.y,
            c.z
        );
    }
    if let Some((min, max)) = recon.bounds() {
        info!(
            "Point cloud bounds: min [{:.3}, {:.3}, {:.3}] max [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    Ok(recon)
}
