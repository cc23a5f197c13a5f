//! Mesh artifact selection.
//!
//! The meshing stage may stop at any sub-phase, so the controller probes the
//! output directory for the best tier that actually exists.

use crate::constants::{DENSE_CLOUD_FILE, REFINED_MESH_FILE, TEXTURED_MESH_FILE};
use relief_data::{PlyHeader, read_ply_header};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Quality tiers the selector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshTier {
    Textured,
    Refined,
    DenseCloud,
}

impl MeshTier {
    /// Probe order, highest quality first.
    pub const PRIORITY: [MeshTier; 3] = [
        MeshTier::Textured,
        MeshTier::Refined,
        MeshTier::DenseCloud,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            MeshTier::Textured => TEXTURED_MESH_FILE,
            MeshTier::Refined => REFINED_MESH_FILE,
            MeshTier::DenseCloud => DENSE_CLOUD_FILE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshTier::Textured => "refined textured mesh",
            MeshTier::Refined => "refined mesh",
            MeshTier::DenseCloud => "dense point cloud",
        }
    }
}

/// Result of probing the mesh output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSelection {
    Textured(PathBuf),
    RefinedOnly(PathBuf),
    DenseCloudOnly(PathBuf),
    None,
}

impl ArtifactSelection {
    fn from_tier(tier: MeshTier, path: PathBuf) -> Self {
        match tier {
            MeshTier::Textured => ArtifactSelection::Textured(path),
            MeshTier::Refined => ArtifactSelection::RefinedOnly(path),
            MeshTier::DenseCloud => ArtifactSelection::DenseCloudOnly(path),
        }
    }

    pub fn tier(&self) -> Option<MeshTier> {
        match self {
            ArtifactSelection::Textured(_) => Some(MeshTier::Textured),
            ArtifactSelection::RefinedOnly(_) => Some(MeshTier::Refined),
            ArtifactSelection::DenseCloudOnly(_) => Some(MeshTier::DenseCloud),
            ArtifactSelection::None => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ArtifactSelection::Textured(p)
            | ArtifactSelection::RefinedOnly(p)
            | ArtifactSelection::DenseCloudOnly(p) => Some(p.as_path()),
            ArtifactSelection::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ArtifactSelection::None)
    }
}

/// Return the highest tier present in `mvs_dir`, or `None` if nothing is.
pub fn select_artifact(mvs_dir: &Path) -> ArtifactSelection {
    for tier in MeshTier::PRIORITY {
        let path = mvs_dir.join(tier.file_name());
        if path.is_file() {
            info!("Selected {}: {}", tier.label(), path.display());
            return ArtifactSelection::from_tier(tier, path);
        }
        debug!("No {} at {}", tier.label(), path.display());
    }
    warn!("No mesh artifact found in {}", mvs_dir.display());
    ArtifactSelection::None
}

/// Log what the selected artifact contains. Problems reading it are
/// reported and otherwise ignored.
pub fn inspect_artifact(selection: &ArtifactSelection) -> Option<PlyHeader> {
    let path = selection.path()?;
    let header = match read_ply_header(path) {
        Ok(header) => header,
        Err(e) => {
            warn!("Could not inspect {}: {}", path.display(), e);
            return None;
        }
    };

    info!(
        "Artifact holds {} vertices and {} faces ({})",
        header.vertex_count,
        header.face_count,
        if header.is_mesh() { "mesh" } else { "point cloud" }
    );
    if selection.tier() == Some(MeshTier::Textured) {
        info!("Texture images: {}", count_textures(path));
    }
    Some(header)
}

/// Count `<stem>*.png` siblings of a textured mesh.
fn count_textures(mesh: &Path) -> usize {
    let (Some(dir), Some(stem)) = (mesh.parent(), mesh.file_stem().and_then(|s| s.to_str())) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(stem) && name.ends_with(".png")
        })
        .count()
}
