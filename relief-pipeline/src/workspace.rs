//! Scene directory layout and cleanup.

use crate::constants::{DERIVED_DIRS, IMAGES_SUBDIR, IMAGE_EXTENSIONS, MVS_SUBDIR, SUMMARY_FILE};
use crate::error::PipelineError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths of one scene directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLayout {
    root: PathBuf,
}

impl SceneLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sparse_dir(&self) -> PathBuf {
        self.root.join("sparse")
    }

    pub fn dense_dir(&self) -> PathBuf {
        self.root.join("dense")
    }

    pub fn mesh_dir(&self) -> PathBuf {
        self.root.join("mesh")
    }

    pub fn mvs_dir(&self) -> PathBuf {
        self.root.join(MVS_SUBDIR)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.mesh_dir().join(SUMMARY_FILE)
    }

    /// Remove `sparse`, `dense` and `mesh` with their contents. Missing
    /// directories are not an error.
    #[tracing::instrument(skip_all, fields(scene = %self.root.display()))]
    pub fn clean(&self) -> Result<(), PipelineError> {
        for name in DERIVED_DIRS {
            let path = self.root.join(name);
            match fs::remove_dir_all(&path) {
                Ok(()) => info!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Nothing to remove at {}", path.display())
                }
                Err(source) => return Err(PipelineError::Workspace { path, source }),
            }
        }
        Ok(())
    }

    /// Count source images under `images/`, falling back to the scene root.
    pub fn count_input_images(&self) -> Result<usize, PipelineError> {
        let images_dir = self.root.join(IMAGES_SUBDIR);
        let dir = if images_dir.is_dir() {
            images_dir
        } else {
            self.root.clone()
        };

        let entries = fs::read_dir(&dir).map_err(|source| PipelineError::Workspace {
            path: dir.clone(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| PipelineError::Workspace {
                path: dir.clone(),
                source,
            })?;
            if is_image(&entry.path()) {
                count += 1;
            }
        }

        if count == 0 {
            return Err(PipelineError::NoInputImages(dir));
        }
        info!("Found {} input images in {}", count, dir.display());
        Ok(count)
    }
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_derived_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SceneLayout::new(dir.path());
        for name in DERIVED_DIRS {
            fs::create_dir_all(dir.path().join(name).join("nested")).unwrap();
            fs::write(dir.path().join(name).join("nested/file.bin"), b"x").unwrap();
        }
        fs::create_dir_all(dir.path().join("images")).unwrap();

        layout.clean().unwrap();

        for name in DERIVED_DIRS {
            assert!(!dir.path().join(name).exists(), "{} survived", name);
        }
        assert!(dir.path().join("images").exists());
    }

    #[test]
    fn test_clean_tolerates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SceneLayout::new(dir.path());
        fs::create_dir_all(layout.dense_dir()).unwrap();

        layout.clean().unwrap();
        layout.clean().unwrap();
        assert!(!layout.dense_dir().exists());
    }

    #[test]
    fn test_layout_paths() {
        let layout = SceneLayout::new("/tmp/scene");
        assert_eq!(layout.mvs_dir(), PathBuf::from("/tmp/scene/mesh/mvs"));
        assert_eq!(
            layout.summary_path(),
            PathBuf::from("/tmp/scene/mesh/run_summary.json")
        );
    }

    #[test]
    fn test_count_input_images() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir_all(&images).unwrap();
        for name in [
            "a.JPG", "b.png", "c.jpeg", "d.webp", "e.TIF", "f.heic", "notes.txt",
        ] {
            fs::write(images.join(name), b"").unwrap();
        }

        let layout = SceneLayout::new(dir.path());
        assert_eq!(layout.count_input_images().unwrap(), 5);
    }

    #[test]
    fn test_count_input_images_falls_back_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("frame_000.png"), b"").unwrap();
        let layout = SceneLayout::new(dir.path());
        assert_eq!(layout.count_input_images().unwrap(), 1);
    }

    #[test]
    fn test_no_input_images() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SceneLayout::new(dir.path());
        let err = layout.count_input_images().unwrap_err();
        assert!(matches!(err, PipelineError::NoInputImages(_)));
    }
}
