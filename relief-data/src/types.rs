//! Core data types for sparse reconstructions.
//!
//! These mirror what a structure-from-motion stage writes to disk: a set of
//! cameras, a set of registered images with poses, and a set of 3D points,
//! each carrying the track of image observations that support it.

use glam::{DQuat, DVec2, DVec3};
use std::collections::BTreeMap;

/// COLMAP camera models, identified on disk by id (binary) or name (text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraModel {
    SimplePinhole,
    Pinhole,
    SimpleRadial,
    Radial,
    OpenCv,
    OpenCvFisheye,
    FullOpenCv,
    Fov,
    SimpleRadialFisheye,
    RadialFisheye,
    ThinPrismFisheye,
}

impl CameraModel {
    const ALL: [CameraModel; 11] = [
        CameraModel::SimplePinhole,
        CameraModel::Pinhole,
        CameraModel::SimpleRadial,
        CameraModel::Radial,
        CameraModel::OpenCv,
        CameraModel::OpenCvFisheye,
        CameraModel::FullOpenCv,
        CameraModel::Fov,
        CameraModel::SimpleRadialFisheye,
        CameraModel::RadialFisheye,
        CameraModel::ThinPrismFisheye,
    ];

    /// Numeric id used in `cameras.bin`.
    pub fn id(self) -> i32 {
        match self {
            CameraModel::SimplePinhole => 0,
            CameraModel::Pinhole => 1,
            CameraModel::SimpleRadial => 2,
            CameraModel::Radial => 3,
            CameraModel::OpenCv => 4,
            CameraModel::OpenCvFisheye => 5,
            CameraModel::FullOpenCv => 6,
            CameraModel::Fov => 7,
            CameraModel::SimpleRadialFisheye => 8,
            CameraModel::RadialFisheye => 9,
            CameraModel::ThinPrismFisheye => 10,
        }
    }

    /// Name used in `cameras.txt`.
    pub fn name(self) -> &'static str {
        match self {
            CameraModel::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModel::Pinhole => "PINHOLE",
            CameraModel::SimpleRadial => "SIMPLE_RADIAL",
            CameraModel::Radial => "RADIAL",
            CameraModel::OpenCv => "OPENCV",
            CameraModel::OpenCvFisheye => "OPENCV_FISHEYE",
            CameraModel::FullOpenCv => "FULL_OPENCV",
            CameraModel::Fov => "FOV",
            CameraModel::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModel::RadialFisheye => "RADIAL_FISHEYE",
            CameraModel::ThinPrismFisheye => "THIN_PRISM_FISHEYE",
        }
    }

    /// Number of intrinsic parameters stored for this model.
    pub fn num_params(self) -> usize {
        match self {
            CameraModel::SimplePinhole => 3,
            CameraModel::Pinhole => 4,
            CameraModel::SimpleRadial => 4,
            CameraModel::Radial => 5,
            CameraModel::OpenCv => 8,
            CameraModel::OpenCvFisheye => 8,
            CameraModel::FullOpenCv => 12,
            CameraModel::Fov => 5,
            CameraModel::SimpleRadialFisheye => 4,
            CameraModel::RadialFisheye => 5,
            CameraModel::ThinPrismFisheye => 12,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Camera intrinsics shared by one or more images.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub id: u32,
    pub model: CameraModel,
    pub width: u64,
    pub height: u64,
    /// Model-specific parameters, `model.num_params()` long.
    pub params: Vec<f64>,
}

impl Camera {
    /// Focal lengths `(fx, fy)`; single-focal models report the same value twice.
    pub fn focal_lengths(&self) -> (f64, f64) {
        match self.model {
            CameraModel::SimplePinhole
            | CameraModel::SimpleRadial
            | CameraModel::SimpleRadialFisheye
            | CameraModel::Radial
            | CameraModel::RadialFisheye => (self.params[0], self.params[0]),
            _ => (self.params[0], self.params[1]),
        }
    }
}

/// A keypoint observed in an image, optionally linked to a 3D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub xy: DVec2,
    pub point3d_id: Option<u64>,
}

/// A registered image with its world-to-camera pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: u32,
    pub camera_id: u32,
    /// World-to-camera rotation.
    pub rotation: DQuat,
    /// World-to-camera translation.
    pub translation: DVec3,
    pub name: String,
    pub keypoints: Vec<Keypoint>,
}

impl Image {
    /// Camera center in world coordinates (`-R^T t`).
    pub fn center(&self) -> DVec3 {
        -(self.rotation.inverse() * self.translation)
    }

    /// Number of keypoints that triangulated into a 3D point.
    pub fn num_points3d(&self) -> usize {
        self.keypoints
            .iter()
            .filter(|k| k.point3d_id.is_some())
            .count()
    }
}

/// One observation in a point's track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackElement {
    pub image_id: u32,
    pub point2d_idx: u32,
}

/// A triangulated 3D point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point3D {
    pub id: u64,
    pub position: DVec3,
    pub color: [u8; 3],
    /// Mean reprojection error in pixels.
    pub error: f64,
    pub track: Vec<TrackElement>,
}

impl Point3D {
    /// Number of images observing this point.
    pub fn track_length(&self) -> usize {
        self.track.len()
    }
}

/// A full sparse reconstruction as loaded from a model directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    pub cameras: BTreeMap<u32, Camera>,
    pub images: BTreeMap<u32, Image>,
    pub points: Vec<Point3D>,
}

impl Reconstruction {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every registered image references the same camera.
    pub fn has_shared_camera(&self) -> bool {
        let mut ids = self.images.values().map(|i| i.camera_id);
        match ids.next() {
            Some(first) => ids.all(|id| id == first),
            None => false,
        }
    }

    /// Axis-aligned bounds of the point set, `None` when empty.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = self.points.first()?.position;
        Some(self.points.iter().fold((first, first), |(min, max), p| {
            (min.min(p.position), max.max(p.position))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u64, position: DVec3, track_len: u32) -> Point3D {
        Point3D {
            id,
            position,
            color: [128, 128, 128],
            error: 0.5,
            track: (0..track_len)
                .map(|i| TrackElement {
                    image_id: i + 1,
                    point2d_idx: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_camera_model_lookup() {
        assert_eq!(CameraModel::from_id(1), Some(CameraModel::Pinhole));
        assert_eq!(
            CameraModel::from_name("SIMPLE_RADIAL"),
            Some(CameraModel::SimpleRadial)
        );
        assert_eq!(CameraModel::from_id(42), None);
        assert_eq!(CameraModel::from_name("pinhole"), None);
        assert_eq!(CameraModel::FullOpenCv.num_params(), 12);
    }

    #[test]
    fn test_focal_lengths() {
        let cam = Camera {
            id: 1,
            model: CameraModel::SimpleRadial,
            width: 640,
            height: 480,
            params: vec![500.0, 320.0, 240.0, 0.01],
        };
        assert_eq!(cam.focal_lengths(), (500.0, 500.0));

        let cam = Camera {
            model: CameraModel::Pinhole,
            params: vec![500.0, 510.0, 320.0, 240.0],
            ..cam
        };
        assert_eq!(cam.focal_lengths(), (500.0, 510.0));
    }

    #[test]
    fn test_image_center() {
        let image = Image {
            id: 1,
            camera_id: 1,
            rotation: DQuat::IDENTITY,
            translation: DVec3::new(1.0, 2.0, 3.0),
            name: "a.png".to_string(),
            keypoints: vec![],
        };
        assert!((image.center() - DVec3::new(-1.0, -2.0, -3.0)).length() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let mut recon = Reconstruction::default();
        assert!(recon.bounds().is_none());

        recon.points.push(point(1, DVec3::new(1.0, -2.0, 0.0), 2));
        recon.points.push(point(2, DVec3::new(-1.0, 3.0, 5.0), 1));
        let (min, max) = recon.bounds().unwrap();
        assert_eq!(min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, DVec3::new(1.0, 3.0, 5.0));
        assert_eq!(recon.points[0].track_length(), 2);
    }
}
