//! COLMAP binary model readers (`cameras.bin`, `images.bin`, `points3D.bin`).
//!
//! All values are little-endian. Counts are `u64`, ids are `u32` except
//! point ids which are `u64`. An unset 3D point id on a keypoint is stored
//! as `u64::MAX`.

use crate::error::ModelError;
use crate::types::{Camera, CameraModel, Image, Keypoint, Point3D, TrackElement};
use glam::{DQuat, DVec2, DVec3};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Read};

const INVALID_POINT3D_ID: u64 = u64::MAX;

// Upper bound for pre-allocation so a corrupt count cannot exhaust memory.
const MAX_PREALLOC: usize = 1 << 16;

struct ByteReader<R> {
    inner: R,
    file: &'static str,
}

impl<R: Read> ByteReader<R> {
    fn new(inner: R, file: &'static str) -> Self {
        Self { inner, file }
    }

    fn bytes<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], ModelError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ModelError::Truncated {
                    file: self.file,
                    what,
                }
            } else {
                ModelError::Io(e)
            }
        })?;
        Ok(buf)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, ModelError> {
        Ok(self.bytes::<1>(what)?[0])
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, ModelError> {
        Ok(u32::from_le_bytes(self.bytes(what)?))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32, ModelError> {
        Ok(i32::from_le_bytes(self.bytes(what)?))
    }

    fn u64(&mut self, what: &'static str) -> Result<u64, ModelError> {
        Ok(u64::from_le_bytes(self.bytes(what)?))
    }

    fn f64(&mut self, what: &'static str) -> Result<f64, ModelError> {
        Ok(f64::from_le_bytes(self.bytes(what)?))
    }

    fn dvec3(&mut self, what: &'static str) -> Result<DVec3, ModelError> {
        Ok(DVec3::new(self.f64(what)?, self.f64(what)?, self.f64(what)?))
    }

    /// Null-terminated string.
    fn c_string(&mut self, what: &'static str) -> Result<String, ModelError> {
        let mut raw = Vec::new();
        loop {
            match self.u8(what)? {
                0 => break,
                b => raw.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn count(&mut self, what: &'static str) -> Result<usize, ModelError> {
        let n = self.u64(what)?;
        usize::try_from(n).map_err(|_| ModelError::Truncated {
            file: self.file,
            what,
        })
    }
}

pub fn read_cameras<R: Read>(reader: R) -> Result<BTreeMap<u32, Camera>, ModelError> {
    let mut r = ByteReader::new(reader, "cameras.bin");
    let n = r.count("camera count")?;
    let mut cameras = BTreeMap::new();

    for _ in 0..n {
        let id = r.u32("camera id")?;
        let model_id = r.i32("camera model")?;
        let model = CameraModel::from_id(model_id)
            .ok_or_else(|| ModelError::UnknownCameraModel(model_id.to_string()))?;
        let width = r.u64("camera width")?;
        let height = r.u64("camera height")?;
        let params = (0..model.num_params())
            .map(|_| r.f64("camera params"))
            .collect::<Result<Vec<_>, _>>()?;

        cameras.insert(
            id,
            Camera {
                id,
                model,
                width,
                height,
                params,
            },
        );
    }

    Ok(cameras)
}

pub fn read_images<R: Read>(reader: R) -> Result<BTreeMap<u32, Image>, ModelError> {
    let mut r = ByteReader::new(reader, "images.bin");
    let n = r.count("image count")?;
    let mut images = BTreeMap::new();

    for _ in 0..n {
        let id = r.u32("image id")?;
        let qw = r.f64("image rotation")?;
        let qx = r.f64("image rotation")?;
        let qy = r.f64("image rotation")?;
        let qz = r.f64("image rotation")?;
        let translation = r.dvec3("image translation")?;
        let camera_id = r.u32("image camera id")?;
        let name = r.c_string("image name")?;

        let num_keypoints = r.count("keypoint count")?;
        let mut keypoints = Vec::with_capacity(num_keypoints.min(MAX_PREALLOC));
        for _ in 0..num_keypoints {
            let x = r.f64("keypoint")?;
            let y = r.f64("keypoint")?;
            let point_id = r.u64("keypoint point id")?;
            keypoints.push(Keypoint {
                xy: DVec2::new(x, y),
                point3d_id: (point_id != INVALID_POINT3D_ID).then_some(point_id),
            });
        }

        images.insert(
            id,
            Image {
                id,
                camera_id,
                rotation: DQuat::from_xyzw(qx, qy, qz, qw),
                translation,
                name,
                keypoints,
            },
        );
    }

    Ok(images)
}

pub fn read_points3d<R: Read>(reader: R) -> Result<Vec<Point3D>, ModelError> {
    let mut r = ByteReader::new(reader, "points3D.bin");
    let n = r.count("point count")?;
    let mut points = Vec::with_capacity(n.min(MAX_PREALLOC));

    for _ in 0..n {
        let id = r.u64("point id")?;
        let position = r.dvec3("point position")?;
        let color = [
            r.u8("point color")?,
            r.u8("point color")?,
            r.u8("point color")?,
        ];
        let error = r.f64("point error")?;

        let track_len = r.count("track length")?;
        if track_len == 0 {
            return Err(ModelError::EmptyTrack { point_id: id });
        }
        let mut track = Vec::with_capacity(track_len.min(MAX_PREALLOC));
        for _ in 0..track_len {
            track.push(TrackElement {
                image_id: r.u32("track image id")?,
                point2d_idx: r.u32("track point2d index")?,
            });
        }

        points.push(Point3D {
            id,
            position,
            color,
            error,
            track,
        });
    }

    Ok(points)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Little-endian byte builder for synthetic model files.
    #[derive(Default)]
    pub(crate) struct Bytes(pub Vec<u8>);

    impl Bytes {
        pub fn u8(mut self, v: u8) -> Self {
            self.0.push(v);
            self
        }
        pub fn u32(mut self, v: u32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn i32(mut self, v: i32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn u64(mut self, v: u64) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn f64(mut self, v: f64) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn str(mut self, v: &str) -> Self {
            self.0.extend_from_slice(v.as_bytes());
            self.0.push(0);
            self
        }
    }

    pub(crate) fn cameras_bytes() -> Vec<u8> {
        Bytes::default()
            .u64(1)
            .u32(1)
            .i32(CameraModel::Pinhole.id())
            .u64(640)
            .u64(480)
            .f64(500.0)
            .f64(500.0)
            .f64(320.0)
            .f64(240.0)
            .0
    }

    pub(crate) fn images_bytes() -> Vec<u8> {
        let mut b = Bytes::default().u64(2);
        for (id, name) in [(1u32, "a.png"), (2u32, "b.png")] {
            b = b
                .u32(id)
                .f64(1.0)
                .f64(0.0)
                .f64(0.0)
                .f64(0.0)
                .f64(0.0)
                .f64(0.0)
                .f64(id as f64)
                .u32(1)
                .str(name)
                .u64(2)
                .f64(10.0)
                .f64(20.0)
                .u64(7)
                .f64(30.0)
                .f64(40.0)
                .u64(INVALID_POINT3D_ID);
        }
        b.0
    }

    /// Points with the given track lengths, ids starting at 1.
    pub(crate) fn points_bytes(track_lengths: &[u32]) -> Vec<u8> {
        let mut b = Bytes::default().u64(track_lengths.len() as u64);
        for (i, &len) in track_lengths.iter().enumerate() {
            b = b
                .u64(i as u64 + 1)
                .f64(i as f64)
                .f64(0.0)
                .f64(-(i as f64))
                .u8(255)
                .u8(0)
                .u8(10)
                .f64(0.25)
                .u64(len as u64);
            for j in 0..len {
                b = b.u32(j + 1).u32(i as u32);
            }
        }
        b.0
    }

    #[test]
    fn test_read_cameras() {
        let cameras = read_cameras(cameras_bytes().as_slice()).unwrap();
        assert_eq!(cameras.len(), 1);
        let cam = &cameras[&1];
        assert_eq!(cam.model, CameraModel::Pinhole);
        assert_eq!((cam.width, cam.height), (640, 480));
        assert_eq!(cam.params, vec![500.0, 500.0, 320.0, 240.0]);
    }

    #[test]
    fn test_read_images() {
        let images = read_images(images_bytes().as_slice()).unwrap();
        assert_eq!(images.len(), 2);
        let img = &images[&2];
        assert_eq!(img.name, "b.png");
        assert_eq!(img.camera_id, 1);
        assert_eq!(img.translation, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(img.keypoints.len(), 2);
        assert_eq!(img.keypoints[0].point3d_id, Some(7));
        assert_eq!(img.keypoints[1].point3d_id, None);
        assert_eq!(img.num_points3d(), 1);
    }

    #[test]
    fn test_read_points3d() {
        let points = read_points3d(points_bytes(&[1, 3, 2]).as_slice()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].id, 2);
        assert_eq!(points[1].track_length(), 3);
        assert_eq!(points[1].color, [255, 0, 10]);
        assert_eq!(points[2].position, DVec3::new(2.0, 0.0, -2.0));
    }

    #[test]
    fn test_point_without_observations() {
        let err = read_points3d(points_bytes(&[2, 0, 1]).as_slice()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrack { point_id: 2 }));
    }

    #[test]
    fn test_truncated_points() {
        let mut bytes = points_bytes(&[2, 2]);
        bytes.truncate(bytes.len() - 3);
        let err = read_points3d(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Truncated {
                file: "points3D.bin",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_camera_model() {
        let bytes = Bytes::default().u64(1).u32(1).i32(99).0;
        let err = read_cameras(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownCameraModel(ref id) if id == "99"));
    }
}
