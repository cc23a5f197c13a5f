//! COLMAP text model readers (`cameras.txt`, `images.txt`, `points3D.txt`).

use crate::error::ModelError;
use crate::types::{Camera, CameraModel, Image, Keypoint, Point3D, TrackElement};
use glam::{DQuat, DVec2, DVec3};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::str::FromStr;

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

fn field<T: FromStr>(
    fields: &[&str],
    idx: usize,
    file: &'static str,
    line: usize,
    name: &str,
) -> Result<T, ModelError> {
    let raw = fields
        .get(idx)
        .ok_or_else(|| ModelError::parse(file, line, format!("missing {}", name)))?;
    raw.parse()
        .map_err(|_| ModelError::parse(file, line, format!("invalid {} '{}'", name, raw)))
}

pub fn read_cameras<R: BufRead>(reader: R) -> Result<BTreeMap<u32, Camera>, ModelError> {
    const FILE: &str = "cameras.txt";
    let mut cameras = BTreeMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if is_skippable(line) {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        let id: u32 = field(&fields, 0, FILE, lineno, "camera id")?;
        let model_name = fields
            .get(1)
            .ok_or_else(|| ModelError::parse(FILE, lineno, "missing camera model"))?;
        let model = CameraModel::from_name(model_name)
            .ok_or_else(|| ModelError::UnknownCameraModel(model_name.to_string()))?;
        let width = field(&fields, 2, FILE, lineno, "width")?;
        let height = field(&fields, 3, FILE, lineno, "height")?;
        let params = (0..model.num_params())
            .map(|i| field(&fields, 4 + i, FILE, lineno, "camera param"))
            .collect::<Result<Vec<f64>, _>>()?;

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

/// Images come in line pairs: the pose line, then the keypoint line. The
/// keypoint line is consumed unconditionally since it may be empty.
pub fn read_images<R: BufRead>(reader: R) -> Result<BTreeMap<u32, Image>, ModelError> {
    const FILE: &str = "images.txt";
    let mut images = BTreeMap::new();
    let mut lines = reader.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let line = line?;
        let line = line.trim();
        if is_skippable(line) {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        let id: u32 = field(&fields, 0, FILE, lineno, "image id")?;
        let qw = field(&fields, 1, FILE, lineno, "qw")?;
        let qx = field(&fields, 2, FILE, lineno, "qx")?;
        let qy = field(&fields, 3, FILE, lineno, "qy")?;
        let qz = field(&fields, 4, FILE, lineno, "qz")?;
        let translation = DVec3::new(
            field(&fields, 5, FILE, lineno, "tx")?,
            field(&fields, 6, FILE, lineno, "ty")?,
            field(&fields, 7, FILE, lineno, "tz")?,
        );
        let camera_id = field(&fields, 8, FILE, lineno, "camera id")?;
        // Image names may contain spaces.
        let name = fields.get(9..).map(|rest| rest.join(" ")).unwrap_or_default();

        let keypoints = match lines.next() {
            Some((kidx, kline)) => parse_keypoints(&kline?, kidx + 1)?,
            None => Vec::new(),
        };

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

fn parse_keypoints(line: &str, lineno: usize) -> Result<Vec<Keypoint>, ModelError> {
    const FILE: &str = "images.txt";
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() % 3 != 0 {
        return Err(ModelError::parse(
            FILE,
            lineno,
            "keypoint line is not a sequence of X Y POINT3D_ID triples",
        ));
    }

    fields
        .chunks_exact(3)
        .map(|chunk| {
            let x = field(chunk, 0, FILE, lineno, "keypoint x")?;
            let y = field(chunk, 1, FILE, lineno, "keypoint y")?;
            let point_id: i64 = field(chunk, 2, FILE, lineno, "keypoint point id")?;
            Ok::<_, ModelError>(Keypoint {
                xy: DVec2::new(x, y),
                point3d_id: u64::try_from(point_id).ok(),
            })
        })
        .collect()
}

pub fn read_points3d<R: BufRead>(reader: R) -> Result<Vec<Point3D>, ModelError> {
    const FILE: &str = "points3D.txt";
    let mut points = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if is_skippable(line) {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        let id = field(&fields, 0, FILE, lineno, "point id")?;
        let position = DVec3::new(
            field(&fields, 1, FILE, lineno, "x")?,
            field(&fields, 2, FILE, lineno, "y")?,
            field(&fields, 3, FILE, lineno, "z")?,
        );
        let color = [
            field(&fields, 4, FILE, lineno, "red")?,
            field(&fields, 5, FILE, lineno, "green")?,
            field(&fields, 6, FILE, lineno, "blue")?,
        ];
        let error = field(&fields, 7, FILE, lineno, "error")?;

        let track_fields = fields.get(8..).unwrap_or_default();
        if track_fields.is_empty() {
            return Err(ModelError::parse(
                FILE,
                lineno,
                format!("point {} has no observations", id),
            ));
        }
        if track_fields.len() % 2 != 0 {
            return Err(ModelError::parse(
                FILE,
                lineno,
                "track is not a sequence of IMAGE_ID POINT2D_IDX pairs",
            ));
        }
        let track = track_fields
            .chunks_exact(2)
            .map(|pair| {
                Ok::<_, ModelError>(TrackElement {
                    image_id: field(pair, 0, FILE, lineno, "track image id")?,
                    point2d_idx: field(pair, 1, FILE, lineno, "track point2d index")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

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
