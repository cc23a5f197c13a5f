//! PLY header inspection.
//!
//! Mesh artifacts can be hundreds of megabytes of binary payload; only the
//! header is needed to tell a point cloud from a mesh and to report sizes.

use crate::error::ModelError;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Encoding, Header};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const TEXTURE_FILE_COMMENT: &str = "TextureFile";

/// Body encoding declared by the `format` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyEncoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl From<&Encoding> for PlyEncoding {
    fn from(encoding: &Encoding) -> Self {
        match encoding {
            Encoding::Ascii => PlyEncoding::Ascii,
            Encoding::BinaryLittleEndian => PlyEncoding::BinaryLittleEndian,
            Encoding::BinaryBigEndian => PlyEncoding::BinaryBigEndian,
        }
    }
}

/// Element counts and metadata from a PLY header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyHeader {
    pub encoding: PlyEncoding,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Texture images named by `comment TextureFile` lines.
    pub texture_files: Vec<String>,
}

impl PlyHeader {
    /// A header with no faces describes a point cloud.
    pub fn is_mesh(&self) -> bool {
        self.face_count > 0
    }

    /// Parse a header from a reader positioned at the start of the file.
    /// The body is left unread.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, ModelError> {
        let header = Parser::<DefaultElement>::new()
            .read_header(&mut reader)
            .map_err(|e| ModelError::PlyHeader(e.to_string()))?;
        let parsed = Self::from(&header);
        debug!(
            "PLY header: {:?}, {} vertices, {} faces",
            parsed.encoding, parsed.vertex_count, parsed.face_count
        );
        Ok(parsed)
    }
}

impl From<&Header> for PlyHeader {
    fn from(header: &Header) -> Self {
        let element_count = |name: &str| header.elements.get(name).map_or(0, |e| e.count);
        let texture_files = header
            .comments
            .iter()
            .filter_map(|comment| {
                let mut parts = comment.split_whitespace();
                match parts.next() {
                    Some(TEXTURE_FILE_COMMENT) => parts.next().map(str::to_string),
                    _ => None,
                }
            })
            .collect();

        Self {
            encoding: PlyEncoding::from(&header.encoding),
            vertex_count: element_count("vertex"),
            face_count: element_count("face"),
            texture_files,
        }
    }
}

/// Read only the header of a PLY file.
pub fn read_ply_header(path: &Path) -> Result<PlyHeader, ModelError> {
    let file = File::open(path)?;
    PlyHeader::from_reader(BufReader::new(file))
}
