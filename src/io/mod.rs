//! Mesh file I/O.
//!
//! Loaders produce a [`MeshRecord`]; savers write one back out.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Face colors |
//! |--------|-----------|------|------|-------------|
//! | Object File Format | `.off`, `.coff` | ✓ | ✓ | 0-255 on face lines |
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | none |
//! | PLY | `.ply` | ✓ (ASCII, binary) | ✓ (ASCII) | `red`/`green`/`blue` |
//!
//! Only triangle faces are accepted.
//!
//! # Usage
//!
//! ```no_run
//! use meshqa::io::{load, save};
//!
//! // Load with automatic format detection
//! let record = load("scan.off").unwrap();
//!
//! // Save with automatic format detection
//! save(&record, "scan.ply").unwrap();
//! ```

pub mod obj;
pub mod off;
pub mod ply;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::MeshRecord;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// OFF or COFF.
    Off,
    /// Wavefront OBJ.
    Obj,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "off" | "coff" => Some(Format::Off),
            "obj" => Some(Format::Obj),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshRecord> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::load(path),
        Format::Obj => obj::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn save<P: AsRef<Path>>(record: &MeshRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::save(record, path),
        Format::Obj => obj::save(record, path),
        Format::Ply => ply::save(record, path),
    }
}
