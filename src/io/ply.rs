//! PLY (Stanford polygon) format support.
//!
//! Loading accepts ASCII and binary files through `ply-rs`. Faces must be
//! triangles; optional `red`/`green`/`blue` face properties become face
//! colors. Saving writes ASCII with `uchar` face colors when present.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{Color, MeshRecord};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use meshqa::io::ply;
///
/// let record = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshRecord> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::load(path, e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::load(path, "PLY file has no vertex element"))?;

    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| MeshError::load(path, format!("vertex missing {} coordinate", name)))
        };
        positions.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| MeshError::load(path, "PLY file has no face element"))?;

    let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    let mut colors: Vec<Color> = Vec::new();
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| MeshError::load(path, "face missing vertex_indices property"))?;
        polygons.push(indices);

        let channel = |name: &str| {
            get_color_component(face, name).map_err(|message| MeshError::load(path, message))
        };
        if let (Some(r), Some(g), Some(b)) = (channel("red")?, channel("green")?, channel("blue")?) {
            colors.push([r, g, b]);
        }
    }

    let mut record = MeshRecord::from_polygons(positions, &polygons)?;
    if !colors.is_empty() {
        if colors.len() != record.num_faces() {
            return Err(MeshError::load(path, "face colors missing on some faces"));
        }
        record.face_colors = Some(colors);
    }
    record.validate()?;

    log::debug!(
        "Loaded PLY {}: {} vertices, {} faces",
        path.display(),
        record.num_vertices(),
        record.num_faces()
    );

    Ok(record)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

/// Integer color channels are on the 0-255 scale, float channels on 0-1.
///
/// `Ok(None)` if the face has no such property. Values outside the scale and
/// list properties are errors.
fn get_color_component(
    element: &DefaultElement,
    name: &str,
) -> std::result::Result<Option<f64>, String> {
    let (value, max) = match element.get(name) {
        None => return Ok(None),
        Some(Property::Float(v)) => (*v as f64, 1.0),
        Some(Property::Double(v)) => (*v, 1.0),
        Some(Property::Char(v)) => (*v as f64, 255.0),
        Some(Property::UChar(v)) => (*v as f64, 255.0),
        Some(Property::Short(v)) => (*v as f64, 255.0),
        Some(Property::UShort(v)) => (*v as f64, 255.0),
        Some(Property::Int(v)) => (*v as f64, 255.0),
        Some(Property::UInt(v)) => (*v as f64, 255.0),
        Some(_) => return Err(format!("face property {} is not a scalar", name)),
    };
    if !(0.0..=max).contains(&value) {
        return Err(format!("face {} value {} outside [0, {}]", name, value, max));
    }
    Ok(Some(value / max))
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// # Example
///
/// ```no_run
/// use meshqa::io::ply;
/// use meshqa::mesh::MeshRecord;
///
/// let record = MeshRecord::default();
/// ply::save(&record, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(record: &MeshRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    record.validate()?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by meshqa")?;
    writeln!(writer, "element vertex {}", record.num_vertices())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", record.num_faces())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    if record.face_colors.is_some() {
        writeln!(writer, "property uchar red")?;
        writeln!(writer, "property uchar green")?;
        writeln!(writer, "property uchar blue")?;
    }
    writeln!(writer, "end_header")?;

    for v in &record.positions {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for (fi, f) in record.faces.iter().enumerate() {
        match record.face_color(fi) {
            Some(c) => writeln!(
                writer,
                "3 {} {} {} {} {} {}",
                f[0],
                f[1],
                f[2],
                to_byte(c[0]),
                to_byte(c[1]),
                to_byte(c[2])
            )?,
            None => writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?,
        }
    }

    writer.flush()?;
    Ok(())
}

fn to_byte(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
