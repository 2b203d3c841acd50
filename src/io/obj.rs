//! Wavefront OBJ format support.
//!
//! Only vertex positions and faces are read. All objects in the file are
//! merged into one record, and every face must be a triangle. Within each
//! object, vertices are renumbered in order of first use and unreferenced
//! vertices are dropped. OBJ carries no per-face colors, so saved files drop
//! them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::MeshRecord;

/// Load a mesh from an OBJ file.
///
/// # Errors
/// * [`MeshError::LoadError`] if `tobj` cannot parse the file
/// * [`MeshError::NonTriangularFace`] for a face with other than three corners
///
/// # Example
///
/// ```no_run
/// use meshqa::io::obj;
///
/// let record = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshRecord> {
    let path = path.as_ref();

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: false,
            single_index: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::load(path, e.to_string()))?;

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let offset = positions.len();

        for chunk in mesh.positions.chunks_exact(3) {
            positions.push(Point3::new(
                f64::from(chunk[0]),
                f64::from(chunk[1]),
                f64::from(chunk[2]),
            ));
        }

        // An empty arity list means every face is a triangle.
        let mut start = 0;
        let mut push_face = |arity: usize| {
            let face: Vec<usize> = mesh.indices[start..start + arity]
                .iter()
                .map(|&i| i as usize + offset)
                .collect();
            start += arity;
            face
        };
        if mesh.face_arities.is_empty() {
            for _ in 0..mesh.indices.len() / 3 {
                polygons.push(push_face(3));
            }
        } else {
            for &arity in &mesh.face_arities {
                polygons.push(push_face(arity as usize));
            }
        }

        log::debug!(
            "OBJ object '{}': {} positions, {} indices",
            model.name,
            mesh.positions.len() / 3,
            mesh.indices.len()
        );
    }

    let record = MeshRecord::from_polygons(positions, &polygons)?;
    record.validate()?;

    log::debug!(
        "Loaded OBJ {}: {} vertices, {} faces from {} objects",
        path.display(),
        record.num_vertices(),
        record.num_faces(),
        models.len()
    );

    Ok(record)
}

/// Save a mesh to an OBJ file.
pub fn save<P: AsRef<Path>>(record: &MeshRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    record.validate()?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# Generated by meshqa")?;
    for v in &record.positions {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    // OBJ indices are 1-based.
    for f in &record.faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tet.obj");

        let record = fixtures::tetrahedron();
        save(&record, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.num_vertices(), record.num_vertices());
        assert_eq!(loaded.num_faces(), record.num_faces());
        for fi in 0..record.num_faces() {
            assert_eq!(loaded.triangle(fi), record.triangle(fi));
        }
        assert!(loaded.face_colors.is_none());
    }

    #[test]
    fn test_colors_dropped_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quad.obj");

        let mut record = fixtures::quad();
        record.face_colors = Some(vec![[1.0, 0.0, 0.0]; 2]);
        save(&record, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.faces, record.faces);
        assert!(loaded.face_colors.is_none());
    }

    #[test]
    fn test_objects_are_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("two.obj");
        std::fs::write(
            &path,
            "o first\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o second\nv 5 0 0\nv 6 0 0\nv 5 1 0\nf 4 5 6\n",
        )
        .unwrap();

        let record = load(&path).unwrap();
        assert_eq!(record.num_vertices(), 6);
        assert_eq!(record.faces, vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn test_quad_face_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4 2\n",
        )
        .unwrap();

        assert!(matches!(
            load(&path),
            Err(MeshError::NonTriangularFace { face: 1, arity: 4 })
        ));
    }
}
