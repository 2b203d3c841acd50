//! Test meshes shared by the unit tests.

use std::collections::HashMap;

use nalgebra::Point3;

use super::record::MeshRecord;

pub(crate) fn tetrahedron() -> MeshRecord {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
    MeshRecord::new(vertices, faces)
}

/// Unit square split along the 0-2 diagonal.
pub(crate) fn quad() -> MeshRecord {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    MeshRecord::new(vertices, vec![[0, 1, 2], [0, 2, 3]])
}

pub(crate) fn two_disjoint_triangles() -> MeshRecord {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
        Point3::new(5.0, 1.0, 0.0),
    ];
    MeshRecord::new(vertices, vec![[0, 1, 2], [3, 4, 5]])
}

pub(crate) fn flat_grid(n: usize) -> MeshRecord {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = j * (n + 1) + i + 1;
            let v01 = (j + 1) * (n + 1) + i;
            let v11 = (j + 1) * (n + 1) + i + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    MeshRecord::new(vertices, faces)
}

pub(crate) fn icosphere(subdivisions: usize) -> MeshRecord {
    // Start with icosahedron
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = 1.0 / (1.0 + phi * phi).sqrt();

    let mut vertices = vec![
        Point3::new(-1.0, phi, 0.0) * scale,
        Point3::new(1.0, phi, 0.0) * scale,
        Point3::new(-1.0, -phi, 0.0) * scale,
        Point3::new(1.0, -phi, 0.0) * scale,
        Point3::new(0.0, -1.0, phi) * scale,
        Point3::new(0.0, 1.0, phi) * scale,
        Point3::new(0.0, -1.0, -phi) * scale,
        Point3::new(0.0, 1.0, -phi) * scale,
        Point3::new(phi, 0.0, -1.0) * scale,
        Point3::new(phi, 0.0, 1.0) * scale,
        Point3::new(-phi, 0.0, -1.0) * scale,
        Point3::new(-phi, 0.0, 1.0) * scale,
    ];

    let mut faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::new();
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for face in &faces {
            let mut mids = [0usize; 3];

            for i in 0..3 {
                let v0 = face[i];
                let v1 = face[(i + 1) % 3];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

                mids[i] = *edge_midpoints.entry(key).or_insert_with(|| {
                    let mid = Point3::from((vertices[v0].coords + vertices[v1].coords) / 2.0);
                    vertices.push(Point3::from(mid.coords.normalize()));
                    vertices.len() - 1
                });
            }

            new_faces.push([face[0], mids[0], mids[2]]);
            new_faces.push([face[1], mids[1], mids[0]]);
            new_faces.push([face[2], mids[2], mids[1]]);
            new_faces.push([mids[0], mids[1], mids[2]]);
        }

        faces = new_faces;
    }

    MeshRecord::new(vertices, faces)
}
