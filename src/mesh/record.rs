//! Raw triangle mesh records.
//!
//! A [`MeshRecord`] is the plain array form of a mesh: vertex positions,
//! triangles as index triples, and an optional parallel list of per-face RGB
//! colors. It is what file loaders produce, what the cleaning filters consume
//! and return, and what the topology builder is fed from.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

/// Per-face RGB color with components in `[0, 1]`.
pub type Color = [f64; 3];

/// Vertex positions, triangles and optional per-face colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Triangles, each three indices into `positions`.
    pub faces: Vec<[usize; 3]>,
    /// Optional per-face colors, parallel to `faces`.
    pub face_colors: Option<Vec<Color>>,
}

impl MeshRecord {
    /// Create a record without colors.
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            positions,
            faces,
            face_colors: None,
        }
    }

    /// Create a record with per-face colors.
    pub fn with_colors(
        positions: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
        face_colors: Vec<Color>,
    ) -> Self {
        Self {
            positions,
            faces,
            face_colors: Some(face_colors),
        }
    }

    /// Create a record from polygon index lists.
    ///
    /// Every polygon must have exactly three corners.
    pub fn from_polygons(positions: Vec<Point3<f64>>, polygons: &[Vec<usize>]) -> Result<Self> {
        let faces = triangles_from_polygons(polygons)?;
        Ok(Self::new(positions, faces))
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Color of a face, if the record carries colors.
    pub fn face_color(&self, face: usize) -> Option<Color> {
        self.face_colors.as_ref().and_then(|c| c.get(face).copied())
    }

    /// Check that every index is in range and the color list matches.
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&vi) = face.iter().find(|&&vi| vi >= n) {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: vi,
                    vertex_count: n,
                });
            }
        }
        if let Some(colors) = &self.face_colors {
            if colors.len() != self.faces.len() {
                return Err(MeshError::ColorCountMismatch {
                    expected: self.faces.len(),
                    actual: colors.len(),
                });
            }
        }
        Ok(())
    }

    /// Positions of the three corners of a face.
    #[inline]
    pub fn triangle(&self, face: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[face];
        [self.positions[a], self.positions[b], self.positions[c]]
    }

    /// Keep only the faces for which `keep` is true, colors in lock-step.
    ///
    /// Vertices are left untouched.
    pub fn retain_faces(&self, keep: &[bool]) -> MeshRecord {
        debug_assert_eq!(keep.len(), self.faces.len());

        let faces = self
            .faces
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(f, _)| *f)
            .collect();

        let face_colors = self.face_colors.as_ref().map(|colors| {
            colors
                .iter()
                .zip(keep)
                .filter(|(_, &k)| k)
                .map(|(c, _)| *c)
                .collect()
        });

        MeshRecord {
            positions: self.positions.clone(),
            faces,
            face_colors,
        }
    }
}

/// Convert polygon index lists to triangles, rejecting any other arity.
pub fn triangles_from_polygons(polygons: &[Vec<usize>]) -> Result<Vec<[usize; 3]>> {
    polygons
        .iter()
        .enumerate()
        .map(|(fi, p)| match p.as_slice() {
            &[a, b, c] => Ok([a, b, c]),
            _ => Err(MeshError::NonTriangularFace {
                face: fi,
                arity: p.len(),
            }),
        })
        .collect()
}

/// Area of a triangle.
#[inline]
pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Centroid of a triangle.
#[inline]
pub fn triangle_centroid(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Unit normal of a triangle, or the zero vector if it is degenerate.
pub fn triangle_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > 1e-12 {
        n / len
    } else {
        Vector3::zeros()
    }
}

/// Edge lengths `|b - a|`, `|c - b|`, `|a - c|`.
#[inline]
pub fn edge_lengths(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> [f64; 3] {
    [(b - a).norm(), (c - b).norm(), (a - c).norm()]
}

/// Ratio of the longest to the shortest edge.
///
/// Infinite when the shortest edge has zero length.
pub fn aspect_ratio(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let lengths = edge_lengths(a, b, c);
    let longest = lengths.iter().cloned().fold(0.0_f64, f64::max);
    let shortest = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
    if shortest > 0.0 {
        longest / shortest
    } else {
        f64::INFINITY
    }
}
