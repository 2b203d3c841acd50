//! Per-face and per-vertex differential geometry.
//!
//! This module computes the geometric quantities the metrics engine builds
//! on: interior angles and areas of every face, mixed Voronoi areas of every
//! vertex, and the cotangent of the angle opposite every half-edge.
//!
//! All routines tolerate degenerate input. Zero-length edges give zero
//! angles, collinear corners give zero cotangents, and accumulated Voronoi
//! areas are clamped to be non-negative.
//!
//! # References
//!
//! - Meyer, M., et al. (2003). "Discrete Differential-Geometry Operators for
//!   Triangulated 2-Manifolds." Visualization and Mathematics III.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{triangle_area, HalfEdgeId, MeshIndex, Topology};

/// Vectors shorter than this have no direction.
const LENGTH_EPSILON: f64 = 1e-14;

/// Angles whose sine is below this are treated as flat.
const SINE_EPSILON: f64 = 1e-12;

/// Geometry of a single triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    /// Interior angles in radians, one per corner in face order.
    pub angles: [f64; 3],
    /// Triangle area.
    pub area: f64,
    /// Whether any corner has a negative dot product.
    pub is_obtuse: bool,
}

/// Geometry derived from a topology and its vertex positions.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    /// Per-face angles and areas.
    pub faces: Vec<FaceGeometry>,
    /// Mixed Voronoi area of each vertex, never negative.
    pub voronoi_areas: Vec<f64>,
    /// Cotangent of the angle opposite each half-edge.
    pub cotangents: Vec<f64>,
}

impl MeshGeometry {
    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(|f| f.area).sum()
    }

    /// Cotangent of the angle opposite a half-edge.
    #[inline]
    pub fn cotangent<I: MeshIndex>(&self, he: HalfEdgeId<I>) -> f64 {
        self.cotangents[he.index()]
    }
}

/// Compute face, vertex and half-edge geometry.
///
/// # Errors
/// [`MeshError::VertexCountMismatch`] if `positions` does not have one entry
/// per topology vertex.
pub fn compute_geometry<I: MeshIndex>(
    topology: &Topology<I>,
    positions: &[Point3<f64>],
) -> Result<MeshGeometry> {
    if positions.len() != topology.num_vertices() {
        return Err(MeshError::VertexCountMismatch {
            expected: topology.num_vertices(),
            actual: positions.len(),
        });
    }

    let mut faces = Vec::with_capacity(topology.num_faces());
    let mut voronoi_areas = vec![0.0; topology.num_vertices()];

    for (_, face) in topology.faces() {
        let [a, b, c] = face.vertices.map(|v| positions[v.index()]);
        let geometry = face_geometry(&a, &b, &c);
        let contributions = voronoi_contributions(&a, &b, &c);
        for (v, area) in face.vertices.iter().zip(contributions) {
            voronoi_areas[v.index()] += area;
        }
        faces.push(geometry);
    }

    for area in voronoi_areas.iter_mut() {
        if *area < 0.0 {
            *area = 0.0;
        }
    }

    let cotangents = topology
        .halfedge_ids()
        .map(|he| halfedge_cotangent(topology, positions, he))
        .collect();

    Ok(MeshGeometry {
        faces,
        voronoi_areas,
        cotangents,
    })
}

/// Angles, area and obtuse flag of triangle (a, b, c).
pub fn face_geometry(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> FaceGeometry {
    FaceGeometry {
        angles: [
            triangle_angle(a, b, c),
            triangle_angle(b, c, a),
            triangle_angle(c, a, b),
        ],
        area: triangle_area(a, b, c),
        is_obtuse: obtuse_corner(a, b, c).is_some(),
    }
}

/// Compute the angle at vertex `a` in triangle (a, b, c).
///
/// Zero if either adjacent edge is degenerate.
pub fn triangle_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let (lab, lac) = (ab.norm(), ac.norm());
    if lab < LENGTH_EPSILON || lac < LENGTH_EPSILON {
        return 0.0;
    }
    (ab.dot(&ac) / (lab * lac)).clamp(-1.0, 1.0).acos()
}

/// Compute the cotangent of the angle at vertex `a` in triangle (a, b, c).
///
/// Zero when the corner is flat relative to its edge lengths, so the result
/// does not depend on the scale of the mesh.
pub fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let dot = ab.dot(&ac);
    let cross_norm = ab.cross(&ac).norm();
    if cross_norm <= SINE_EPSILON * ab.norm() * ac.norm() {
        0.0
    } else {
        dot / cross_norm
    }
}

/// Angle between two vectors via `atan2(|u x v|, u . v)`.
///
/// Zero if either vector is shorter than `1e-14`.
pub fn angle_between_vectors(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    if u.norm() < LENGTH_EPSILON || v.norm() < LENGTH_EPSILON {
        return 0.0;
    }
    u.cross(v).norm().atan2(u.dot(v))
}

/// Cotangent of an angle, zero where the sine vanishes.
#[inline]
pub fn cotangent(angle: f64) -> f64 {
    let s = angle.sin();
    if s.abs() < SINE_EPSILON {
        0.0
    } else {
        angle.cos() / s
    }
}

/// Index of the corner with a negative dot product, if any.
fn obtuse_corner(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<usize> {
    let corners = [(a, b, c), (b, c, a), (c, a, b)];
    corners
        .iter()
        .position(|(p, q, r)| (*q - *p).dot(&(*r - *p)) < 0.0)
}

/// Mixed Voronoi area each corner of triangle (a, b, c) receives.
///
/// Non-obtuse triangles use the circumcentric Voronoi formula
/// `(|PR|^2 cot Q + |PQ|^2 cot R) / 8`. In an obtuse triangle the obtuse
/// corner receives half the area and the other two a quarter each.
pub fn voronoi_contributions(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> [f64; 3] {
    if let Some(obtuse) = obtuse_corner(a, b, c) {
        let area = triangle_area(a, b, c);
        let mut out = [0.25 * area; 3];
        out[obtuse] = 0.5 * area;
        return out;
    }

    let cot_a = cotangent_angle(a, b, c);
    let cot_b = cotangent_angle(b, c, a);
    let cot_c = cotangent_angle(c, a, b);

    let ab2 = (b - a).norm_squared();
    let bc2 = (c - b).norm_squared();
    let ca2 = (a - c).norm_squared();

    [
        0.125 * (ca2 * cot_b + ab2 * cot_c),
        0.125 * (ab2 * cot_c + bc2 * cot_a),
        0.125 * (bc2 * cot_a + ca2 * cot_b),
    ]
}

/// Cotangent of the angle opposite half-edge `he`.
///
/// The tip angle at the end vertex and the tail angle at the start vertex
/// are measured directly; the opposite angle is `PI - tip - tail`.
pub fn halfedge_cotangent<I: MeshIndex>(
    topology: &Topology<I>,
    positions: &[Point3<f64>],
    he: HalfEdgeId<I>,
) -> f64 {
    let start = positions[topology.start(he).index()];
    let end = positions[topology.end(he).index()];
    let next_end = positions[topology.end(topology.next(he)).index()];
    let prev_start = positions[topology.start(topology.prev(he)).index()];

    let tip = angle_between_vectors(&(start - end), &(next_end - end));
    let tail = angle_between_vectors(&(prev_start - start), &(end - start));

    cotangent(PI - tip - tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_topology, fixtures};

    fn geometry_of(record: &crate::mesh::MeshRecord) -> MeshGeometry {
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
        compute_geometry(&topo, &record.positions).unwrap()
    }

    #[test]
    fn test_right_triangle_angles() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        let g = face_geometry(&a, &b, &c);
        assert!((g.angles[0] - PI / 2.0).abs() < 1e-12);
        assert!((g.angles[1] - PI / 4.0).abs() < 1e-12);
        assert!((g.angles[2] - PI / 4.0).abs() < 1e-12);
        assert!((g.area - 0.5).abs() < 1e-12);
        assert!(!g.is_obtuse);
    }

    #[test]
    fn test_degenerate_angles_are_zero() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);

        assert_eq!(triangle_angle(&a, &a, &b), 0.0);
        assert_eq!(angle_between_vectors(&Vector3::zeros(), &Vector3::x()), 0.0);
        assert_eq!(cotangent(0.0), 0.0);
        assert_eq!(cotangent(PI), 0.0);
        assert_eq!(cotangent_angle(&a, &b, &b), 0.0);
    }

    #[test]
    fn test_angle_between_vectors() {
        let angle = angle_between_vectors(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(1.0, 1.0, 0.0));
        assert!((angle - PI / 4.0).abs() < 1e-12);
        assert!((cotangent(PI / 4.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_obtuse_voronoi_split() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(1.0, 0.2, 0.0);

        let g = face_geometry(&a, &b, &c);
        assert!(g.is_obtuse);

        let areas = voronoi_contributions(&a, &b, &c);
        assert!((areas[2] - 0.5 * g.area).abs() < 1e-12);
        assert!((areas[0] - 0.25 * g.area).abs() < 1e-12);
        assert!((areas[1] - 0.25 * g.area).abs() < 1e-12);
    }

    #[test]
    fn test_voronoi_equilateral() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0);

        let areas = voronoi_contributions(&a, &b, &c);
        let third = triangle_area(&a, &b, &c) / 3.0;
        for area in areas {
            assert!((area - third).abs() < 1e-12);
        }
    }

    #[test]
    fn test_voronoi_areas_sum_to_surface_area() {
        let geometry = geometry_of(&fixtures::icosphere(2));

        assert!(geometry.faces.iter().all(|f| !f.is_obtuse));
        assert!(geometry.voronoi_areas.iter().all(|&a| a >= 0.0));

        let total: f64 = geometry.voronoi_areas.iter().sum();
        assert!(
            (total - geometry.surface_area()).abs() < 1e-9,
            "Voronoi areas {} should sum to surface area {}",
            total,
            geometry.surface_area()
        );
    }

    #[test]
    fn test_voronoi_areas_independent_of_scale() {
        for scale in [1e-6, 1e-5, 1e-3, 1e3] {
            let mut record = fixtures::icosphere(2);
            for p in &mut record.positions {
                *p = Point3::from(p.coords * scale);
            }
            let geometry = geometry_of(&record);

            let total: f64 = geometry.voronoi_areas.iter().sum();
            let surface = geometry.surface_area();
            assert!(surface > 0.0);
            assert!(
                ((total / surface) - 1.0).abs() < 1e-9,
                "scale {:e}: Voronoi areas {:e} vs surface area {:e}",
                scale,
                total,
                surface
            );
        }
    }

    #[test]
    fn test_cotangent_angle_small_triangle() {
        // Right isosceles triangle with legs of 1e-7: cot 45 degrees = 1.
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1e-7, 0.0, 0.0);
        let c = Point3::new(0.0, 1e-7, 0.0);
        assert!((cotangent_angle(&b, &c, &a) - 1.0).abs() < 1e-9);
        assert!(cotangent_angle(&a, &b, &c).abs() < 1e-9);
    }

    #[test]
    fn test_voronoi_areas_non_negative_on_grid() {
        // Right-angled grid triangles sit exactly on the obtuse boundary.
        let geometry = geometry_of(&fixtures::flat_grid(3));
        assert!(geometry.voronoi_areas.iter().all(|&a| a >= 0.0));
        let total: f64 = geometry.voronoi_areas.iter().sum();
        assert!((total - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_halfedge_cotangents_on_quad() {
        let record = fixtures::quad();
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
        let geometry = compute_geometry(&topo, &record.positions).unwrap();

        // Diagonal half-edge 2 -> 0 is opposite the right angle at vertex 1.
        assert!(geometry.cotangent(HalfEdgeId::<u32>::new(2)).abs() < 1e-12);
        // Half-edge 0 -> 1 is opposite the 45 degree corner at vertex 2.
        assert!((geometry.cotangent(HalfEdgeId::<u32>::new(0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let record = fixtures::quad();
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
        let result = compute_geometry(&topo, &record.positions[..3]);
        assert!(matches!(
            result,
            Err(MeshError::VertexCountMismatch { expected: 4, actual: 3 })
        ));
    }
}
