//! Topology construction.
//!
//! Builds a [`Topology`] from a triangle index list. Positions are not needed:
//! connectivity is a pure function of the vertex count and the faces.

use std::collections::HashMap;

use super::halfedge::{EdgeSign, Face, HalfEdge, Topology, Vertex};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build the half-edge topology of a triangle mesh.
///
/// Half-edge `3i + j` of face `i` runs from `faces[i][j]` to
/// `faces[i][(j + 1) % 3]`. The first half-edge seen for an undirected edge
/// gets [`EdgeSign::Positive`], its reverse [`EdgeSign::Negative`].
///
/// # Arguments
/// * `vertex_count` - Number of vertices the faces index into
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Errors
/// * [`MeshError::EmptyMesh`] if `faces` is empty
/// * [`MeshError::InvalidVertexIndex`] for an index `>= vertex_count`
/// * [`MeshError::DegenerateFace`] for a face repeating an index
/// * [`MeshError::NonManifoldEdge`] if two faces contain the same directed
///   edge (non-manifold or inconsistently wound input)
///
/// # Example
/// ```
/// use meshqa::mesh::{build_topology, Topology};
///
/// let faces = vec![[0, 1, 2], [0, 2, 3]];
/// let topo: Topology = build_topology(4, &faces).unwrap();
///
/// assert_eq!(topo.num_halfedges(), 6);
/// assert_eq!(topo.num_unique_edges(), 5);
/// assert_eq!(topo.num_boundary_halfedges(), 4);
/// ```
pub fn build_topology<I: MeshIndex>(vertex_count: usize, faces: &[[usize; 3]]) -> Result<Topology<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertex_count {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: vi,
                    vertex_count,
                });
            }
        }
        // Check for degenerate faces
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let num_halfedges = faces.len() * 3;
    if !I::can_address(num_halfedges) || !I::can_address(vertex_count) {
        return Err(MeshError::invalid_param(
            "faces",
            faces.len(),
            "too many elements for the index type",
        ));
    }

    let mut vertices: Vec<Vertex<I>> = (0..vertex_count).map(|_| Vertex::new()).collect();
    let mut halfedges: Vec<HalfEdge<I>> = Vec::with_capacity(num_halfedges);
    let mut topo_faces: Vec<Face<I>> = Vec::with_capacity(faces.len());
    let mut num_unique_edges = 0;

    // Map from directed edge (v0, v1) to half-edge ID
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_halfedges);

    // First pass: create half-edges, link flips, count unique edges
    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::<I>::new(fi);
        let mut face_halfedges = [HalfEdgeId::invalid(); 3];

        for j in 0..3 {
            let a = face[j];
            let b = face[(j + 1) % 3];
            let he_id = HalfEdgeId::<I>::new(halfedges.len());

            if let Some(&existing) = edge_map.get(&(a, b)) {
                return Err(MeshError::NonManifoldEdge {
                    v0: a,
                    v1: b,
                    existing: existing.index(),
                    face: fi,
                });
            }

            let mut he = HalfEdge::new(VertexId::new(a), VertexId::new(b), face_id);

            if let Some(&reverse) = edge_map.get(&(b, a)) {
                he.flip = reverse;
                he.sign = EdgeSign::Negative;
                let other = &mut halfedges[reverse.index()];
                other.flip = he_id;
                other.sign = EdgeSign::Positive;
            } else {
                num_unique_edges += 1;
                he.sign = EdgeSign::Positive;
            }

            edge_map.insert((a, b), he_id);
            halfedges.push(he);
            face_halfedges[j] = he_id;

            vertices[a].outgoing.push(he_id);
            vertices[a].faces.push(face_id);
        }

        topo_faces.push(Face {
            vertices: [VertexId::new(face[0]), VertexId::new(face[1]), VertexId::new(face[2])],
            halfedges: face_halfedges,
            is_boundary: false,
        });
    }

    // Second pass: next/prev 3-cycles in face order
    for face in &topo_faces {
        let [h0, h1, h2] = face.halfedges;
        for (he, next, prev) in [(h0, h1, h2), (h1, h2, h0), (h2, h0, h1)] {
            let he = &mut halfedges[he.index()];
            he.next = next;
            he.prev = prev;
        }
    }

    // Third pass: boundary flags
    for he in halfedges.iter_mut() {
        if !he.flip.is_valid() {
            he.is_boundary = true;
            vertices[he.start.index()].is_boundary = true;
            vertices[he.end.index()].is_boundary = true;
            topo_faces[he.face.index()].is_boundary = true;
        }
    }

    let topology = Topology {
        vertices,
        halfedges,
        faces: topo_faces,
        num_unique_edges,
    };

    log::debug!(
        "Built topology: {} vertices, {} faces, {} half-edges, {} edges, {} boundary half-edges",
        topology.num_vertices(),
        topology.num_faces(),
        topology.num_halfedges(),
        topology.num_unique_edges(),
        topology.num_boundary_halfedges()
    );

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;

    #[test]
    fn test_single_triangle() {
        let topo: Topology<u32> = build_topology(3, &[[0, 1, 2]]).unwrap();

        assert_eq!(topo.num_vertices(), 3);
        assert_eq!(topo.num_faces(), 1);
        assert_eq!(topo.num_halfedges(), 3);
        assert_eq!(topo.num_unique_edges(), 3);
        assert!(topo.is_valid());

        // All vertices should be on boundary
        for v in topo.vertex_ids() {
            assert!(topo.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_tetrahedron() {
        let record = fixtures::tetrahedron();
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();

        assert_eq!(topo.num_halfedges(), 12);
        assert_eq!(topo.num_unique_edges(), 6);
        assert_eq!(topo.num_boundary_halfedges(), 0);
        assert!(topo.is_closed());
        assert!(topo.is_valid());

        for v in topo.vertex_ids() {
            assert_eq!(topo.valence(v), 3);
            assert_eq!(topo.vertex_faces(v).len(), 3);
        }
    }

    #[test]
    fn test_quad_flips_and_signs() {
        let record = fixtures::quad();
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();

        // Shared diagonal: 2 -> 0 in face 0 is seen first, 0 -> 2 in face 1.
        let first = HalfEdgeId::new(2);
        let second = HalfEdgeId::new(3);
        assert_eq!(topo.start(first).index(), 2);
        assert_eq!(topo.end(first).index(), 0);
        assert_eq!(topo.flip(first), Some(second));
        assert_eq!(topo.flip(second), Some(first));
        assert_eq!(topo.sign(first), EdgeSign::Positive);
        assert_eq!(topo.sign(second), EdgeSign::Negative);

        let boundary: Vec<_> = topo
            .halfedge_ids()
            .filter(|&he| topo.is_boundary_halfedge(he))
            .map(|he| he.index())
            .collect();
        assert_eq!(boundary, vec![0, 1, 4, 5]);
        assert_eq!(topo.num_unique_edges(), 5);
    }

    #[test]
    fn test_relations_on_icosphere() {
        let record = fixtures::icosphere(2);
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();

        assert!(topo.is_valid());
        for he in topo.halfedge_ids() {
            let t = topo.flip(he).unwrap();
            assert_eq!(topo.flip(t), Some(he));

            let n = topo.next(he);
            assert_eq!(topo.next(topo.next(n)), he);
            assert_eq!(topo.face_of(n), topo.face_of(he));
            assert_eq!(topo.prev(n), he);
        }
    }

    #[test]
    fn test_unique_edges_match_positive_signs() {
        let record = fixtures::flat_grid(4);
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();

        let positive = topo
            .halfedge_ids()
            .filter(|&he| topo.sign(he) == EdgeSign::Positive)
            .count();
        assert_eq!(positive, topo.num_unique_edges());
        // (n+1)^2 vertices, 2n^2 faces, 3n^2 + 2n edges
        assert_eq!(topo.num_unique_edges(), 3 * 16 + 2 * 4);
    }

    #[test]
    fn test_face_triangles_match_input() {
        let record = fixtures::flat_grid(2);
        let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
        for (fi, face) in record.faces.iter().enumerate() {
            let tri = topo.face_triangle(FaceId::new(fi)).map(|v| v.index());
            assert_eq!(&tri, face);
        }
    }

    #[test]
    fn test_isolated_vertex() {
        let topo: Topology = build_topology(4, &[[0, 1, 2]]).unwrap();
        let v = VertexId::new(3);
        assert!(topo.vertex(v).is_isolated());
        assert!(!topo.is_boundary_vertex(v));
        assert!(topo.is_valid());
    }

    #[test]
    fn test_empty_mesh() {
        let result: Result<Topology> = build_topology(3, &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let result: Result<Topology> = build_topology(1, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex {
                face: 0,
                vertex: 1,
                vertex_count: 1
            })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let result: Result<Topology> = build_topology(3, &[[0, 0, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_non_manifold_edge() {
        // Both faces contain the directed edge 0 -> 1.
        let result: Result<Topology> = build_topology(4, &[[0, 1, 2], [0, 1, 3]]);
        match result {
            Err(err @ MeshError::NonManifoldEdge { .. }) => {
                assert!(err.is_topology_error());
                if let MeshError::NonManifoldEdge { v0, v1, existing, face } = err {
                    assert_eq!((v0, v1), (0, 1));
                    assert_eq!(existing, 0);
                    assert_eq!(face, 1);
                }
            }
            other => panic!("expected NonManifoldEdge, got {:?}", other),
        }
    }

    #[test]
    fn test_index_type_too_small() {
        // 21846 faces need 65538 half-edges, more than u16 can address.
        let faces: Vec<[usize; 3]> = (0..21_846).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
        let result: Result<Topology<u16>> = build_topology(3 * 21_846, &faces);
        assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
    }
}
