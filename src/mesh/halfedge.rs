//! Half-edge topology for triangle meshes.
//!
//! [`Topology`] is an oriented half-edge graph built from a triangle index
//! list. It stores connectivity only; vertex positions stay in the
//! [`MeshRecord`](super::MeshRecord) and derived geometry is produced by the
//! metrics engine.
//!
//! # Structure
//!
//! - Face `f` owns half-edges `3f`, `3f + 1` and `3f + 2`, aligned with its
//!   vertex order: half-edge `3f + j` runs from corner `j` to corner `j + 1`.
//! - Each half-edge knows its **flip** (the reversed half-edge of the adjacent
//!   face), its **next** and **prev** within the face, its start and end
//!   vertex, and its owning face.
//! - Each vertex keeps back-references to its incident faces and its outgoing
//!   half-edges.
//!
//! # Boundary Handling
//!
//! A half-edge with no reversed counterpart has no flip. It carries an
//! explicit boundary flag, and so do its end vertices and its face. Asking
//! for the flip of such a half-edge is not an error: [`Topology::flip`]
//! returns `None`.

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Orientation of a half-edge relative to its undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeSign {
    /// First-seen direction of the undirected edge.
    #[default]
    Positive,
    /// Reverse of an already seen direction.
    Negative,
}

/// A vertex of the topology.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// Whether any incident half-edge is a boundary half-edge.
    pub is_boundary: bool,

    /// Faces that use this vertex, in face order.
    pub faces: Vec<FaceId<I>>,

    /// Half-edges starting at this vertex, in creation order.
    pub outgoing: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex.
    pub fn new() -> Self {
        Self {
            is_boundary: false,
            faces: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Check if no face uses this vertex.
    #[inline]
    pub fn is_isolated(&self) -> bool {
        self.faces.is_empty()
    }
}

impl<I: MeshIndex> Default for Vertex<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A half-edge of the topology.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge starts at.
    pub start: VertexId<I>,

    /// The vertex this half-edge points to.
    pub end: VertexId<I>,

    /// The face this half-edge belongs to.
    pub face: FaceId<I>,

    /// Orientation relative to the undirected edge.
    pub sign: EdgeSign,

    /// True if no half-edge runs in the opposite direction.
    pub is_boundary: bool,

    /// The opposite half-edge. Invalid on boundary half-edges.
    pub flip: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a half-edge with no relations set.
    pub fn new(start: VertexId<I>, end: VertexId<I>, face: FaceId<I>) -> Self {
        Self {
            start,
            end,
            face,
            sign: EdgeSign::Positive,
            is_boundary: false,
            flip: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
        }
    }
}

/// A triangular face of the topology.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The three corners in winding order.
    pub vertices: [VertexId<I>; 3],

    /// The three half-edges; `halfedges[j]` runs from `vertices[j]` to
    /// `vertices[(j + 1) % 3]`.
    pub halfedges: [HalfEdgeId<I>; 3],

    /// Whether any of the three half-edges is a boundary half-edge.
    pub is_boundary: bool,
}

/// Half-edge connectivity of a triangle mesh.
///
/// Built by [`build_topology`](super::build_topology). Every cross reference
/// is an index into one of the three arrays; unset relations hold the
/// INVALID sentinel.
#[derive(Debug, Clone)]
pub struct Topology<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) num_unique_edges: usize,
}

impl<I: MeshIndex> Topology<I> {
    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn num_unique_edges(&self) -> usize {
        self.num_unique_edges
    }

    /// Number of half-edges without a flip.
    pub fn num_boundary_halfedges(&self) -> usize {
        self.halfedges.iter().filter(|he| he.is_boundary).count()
    }

    /// Number of vertices touching a boundary half-edge.
    pub fn num_boundary_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_boundary).count()
    }

    /// Number of faces with at least one boundary half-edge.
    pub fn num_boundary_faces(&self) -> usize {
        self.faces.iter().filter(|f| f.is_boundary).count()
    }

    /// Check if the surface has no boundary.
    pub fn is_closed(&self) -> bool {
        !self.halfedges.iter().any(|he| he.is_boundary)
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    // ==================== Topology Queries ====================

    /// The opposite half-edge, or `None` on the boundary.
    #[inline]
    pub fn flip(&self, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        self.halfedge(he).flip.valid()
    }

    /// The opposite half-edge of an interior half-edge.
    ///
    /// Fails with [`MeshError::MissingRelation`] if `he` is not flagged as
    /// boundary but no flip was ever linked. Boundary half-edges also fail;
    /// check [`is_boundary_halfedge`](Self::is_boundary_halfedge) first or use
    /// [`flip`](Self::flip).
    pub fn checked_flip(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        self.flip(he).ok_or(MeshError::MissingRelation {
            halfedge: he.index(),
            relation: "flip",
        })
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the start vertex of a half-edge.
    #[inline]
    pub fn start(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).start
    }

    /// Get the end vertex of a half-edge.
    #[inline]
    pub fn end(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).end
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the orientation sign of a half-edge.
    #[inline]
    pub fn sign(&self, he: HalfEdgeId<I>) -> EdgeSign {
        self.halfedge(he).sign
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary
    }

    /// Check if a vertex is on the boundary.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex(v).is_boundary
    }

    /// Check if a face is on the boundary.
    #[inline]
    pub fn is_boundary_face(&self, f: FaceId<I>) -> bool {
        self.face(f).is_boundary
    }

    /// Get the three vertices of a face.
    #[inline]
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.face(f).vertices
    }

    /// Get the three half-edges of a face.
    #[inline]
    pub fn face_halfedges(&self, f: FaceId<I>) -> [HalfEdgeId<I>; 3] {
        self.face(f).halfedges
    }

    /// Outgoing half-edges of a vertex.
    #[inline]
    pub fn outgoing(&self, v: VertexId<I>) -> &[HalfEdgeId<I>] {
        &self.vertex(v).outgoing
    }

    /// Faces incident to a vertex.
    #[inline]
    pub fn vertex_faces(&self, v: VertexId<I>) -> &[FaceId<I>] {
        &self.vertex(v).faces
    }

    /// Faces sharing an edge with `f`.
    pub fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.face(f)
            .halfedges
            .into_iter()
            .filter_map(move |he| self.flip(he).map(|t| self.face_of(t)))
    }

    /// Number of half-edges leaving a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex(v).outgoing.len()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over one half-edge per undirected edge (the `Positive` one).
    pub fn edges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges()
            .filter(|(_, he)| he.sign == EdgeSign::Positive)
            .map(|(id, _)| id)
    }

    // ==================== Validation ====================

    /// Check that every relation is consistent.
    pub fn is_valid(&self) -> bool {
        let nv = self.vertices.len();
        let nf = self.faces.len();

        for (heid, he) in self.halfedges() {
            if he.start.index() >= nv || he.end.index() >= nv || he.face.index() >= nf {
                return false;
            }
            if !he.next.is_valid() || !he.prev.is_valid() {
                return false;
            }

            // Next/prev consistency
            if self.prev(he.next) != heid || self.next(he.prev) != heid {
                return false;
            }
            if self.next(self.next(he.next)) != heid {
                return false;
            }
            if self.face_of(he.next) != he.face || self.start(he.next) != he.end {
                return false;
            }

            // Flip consistency
            match self.flip(heid) {
                Some(t) => {
                    if he.is_boundary || self.halfedge(t).flip != heid {
                        return false;
                    }
                    if self.start(t) != he.end || self.end(t) != he.start {
                        return false;
                    }
                    if self.sign(t) == he.sign {
                        return false;
                    }
                }
                None => {
                    if !he.is_boundary || he.sign != EdgeSign::Positive {
                        return false;
                    }
                    let start = &self.vertices[he.start.index()];
                    let end = &self.vertices[he.end.index()];
                    if !start.is_boundary || !end.is_boundary {
                        return false;
                    }
                    if !self.faces[he.face.index()].is_boundary {
                        return false;
                    }
                }
            }
        }

        for (fid, f) in self.faces() {
            for j in 0..3 {
                let he = f.halfedges[j];
                if !he.is_valid() || self.face_of(he) != fid || self.start(he) != f.vertices[j] {
                    return false;
                }
            }
            let boundary = f.halfedges.iter().any(|&he| self.is_boundary_halfedge(he));
            if boundary != f.is_boundary {
                return false;
            }
        }

        for (vi, v) in self.vertices.iter().enumerate() {
            if v.outgoing.iter().any(|&he| self.start(he).index() != vi) {
                return false;
            }
        }

        self.edges().count() == self.num_unique_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_topology;

    fn quad() -> Topology {
        build_topology(4, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::<u32>::new();
        assert!(!v.is_boundary);
        assert!(v.is_isolated());
    }

    #[test]
    fn test_halfedge_creation() {
        let he = HalfEdge::<u32>::new(VertexId::new(0), VertexId::new(1), FaceId::new(0));
        assert!(!he.flip.is_valid());
        assert!(!he.next.is_valid());
        assert_eq!(he.sign, EdgeSign::Positive);
    }

    #[test]
    fn test_flip_accessors() {
        let topo = quad();

        // Half-edge 2 is 2 -> 0 in face 0, half-edge 3 is 0 -> 2 in face 1.
        let h2 = HalfEdgeId::new(2);
        let h3 = HalfEdgeId::new(3);
        assert_eq!(topo.flip(h2), Some(h3));
        assert_eq!(topo.checked_flip(h3).unwrap(), h2);

        let h0 = HalfEdgeId::new(0);
        assert!(topo.is_boundary_halfedge(h0));
        assert_eq!(topo.flip(h0), None);
        assert!(matches!(
            topo.checked_flip(h0),
            Err(MeshError::MissingRelation { halfedge: 0, relation: "flip" })
        ));
    }

    #[test]
    fn test_face_neighbors() {
        let topo = quad();
        let n: Vec<_> = topo.face_neighbors(FaceId::new(0)).collect();
        assert_eq!(n, vec![FaceId::new(1)]);
    }

    #[test]
    fn test_boundary_counts() {
        let topo = quad();
        assert_eq!(topo.num_boundary_halfedges(), 4);
        assert_eq!(topo.num_boundary_vertices(), 4);
        assert_eq!(topo.num_boundary_faces(), 2);
        assert!(!topo.is_closed());
        assert!(topo.is_valid());
    }

    #[test]
    fn test_is_valid_detects_broken_cycle() {
        let mut topo = quad();
        topo.halfedges[0].next = HalfEdgeId::new(0);
        assert!(!topo.is_valid());
    }

    #[test]
    fn test_is_valid_detects_unflagged_boundary() {
        let mut topo = quad();
        topo.halfedges[0].is_boundary = false;
        assert!(!topo.is_valid());
    }
}
