//! Boundary loop extraction.
//!
//! Boundary half-edges of a consistently wound surface chain head to tail:
//! the next boundary half-edge of a loop starts where the current one ends.
//! Walking that chain from every unvisited boundary half-edge yields the
//! boundary loops. On a pinched boundary (a vertex with several outgoing
//! boundary half-edges) the lowest-indexed unvisited one is taken, and a walk
//! that cannot continue ends as an open polyline.

use crate::mesh::{HalfEdgeId, MeshIndex, Topology};

/// A maximal chain of boundary half-edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop<I: MeshIndex = u32> {
    /// Half-edges in walk order.
    pub halfedges: Vec<HalfEdgeId<I>>,
    /// Whether the walk returned to its first vertex.
    pub closed: bool,
}

impl<I: MeshIndex> BoundaryLoop<I> {
    /// Number of boundary edges in the loop.
    #[inline]
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }

    /// Check if the loop has no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.halfedges.is_empty()
    }

    /// Start vertices of the half-edges, in walk order.
    pub fn vertices(&self, topology: &Topology<I>) -> Vec<usize> {
        self.halfedges
            .iter()
            .map(|&he| topology.start(he).index())
            .collect()
    }
}

/// Find all boundary loops, in order of their lowest boundary half-edge.
///
/// # Example
/// ```
/// use meshqa::algo::boundary::find_boundary_loops;
/// use meshqa::mesh::{build_topology, Topology};
///
/// let topo: Topology = build_topology(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
/// let loops = find_boundary_loops(&topo);
///
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].vertices(&topo), vec![0, 1, 2, 3]);
/// ```
pub fn find_boundary_loops<I: MeshIndex>(topology: &Topology<I>) -> Vec<BoundaryLoop<I>> {
    let mut visited = vec![false; topology.num_halfedges()];
    let mut loops = Vec::new();

    for start in topology.halfedge_ids() {
        if visited[start.index()] || !topology.is_boundary_halfedge(start) {
            continue;
        }

        let origin = topology.start(start);
        let mut halfedges = vec![start];
        visited[start.index()] = true;
        let mut current = start;
        let mut closed = false;

        loop {
            let tip = topology.end(current);
            if tip == origin {
                closed = true;
                break;
            }

            let next = topology
                .outgoing(tip)
                .iter()
                .copied()
                .filter(|&he| topology.is_boundary_halfedge(he) && !visited[he.index()])
                .min();

            match next {
                Some(he) => {
                    visited[he.index()] = true;
                    halfedges.push(he);
                    current = he;
                }
                None => break,
            }
        }

        if !closed {
            log::warn!(
                "Boundary walk from half-edge {} ended without closing ({} edges)",
                start.index(),
                halfedges.len()
            );
        }

        loops.push(BoundaryLoop { halfedges, closed });
    }

    log::debug!("Found {} boundary loops", loops.len());
    loops
}
