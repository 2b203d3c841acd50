//! Cotangent Laplacian and mass matrix assembly.
//!
//! The discrete Laplace-Beltrami operator is `M^-1 L`, where `L` is the
//! symmetric cotangent matrix
//!
//! ```text
//! L(i, j) = (cot a_ij + cot b_ij) / 2     for each edge (i, j)
//! L(i, i) = -sum_j L(i, j)
//! ```
//!
//! and `M` is the diagonal matrix of mixed Voronoi areas. On a boundary edge
//! only the single opposite angle contributes.

use crate::error::Result;
use crate::mesh::{HalfEdgeId, MeshIndex, Topology};

use super::geometry::MeshGeometry;
use super::sparse::{CsrMatrix, MassMatrix};

/// Weight of the undirected edge containing `he`.
///
/// # Errors
/// [`MeshError::MissingRelation`](crate::error::MeshError::MissingRelation)
/// if `he` is interior but has no flip.
pub fn edge_weight<I: MeshIndex>(
    topology: &Topology<I>,
    geometry: &MeshGeometry,
    he: HalfEdgeId<I>,
) -> Result<f64> {
    let mut cot_sum = geometry.cotangent(he);
    if !topology.is_boundary_halfedge(he) {
        cot_sum += geometry.cotangent(topology.checked_flip(he)?);
    }
    Ok(0.5 * cot_sum)
}

/// Assemble the cotangent Laplacian.
///
/// Every row sums to zero and the matrix is symmetric.
pub fn cotangent_laplacian<I: MeshIndex>(
    topology: &Topology<I>,
    geometry: &MeshGeometry,
) -> Result<CsrMatrix> {
    let n = topology.num_vertices();
    let mut triplets = Vec::with_capacity(4 * topology.num_unique_edges());

    for he in topology.edges() {
        let w = edge_weight(topology, geometry, he)?;
        let i = topology.start(he).index();
        let j = topology.end(he).index();

        triplets.push((i, j, w));
        triplets.push((j, i, w));
        triplets.push((i, i, -w));
        triplets.push((j, j, -w));
    }

    Ok(CsrMatrix::from_triplets(n, n, triplets))
}

/// Diagonal mass matrix of the Voronoi areas.
pub fn mass_matrix(geometry: &MeshGeometry) -> MassMatrix {
    MassMatrix::from_areas(&geometry.voronoi_areas)
}
