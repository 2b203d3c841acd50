//! Mesh analysis and cleaning algorithms.
//!
//! - **Geometry**: interior angles, mixed Voronoi areas, per-half-edge cotangents
//! - **Operators**: cotangent Laplacian and diagonal mass matrix
//! - **Structure**: boundary loops, connected components
//! - **Metrics**: aggregate statistics and the text report
//! - **Cleaning**: near-duplicate removal and high-aspect culling
//!
//! The usual entry points are [`build_metrics`] for a built
//! [`Topology`](crate::mesh::Topology) and [`clean_mesh`] for a raw
//! [`MeshRecord`](crate::mesh::MeshRecord).

pub mod boundary;
pub mod clean;
pub mod components;
pub mod geometry;
pub mod laplacian;
pub mod metrics;
pub mod sparse;

pub use boundary::{find_boundary_loops, BoundaryLoop};
pub use clean::{
    clean_mesh, remove_high_aspect_triangles, remove_near_duplicate_triangles, CleanOptions,
    DedupOptions,
};
pub use components::{find_connected_components, ComponentAnalysis};
pub use geometry::{compute_geometry, FaceGeometry, MeshGeometry};
pub use laplacian::{cotangent_laplacian, mass_matrix};
pub use metrics::{build_metrics, MeshAnalysis, MeshMetrics};
pub use sparse::{CsrMatrix, MassMatrix};
