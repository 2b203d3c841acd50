//! Core mesh data structures.
//!
//! This module provides the raw [`MeshRecord`] (positions, triangles, optional
//! face colors) and the half-edge [`Topology`] built from it.
//!
//! # Index Types
//!
//! Topology elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use meshqa::mesh::{build_topology, MeshRecord, Topology};
//! use nalgebra::Point3;
//!
//! let record = MeshRecord::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
//! assert_eq!(topo.num_boundary_halfedges(), 3);
//! ```

mod builder;
mod halfedge;
mod index;
mod record;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::build_topology;
pub use halfedge::{EdgeSign, Face, HalfEdge, Topology, Vertex};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use record::{
    aspect_ratio, edge_lengths, triangle_area, triangle_centroid, triangle_normal,
    triangles_from_polygons, Color, MeshRecord,
};
