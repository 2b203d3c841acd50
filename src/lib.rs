//! # meshqa
//!
//! Topology, geometry metrics and quality cleaning for triangle meshes.
//!
//! meshqa turns raw vertex and triangle arrays into a half-edge
//! [`Topology`](mesh::Topology), computes discrete differential-geometry
//! quantities on it (mixed Voronoi areas, cotangent Laplacian, mass matrix,
//! boundary loops, connected components, quality statistics) and filters
//! problem triangles out of raw meshes.
//!
//! ## Features
//!
//! - **Half-edge topology**: flip/next/prev relations with type-safe indices
//! - **Flexible indexing**: 16-bit, 32-bit or 64-bit indices
//! - **Metrics**: Euler characteristic, boundary and component statistics,
//!   area and angle quality, with a plain-text report
//! - **Cleaning**: near-duplicate removal and high-aspect culling
//! - **File formats**: OFF/COFF and PLY with per-face colors, and OBJ
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshqa::prelude::*;
//!
//! let record = meshqa::io::load("scan.off").unwrap();
//!
//! let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
//! let analysis = build_metrics(&topo, &record.positions).unwrap();
//! println!("{}", analysis.metrics);
//!
//! let cleaned = clean_mesh(&record, &CleanOptions::default()).unwrap();
//! meshqa::io::save(&cleaned, "scan_clean.off").unwrap();
//! ```
//!
//! ## Analysing a Mesh
//!
//! ```
//! use meshqa::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//!
//! let topo: Topology = build_topology(positions.len(), &faces).unwrap();
//! let analysis = build_metrics(&topo, &positions).unwrap();
//!
//! assert_eq!(analysis.metrics.num_unique_edges, 5);
//! assert_eq!(analysis.metrics.num_boundary_loops, 1);
//! assert_eq!(analysis.metrics.euler_characteristic, 1);
//! ```
//!
//! ## Traversal
//!
//! ```
//! use meshqa::prelude::*;
//!
//! let topo: Topology = build_topology(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! for he in topo.face_halfedges(FaceId::new(0)) {
//!     match topo.flip(he) {
//!         Some(twin) => println!("{:?} is shared with face {:?}", he, topo.face_of(twin)),
//!         None => println!("{:?} is on the boundary", he),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshqa::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        build_metrics, clean_mesh, CleanOptions, DedupOptions, MeshAnalysis, MeshMetrics,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_topology, FaceId, HalfEdgeId, MeshIndex, MeshRecord, Topology, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
