//! Error types for meshqa.
//!
//! All fallible operations return [`MeshError`]. Errors fall into a small set of
//! categories (see [`ErrorKind`]) so callers can tell malformed input apart from
//! inconsistent topology without matching every variant.
//!
//! Degenerate geometry (zero-length edges, zero-area triangles) is never an
//! error: the geometry routines fall back to well-defined values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Broad category of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input arrays (bad indices, wrong arity, mismatched lengths).
    Input,
    /// Non-manifold configuration or an inconsistent half-edge relation.
    Topology,
    /// File system or file format problem.
    Io,
    /// A caller-supplied parameter was rejected.
    Parameter,
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references a vertex index outside `[0, vertex_count)`.
    #[error("face {face} references invalid vertex index {vertex} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face repeats a vertex index.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A polygon with other than three corners was supplied.
    #[error("face {face} has {arity} vertices, only triangles are supported")]
    NonTriangularFace {
        /// The face index.
        face: usize,
        /// Number of vertices the face has.
        arity: usize,
    },

    /// The number of positions does not match the topology.
    #[error("expected {expected} vertex positions, got {actual}")]
    VertexCountMismatch {
        /// Vertex count of the topology.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },

    /// The per-face color list does not match the face list.
    #[error("expected {expected} face colors, got {actual}")]
    ColorCountMismatch {
        /// Number of faces.
        expected: usize,
        /// Number of colors supplied.
        actual: usize,
    },

    /// The same directed edge appears in two faces.
    #[error(
        "directed edge ({v0}, {v1}) is used by both half-edge {existing} and face {face}: non-manifold topology"
    )]
    NonManifoldEdge {
        /// Start vertex of the edge.
        v0: usize,
        /// End vertex of the edge.
        v1: usize,
        /// The half-edge that already owns this direction.
        existing: usize,
        /// The face that tried to add it again.
        face: usize,
    },

    /// A half-edge relation that must exist was never set.
    #[error("half-edge {halfedge} has no {relation} relation")]
    MissingRelation {
        /// The half-edge index.
        halfedge: usize,
        /// Name of the missing relation.
        relation: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for `path`.
    pub fn load<P: Into<PathBuf>, M: Into<String>>(path: P, message: M) -> Self {
        MeshError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::EmptyMesh
            | MeshError::InvalidVertexIndex { .. }
            | MeshError::DegenerateFace { .. }
            | MeshError::NonTriangularFace { .. }
            | MeshError::VertexCountMismatch { .. }
            | MeshError::ColorCountMismatch { .. } => ErrorKind::Input,
            MeshError::NonManifoldEdge { .. } | MeshError::MissingRelation { .. } => {
                ErrorKind::Topology
            }
            MeshError::Io(_)
            | MeshError::LoadError { .. }
            | MeshError::SaveError { .. }
            | MeshError::UnsupportedFormat { .. } => ErrorKind::Io,
            MeshError::InvalidParameter { .. } => ErrorKind::Parameter,
        }
    }

    /// Whether this is malformed input.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::Input
    }

    /// Whether this is a topology inconsistency.
    pub fn is_topology_error(&self) -> bool {
        self.kind() == ErrorKind::Topology
    }
}
