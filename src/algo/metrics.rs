//! Aggregate mesh quality metrics.
//!
//! [`build_metrics`] runs the whole geometry pipeline on a topology and its
//! vertex positions: face geometry, Voronoi areas, half-edge cotangents, the
//! cotangent Laplacian and mass matrix, boundary loops and connected
//! components. The scalar summary is a [`MeshMetrics`] record, which can be
//! written as a plain-text report.
//!
//! # Report Layout
//!
//! ```text
//! Mesh Metrics:
//!   Number of vertices: 4
//!   ...
//!   Maximum angle: 90
//! LOOP DETAILS:
//!   Loop 0 size: 4
//! COMPONENT SIZES:
//!   Component 0 size: 2
//! ```
//!
//! The first line is a header. It is followed by one `label: value` line per
//! scalar metric in a fixed order, then the size of every boundary loop and
//! every connected component.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, Topology};

use super::boundary::find_boundary_loops;
use super::components::{find_connected_components, ComponentAnalysis};
use super::geometry::{compute_geometry, MeshGeometry};
use super::laplacian::{cotangent_laplacian, mass_matrix};
use super::sparse::{CsrMatrix, MassMatrix};

/// Faces with area below this fraction of the average area are degenerate.
pub const DEGENERATE_AREA_FACTOR: f64 = 1e-6;

/// Percentile of the corner angle distribution reported as minimum angle.
pub const MIN_ANGLE_PERCENTILE: f64 = 0.05;

/// Summary statistics of a triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMetrics {
    /// Number of vertices.
    pub num_vertices: usize,
    /// Number of faces.
    pub num_faces: usize,
    /// Number of undirected edges.
    pub num_unique_edges: usize,
    /// Number of half-edges (three per face).
    pub num_halfedges: usize,
    /// `V - E + F`.
    pub euler_characteristic: i64,

    /// Vertex indices of every boundary loop, in walk order.
    pub boundary_loops: Vec<Vec<usize>>,
    /// Number of boundary loops.
    pub num_boundary_loops: usize,
    /// Total number of boundary edges over all loops.
    pub num_boundary_edges: usize,
    /// Number of distinct vertices on the boundary.
    pub num_boundary_vertices: usize,
    /// Number of distinct faces touching the boundary.
    pub num_boundary_faces: usize,
    /// Mean loop size, zero without loops.
    pub average_loop_size: f64,
    /// Largest loop size, zero without loops.
    pub max_loop_size: usize,
    /// Smallest loop size, zero without loops.
    pub min_loop_size: usize,
    /// Boundary edges per undirected edge.
    pub edge_boundary_ratio: f64,

    /// Number of connected components.
    pub num_components: usize,
    /// Face count of every component.
    pub component_sizes: Vec<usize>,
    /// Largest component (faces).
    pub largest_component_size: usize,
    /// Smallest component (faces).
    pub smallest_component_size: usize,
    /// Mean component size (faces).
    pub average_component_size: f64,

    /// Smallest face area.
    pub min_face_area: f64,
    /// Largest face area.
    pub max_face_area: f64,
    /// Mean face area.
    pub average_face_area: f64,
    /// Faces with area below `1e-6` times the mean.
    pub num_degenerate_faces: usize,
    /// Degenerate faces per face.
    pub area_degeneracy_ratio: f64,

    /// 5th percentile of all corner angles, in degrees.
    pub min_angle_p5_deg: f64,
    /// Largest corner angle, in degrees.
    pub max_angle_deg: f64,
}

/// Everything [`build_metrics`] computes.
#[derive(Debug, Clone)]
pub struct MeshAnalysis {
    /// Scalar summary.
    pub metrics: MeshMetrics,
    /// Per-face, per-vertex and per-half-edge geometry.
    pub geometry: MeshGeometry,
    /// Cotangent Laplacian.
    pub laplacian: CsrMatrix,
    /// Voronoi area mass matrix.
    pub mass: MassMatrix,
    /// Face component labels.
    pub components: ComponentAnalysis,
}

/// Compute geometry, operators and summary metrics of a mesh.
///
/// # Arguments
/// * `topology` - Half-edge connectivity
/// * `positions` - One position per topology vertex
///
/// # Errors
/// * [`MeshError::VertexCountMismatch`] if the position count is wrong
/// * [`MeshError::MissingRelation`] if an interior half-edge has no flip
///
/// # Example
/// ```
/// use meshqa::algo::metrics::build_metrics;
/// use meshqa::mesh::{build_topology, Topology};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
///     Point3::new(0.5, 0.5, 1.0),
/// ];
/// let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
///
/// let topo: Topology = build_topology(positions.len(), &faces).unwrap();
/// let analysis = build_metrics(&topo, &positions).unwrap();
///
/// assert_eq!(analysis.metrics.euler_characteristic, 2);
/// assert_eq!(analysis.metrics.num_boundary_loops, 0);
/// ```
pub fn build_metrics<I: MeshIndex>(
    topology: &Topology<I>,
    positions: &[Point3<f64>],
) -> Result<MeshAnalysis> {
    let geometry = compute_geometry(topology, positions)?;
    let laplacian = cotangent_laplacian(topology, &geometry)?;
    let mass = mass_matrix(&geometry);

    let num_vertices = topology.num_vertices();
    let num_faces = topology.num_faces();
    let num_unique_edges = topology.num_unique_edges();

    // Face areas
    let mut min_face_area = f64::INFINITY;
    let mut max_face_area = 0.0_f64;
    let mut total_area = 0.0;
    for face in &geometry.faces {
        min_face_area = min_face_area.min(face.area);
        max_face_area = max_face_area.max(face.area);
        total_area += face.area;
    }
    if geometry.faces.is_empty() {
        min_face_area = 0.0;
    }
    let average_face_area = ratio(total_area, num_faces);

    let threshold = DEGENERATE_AREA_FACTOR * average_face_area;
    let num_degenerate_faces = geometry.faces.iter().filter(|f| f.area < threshold).count();
    if num_degenerate_faces > 0 {
        log::warn!(
            "{} of {} faces are degenerate (area < {:e})",
            num_degenerate_faces,
            num_faces,
            threshold
        );
    }

    // Angles
    let mut angles: Vec<f64> = geometry
        .faces
        .iter()
        .flat_map(|f| f.angles)
        .map(f64::to_degrees)
        .collect();
    angles.sort_by(f64::total_cmp);
    let min_angle_p5_deg = percentile(&angles, MIN_ANGLE_PERCENTILE);
    let max_angle_deg = angles.last().copied().unwrap_or(0.0);

    // Boundary
    let loops = find_boundary_loops(topology);
    let boundary_loops: Vec<Vec<usize>> = loops.iter().map(|l| l.vertices(topology)).collect();
    let num_boundary_loops = loops.len();
    let num_boundary_edges: usize = loops.iter().map(|l| l.len()).sum();
    let max_loop_size = loops.iter().map(|l| l.len()).max().unwrap_or(0);
    let min_loop_size = loops.iter().map(|l| l.len()).min().unwrap_or(0);
    let average_loop_size = ratio(num_boundary_edges as f64, num_boundary_loops);

    // Components
    let components = find_connected_components(topology);

    let metrics = MeshMetrics {
        num_vertices,
        num_faces,
        num_unique_edges,
        num_halfedges: topology.num_halfedges(),
        euler_characteristic: num_vertices as i64 - num_unique_edges as i64 + num_faces as i64,
        boundary_loops,
        num_boundary_loops,
        num_boundary_edges,
        num_boundary_vertices: topology.num_boundary_vertices(),
        num_boundary_faces: topology.num_boundary_faces(),
        average_loop_size,
        max_loop_size,
        min_loop_size,
        edge_boundary_ratio: ratio(num_boundary_edges as f64, num_unique_edges),
        num_components: components.count(),
        component_sizes: components.sizes.clone(),
        largest_component_size: components.largest(),
        smallest_component_size: components.smallest(),
        average_component_size: components.average(),
        min_face_area,
        max_face_area,
        average_face_area,
        num_degenerate_faces,
        area_degeneracy_ratio: ratio(num_degenerate_faces as f64, num_faces),
        min_angle_p5_deg,
        max_angle_deg,
    };

    log::debug!(
        "Metrics: V={} E={} F={} chi={} loops={} components={}",
        metrics.num_vertices,
        metrics.num_unique_edges,
        metrics.num_faces,
        metrics.euler_characteristic,
        metrics.num_boundary_loops,
        metrics.num_components
    );

    Ok(MeshAnalysis {
        metrics,
        geometry,
        laplacian,
        mass,
        components,
    })
}

/// `value / count`, zero when `count` is zero.
fn ratio(value: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / count as f64
    }
}

/// Element at index `floor(p * len)` of sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((p * sorted.len() as f64) as usize).min(sorted.len() - 1);
    sorted[index]
}

impl MeshMetrics {
    /// Write the plain-text report.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{}", self)
    }

    /// Write the report to a file, creating parent directories as needed.
    pub fn save_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let save_err = |e: std::io::Error| MeshError::SaveError {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(save_err)?;
            }
        }

        let file = File::create(path).map_err(save_err)?;
        let mut writer = BufWriter::new(file);
        self.write_report(&mut writer).map_err(save_err)?;
        writer.flush().map_err(save_err)?;

        log::info!("Wrote metrics report to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for MeshMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Metrics:")?;
        writeln!(f, "  Number of vertices: {}", self.num_vertices)?;
        writeln!(f, "  Number of faces: {}", self.num_faces)?;
        writeln!(f, "  Number of unique edges: {}", self.num_unique_edges)?;
        writeln!(f, "  Euler characteristic: {}", self.euler_characteristic)?;
        writeln!(f, "  Number of boundary loops: {}", self.num_boundary_loops)?;
        writeln!(f, "  Number of boundary edges: {}", self.num_boundary_edges)?;
        writeln!(f, "  Average loop size: {}", self.average_loop_size)?;
        writeln!(f, "  Max loop size: {}", self.max_loop_size)?;
        writeln!(f, "  Min loop size: {}", self.min_loop_size)?;
        writeln!(f, "  Edge boundary ratio: {}", self.edge_boundary_ratio)?;
        writeln!(f, "  Number of connected components: {}", self.num_components)?;
        writeln!(f, "  Largest component size (faces): {}", self.largest_component_size)?;
        writeln!(f, "  Smallest component size (faces): {}", self.smallest_component_size)?;
        writeln!(f, "  Average component size (faces): {}", self.average_component_size)?;
        writeln!(f, "  Minimum face area: {}", self.min_face_area)?;
        writeln!(f, "  Maximum face area: {}", self.max_face_area)?;
        writeln!(f, "  Average face area: {}", self.average_face_area)?;
        writeln!(f, "  Number of degenerate faces: {}", self.num_degenerate_faces)?;
        writeln!(f, "  Area degeneracy ratio: {}", self.area_degeneracy_ratio)?;
        writeln!(f, "  5th percentile minimum angle: {}", self.min_angle_p5_deg)?;
        writeln!(f, "  Maximum angle: {}", self.max_angle_deg)?;

        writeln!(f, "LOOP DETAILS:")?;
        for (i, l) in self.boundary_loops.iter().enumerate() {
            writeln!(f, "  Loop {} size: {}", i, l.len())?;
        }

        writeln!(f, "COMPONENT SIZES:")?;
        for (i, size) in self.component_sizes.iter().enumerate() {
            writeln!(f, "  Component {} size: {}", i, size)?;
        }
        Ok(())
    }
}
