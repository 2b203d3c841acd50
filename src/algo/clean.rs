//! Quality-based triangle filtering.
//!
//! The cleaning pipeline works on a raw [`MeshRecord`] and never builds a
//! topology. It runs two filters in a fixed order:
//!
//! 1. **Near-duplicate removal**: triangles whose centroids, normals and
//!    areas all agree within tolerance are collapsed to the first one.
//! 2. **High-aspect culling**: slivers whose longest edge is at least `t`
//!    times their shortest edge are dropped.
//!
//! Both filters keep the vertex array unchanged, keep surviving triangles in
//! their original order and drop face colors in lock-step with their faces.
//!
//! # Example
//!
//! ```
//! use meshqa::algo::clean::{clean_mesh, CleanOptions};
//! use meshqa::mesh::MeshRecord;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! // The same triangle twice.
//! let record = MeshRecord::new(positions, vec![[0, 1, 2], [0, 1, 2]]);
//!
//! let cleaned = clean_mesh(&record, &CleanOptions::default()).unwrap();
//! assert_eq!(cleaned.num_faces(), 1);
//! ```

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{aspect_ratio, triangle_area, triangle_centroid, triangle_normal, MeshRecord};

/// Tolerances for near-duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupOptions {
    /// Maximum centroid distance.
    pub eps_centroid: f64,

    /// Maximum angle between unit normals, in degrees.
    pub eps_normal_deg: f64,

    /// Maximum absolute area difference.
    pub eps_area: f64,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            eps_centroid: 0.1,
            eps_normal_deg: 15.0,
            eps_area: 0.1,
        }
    }
}

impl DedupOptions {
    /// Tight tolerances that only merge near-exact copies.
    pub fn strict() -> Self {
        Self {
            eps_centroid: 1e-3,
            eps_normal_deg: 10.0,
            eps_area: 1e-6,
        }
    }

    /// Set the centroid distance tolerance.
    pub fn with_eps_centroid(mut self, eps: f64) -> Self {
        self.eps_centroid = eps;
        self
    }

    /// Set the normal angle tolerance in degrees.
    pub fn with_eps_normal_deg(mut self, degrees: f64) -> Self {
        self.eps_normal_deg = degrees;
        self
    }

    /// Set the area difference tolerance.
    pub fn with_eps_area(mut self, eps: f64) -> Self {
        self.eps_area = eps;
        self
    }

    /// Reject negative or NaN tolerances.
    pub fn validate(&self) -> Result<()> {
        check_non_negative("eps_centroid", self.eps_centroid)?;
        check_non_negative("eps_normal_deg", self.eps_normal_deg)?;
        check_non_negative("eps_area", self.eps_area)
    }
}

/// Options for [`clean_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanOptions {
    /// Near-duplicate tolerances.
    pub dedup: DedupOptions,

    /// Triangles with aspect ratio at or above this are removed.
    pub max_aspect_ratio: f64,

    /// Whether to run near-duplicate removal.
    pub remove_duplicates: bool,

    /// Whether to run high-aspect culling.
    pub remove_high_aspect: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            dedup: DedupOptions::default(),
            max_aspect_ratio: 20.0,
            remove_duplicates: true,
            remove_high_aspect: true,
        }
    }
}

impl CleanOptions {
    /// Set the near-duplicate tolerances.
    pub fn with_dedup(mut self, dedup: DedupOptions) -> Self {
        self.dedup = dedup;
        self
    }

    /// Set the aspect ratio threshold.
    pub fn with_max_aspect_ratio(mut self, ratio: f64) -> Self {
        self.max_aspect_ratio = ratio;
        self
    }

    /// Skip near-duplicate removal.
    pub fn skip_duplicates(mut self) -> Self {
        self.remove_duplicates = false;
        self
    }

    /// Skip high-aspect culling.
    pub fn skip_high_aspect(mut self) -> Self {
        self.remove_high_aspect = false;
        self
    }

    /// Reject negative or NaN parameters.
    pub fn validate(&self) -> Result<()> {
        self.dedup.validate()?;
        check_non_negative("max_aspect_ratio", self.max_aspect_ratio)
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(MeshError::invalid_param(name, value, "must be non-negative"));
    }
    Ok(())
}

/// Run near-duplicate removal followed by high-aspect culling.
///
/// # Errors
/// * [`MeshError::InvalidVertexIndex`] or [`MeshError::ColorCountMismatch`]
///   for a malformed record
/// * [`MeshError::InvalidParameter`] for a negative or NaN parameter
pub fn clean_mesh(record: &MeshRecord, options: &CleanOptions) -> Result<MeshRecord> {
    options.validate()?;
    record.validate()?;

    let input_faces = record.num_faces();
    let mut cleaned = record.clone();

    if options.remove_duplicates {
        cleaned = remove_near_duplicate_triangles(&cleaned, &options.dedup)?;
    }
    if options.remove_high_aspect {
        cleaned = remove_high_aspect_triangles(&cleaned, options.max_aspect_ratio)?;
    }

    log::info!(
        "Cleaning kept {} of {} triangles",
        cleaned.num_faces(),
        input_faces
    );

    Ok(cleaned)
}

/// Per-triangle data compared by the duplicate filter.
struct TriInfo {
    centroid: Point3<f64>,
    normal: Vector3<f64>,
    area: f64,
}

type CellKey = (i64, i64, i64);

/// Grid cell of a centroid.
///
/// With a zero cell size only bit-identical centroids share a cell.
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> CellKey {
    if cell_size > 0.0 {
        (
            (pos.x / cell_size).floor() as i64,
            (pos.y / cell_size).floor() as i64,
            (pos.z / cell_size).floor() as i64,
        )
    } else {
        // Adding 0.0 folds -0.0 into +0.0.
        (
            (pos.x + 0.0).to_bits() as i64,
            (pos.y + 0.0).to_bits() as i64,
            (pos.z + 0.0).to_bits() as i64,
        )
    }
}

/// Remove triangles that nearly duplicate an earlier triangle.
///
/// Triangles are bucketed by centroid into a grid with cell size
/// `2 * eps_centroid`. Within a bucket, every pair of surviving triangles is
/// compared in index order; a later triangle is removed when its centroid is
/// within `eps_centroid`, the dot product of the unit normals is at least
/// `cos(eps_normal_deg)` and the areas differ by at most `eps_area`. Removed
/// triangles never remove others, so in a chain `A ~ B ~ C` with `A` not
/// close to `C`, only `B` is removed.
///
/// Only triangles sharing a cell are compared. Two close centroids on either
/// side of a cell wall are both kept.
pub fn remove_near_duplicate_triangles(
    record: &MeshRecord,
    options: &DedupOptions,
) -> Result<MeshRecord> {
    options.validate()?;
    record.validate()?;

    let info: Vec<TriInfo> = (0..record.num_faces())
        .map(|fi| {
            let [a, b, c] = record.triangle(fi);
            TriInfo {
                centroid: triangle_centroid(&a, &b, &c),
                normal: triangle_normal(&a, &b, &c),
                area: triangle_area(&a, &b, &c),
            }
        })
        .collect();

    // Buckets are filled in face order, so each is sorted by face index.
    let cell_size = 2.0 * options.eps_centroid;
    let mut grid: HashMap<CellKey, Vec<usize>> = HashMap::with_capacity(info.len());
    for (fi, tri) in info.iter().enumerate() {
        grid.entry(pos_to_cell(&tri.centroid, cell_size))
            .or_default()
            .push(fi);
    }

    let cos_threshold = options.eps_normal_deg.to_radians().cos();
    let mut keep = vec![true; info.len()];

    for bucket in grid.values() {
        for (i, &fi) in bucket.iter().enumerate() {
            if !keep[fi] {
                continue;
            }
            let a = &info[fi];

            for &fj in &bucket[i + 1..] {
                if !keep[fj] {
                    continue;
                }
                let b = &info[fj];

                if (a.centroid - b.centroid).norm() > options.eps_centroid {
                    continue;
                }
                if a.normal.dot(&b.normal) < cos_threshold {
                    continue;
                }
                if (a.area - b.area).abs() > options.eps_area {
                    continue;
                }

                keep[fj] = false;
            }
        }
    }

    let removed = keep.iter().filter(|&&k| !k).count();
    log::info!("Removed near-duplicate triangles: {}", removed);

    Ok(record.retain_faces(&keep))
}

/// Remove triangles whose longest-to-shortest edge ratio is at least `max_ratio`.
///
/// Triangles with a zero-length edge have infinite ratio and are always
/// removed.
pub fn remove_high_aspect_triangles(record: &MeshRecord, max_ratio: f64) -> Result<MeshRecord> {
    check_non_negative("max_aspect_ratio", max_ratio)?;
    record.validate()?;

    let keep: Vec<bool> = (0..record.num_faces())
        .map(|fi| {
            let [a, b, c] = record.triangle(fi);
            aspect_ratio(&a, &b, &c) < max_ratio
        })
        .collect();

    let removed = keep.iter().filter(|&&k| !k).count();
    log::info!(
        "Removed high-aspect triangles (ratio >= {}): {}",
        max_ratio,
        removed
    );

    Ok(record.retain_faces(&keep))
}
