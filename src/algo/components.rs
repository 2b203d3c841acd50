//! Connected component labeling.
//!
//! Two faces belong to the same component when a chain of shared edges
//! connects them. Faces that only share a vertex are not connected.

use std::fmt;

use crate::mesh::{FaceId, MeshIndex, Topology};

/// Result of connected component labeling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAnalysis {
    /// Component label of every face. Labels follow the order of each
    /// component's lowest face index.
    pub labels: Vec<usize>,
    /// Number of faces in each component, indexed by label.
    pub sizes: Vec<usize>,
}

impl ComponentAnalysis {
    /// Number of components.
    #[inline]
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Check if the mesh is fully connected (single component).
    pub fn is_connected(&self) -> bool {
        self.count() == 1
    }

    /// Size of the largest component, zero if there are none.
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Size of the smallest component, zero if there are none.
    pub fn smallest(&self) -> usize {
        self.sizes.iter().copied().min().unwrap_or(0)
    }

    /// Average component size, zero if there are none.
    pub fn average(&self) -> f64 {
        if self.sizes.is_empty() {
            0.0
        } else {
            self.labels.len() as f64 / self.sizes.len() as f64
        }
    }
}

impl fmt::Display for ComponentAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Component Analysis:")?;
        writeln!(f, "  Connected components: {}", self.count())?;
        if self.count() > 0 {
            writeln!(f, "  Largest component: {} faces", self.largest())?;
            writeln!(f, "  Smallest component: {} faces", self.smallest())?;
            if self.count() > 1 {
                writeln!(f, "  Component sizes:")?;
                for (i, size) in self.sizes.iter().enumerate() {
                    writeln!(f, "    Component {}: {} faces", i, size)?;
                }
            }
        }
        Ok(())
    }
}

/// Label the connected components of a topology.
///
/// Flood fill over faces through flip adjacency, starting from each
/// unvisited face in index order.
pub fn find_connected_components<I: MeshIndex>(topology: &Topology<I>) -> ComponentAnalysis {
    let face_count = topology.num_faces();
    let mut labels = vec![usize::MAX; face_count];
    let mut sizes = Vec::new();

    for start_face in 0..face_count {
        if labels[start_face] != usize::MAX {
            continue;
        }

        let label = sizes.len();
        let mut size = 0;
        let mut queue = vec![FaceId::<I>::new(start_face)];
        labels[start_face] = label;

        while let Some(face) = queue.pop() {
            size += 1;

            for neighbor in topology.face_neighbors(face) {
                if labels[neighbor.index()] == usize::MAX {
                    labels[neighbor.index()] = label;
                    queue.push(neighbor);
                }
            }
        }

        sizes.push(size);
    }

    log::debug!(
        "Found {} connected component(s) in mesh with {} faces",
        sizes.len(),
        face_count
    );

    ComponentAnalysis { labels, sizes }
}
