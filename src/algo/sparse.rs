//! Sparse and diagonal matrices for discrete operators.
//!
//! [`CsrMatrix`] holds the cotangent Laplacian in compressed sparse row form;
//! [`MassMatrix`] holds the per-vertex Voronoi areas as a diagonal together
//! with its precomputed inverse.

use nalgebra::DVector;

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in CSR format for efficient matrix-vector multiplication.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: row_ptr[i] is the index in col_idx/values where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices for each non-zero value, sorted within each row.
    col_idx: Vec<usize>,
    /// Non-zero values.
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        debug_assert!(triplets.iter().all(|&(r, c, _)| r < rows && c < cols));

        // Sort by (row, col) for CSR construction
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += val;
                }
                continue;
            }
            col_idx.push(col);
            values.push(val);
            row_ptr[row + 1] += 1;
            last = Some((row, col));
        }

        // Prefix sum turns per-row counts into offsets
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored `(col, value)` pairs of a row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Entry at `(i, j)`, zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];
        match self.col_idx[start..end].binary_search(&j) {
            Ok(k) => self.values[start + k],
            Err(_) => 0.0,
        }
    }

    /// Sum of the entries of row `i`.
    pub fn row_sum(&self, i: usize) -> f64 {
        self.values[self.row_ptr[i]..self.row_ptr[i + 1]].iter().sum()
    }

    /// Check `|A(i,j) - A(j,i)| <= tolerance` for every stored entry.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|i| self.row(i).all(|(j, v)| (v - self.get(j, i)).abs() <= tolerance))
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.rows);

        for i in 0..self.rows {
            let start = self.row_ptr[i];
            let end = self.row_ptr[i + 1];

            let mut sum = 0.0;
            for k in start..end {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[i] = sum;
        }

        y
    }
}

/// Diagonal mass matrix of per-vertex areas.
#[derive(Debug, Clone)]
pub struct MassMatrix {
    diagonal: DVector<f64>,
    inverse: DVector<f64>,
}

impl MassMatrix {
    /// Build from per-vertex areas. The inverse is zero where an area is zero.
    pub fn from_areas(areas: &[f64]) -> Self {
        let diagonal = DVector::from_column_slice(areas);
        let inverse = diagonal.map(|a| if a > 0.0 { 1.0 / a } else { 0.0 });
        Self { diagonal, inverse }
    }

    /// Matrix dimension.
    #[inline]
    pub fn len(&self) -> usize {
        self.diagonal.len()
    }

    /// Check if the matrix has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diagonal.is_empty()
    }

    /// The diagonal entries.
    #[inline]
    pub fn diagonal(&self) -> &DVector<f64> {
        &self.diagonal
    }

    /// The diagonal of the inverse.
    #[inline]
    pub fn inverse(&self) -> &DVector<f64> {
        &self.inverse
    }

    /// Multiply by a vector: y = M * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        self.diagonal.component_mul(x)
    }

    /// Multiply by the inverse: y = M^-1 * x.
    pub fn solve(&self, x: &DVector<f64>) -> DVector<f64> {
        self.inverse.component_mul(x)
    }

    /// Sum of the diagonal.
    pub fn total(&self) -> f64 {
        self.diagonal.sum()
    }

    /// Convert to a CSR matrix.
    pub fn to_csr(&self) -> CsrMatrix {
        let n = self.diagonal.len();
        let triplets = self
            .diagonal
            .iter()
            .enumerate()
            .map(|(i, &a)| (i, i, a))
            .collect();
        CsrMatrix::from_triplets(n, n, triplets)
    }
}
