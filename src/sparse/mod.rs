use std::collections::HashMap;

use anyhow::bail;
use nalgebra_sparse::CooMatrix;
use ndarray::Array2;

/// One explicit entry of a sparse matrix in 1-indexed triplet form.
///
/// Collections of entries are unordered; a `(row, col)` pair is expected to
/// appear at most once. Callers holding duplicate coordinates should run
/// [`compact`] before handing the data to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixEntry {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl MatrixEntry {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        MatrixEntry { row, col, value }
    }
}

/// Sums duplicate `(row, col)` coordinates into a single entry each.
/// Output order is unspecified.
pub fn compact(entries: Vec<MatrixEntry>) -> Vec<MatrixEntry> {
    let mut summed: HashMap<(usize, usize), f64> = HashMap::with_capacity(entries.len());
    for e in entries {
        *summed.entry((e.row, e.col)).or_insert(0.0) += e.value;
    }
    summed
        .into_iter()
        .map(|((row, col), value)| MatrixEntry { row, col, value })
        .collect()
}

/// Converts 1-indexed triplet entries into a 0-indexed COO matrix.
pub fn to_coo(entries: &[MatrixEntry], m: usize, n: usize) -> anyhow::Result<CooMatrix<f64>> {
    let mut coo = CooMatrix::new(m, n);
    for e in entries {
        if e.row < 1 || e.row > m || e.col < 1 || e.col > n {
            bail!(
                "entry ({}, {}) does not fit a {}x{} matrix",
                e.row,
                e.col,
                m,
                n
            );
        }
        coo.push(e.row - 1, e.col - 1, e.value);
    }
    Ok(coo)
}

/// Converts a COO matrix back into 1-indexed triplet entries.
pub fn from_coo(coo: &CooMatrix<f64>) -> Vec<MatrixEntry> {
    coo.triplet_iter()
        .map(|(i, j, &v)| MatrixEntry::new(i + 1, j + 1, v))
        .collect()
}

/// Materializes triplet entries as a dense array, summing duplicates.
/// Intended for small matrices (tests, diagnostics); entries outside the
/// declared shape are ignored.
pub fn to_dense(entries: &[MatrixEntry], m: usize, n: usize) -> Array2<f64> {
    let mut dense = Array2::zeros((m, n));
    for e in entries {
        if e.row >= 1 && e.row <= m && e.col >= 1 && e.col <= n {
            dense[[e.row - 1, e.col - 1]] += e.value;
        }
    }
    dense
}
