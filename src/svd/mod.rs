use std::collections::HashMap;

use log::{debug, info};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::eigen::{EigenSolver, NalgebraEigen};
use crate::error::SvdError;
use crate::gram::gram_matrix;
use crate::sparse::MatrixEntry;

/// Thresholds below this make the division by sigma in [`reconstruct_u`]
/// numerically unstable, so they are rejected up front.
pub const MIN_SVALUE_FLOOR: f64 = 1.0e-8;

/// The three factors of the decomposition, each in 1-indexed triplet form.
///
/// `u` is m x k, `s` is the k x k diagonal `MatrixEntry(i, i, sigma_i)`, and
/// `v` is n x k. Columns of `u` and `v` are kept in lock-step with `s`:
/// position `j` everywhere refers to the same singular triple. Singular
/// values are in the order the eigensolver produced them, not sorted by
/// magnitude.
#[derive(Debug, Clone)]
pub struct SvdOutput {
    pub u: Vec<MatrixEntry>,
    pub s: Vec<MatrixEntry>,
    pub v: Vec<MatrixEntry>,
}

impl SvdOutput {
    /// Number of singular values retained by the threshold filter.
    pub fn rank(&self) -> usize {
        self.s.len()
    }
}

pub fn validate_threshold(min_svalue: f64) -> Result<(), SvdError> {
    if !(min_svalue >= MIN_SVALUE_FLOOR) {
        return Err(SvdError::InvalidThreshold(min_svalue));
    }
    Ok(())
}

/// Derives singular values from eigenvalues of the Gram matrix and applies
/// the retention threshold.
///
/// Each sigma_i = sqrt(max(lambda_i, 0)); slightly negative eigenvalues are a
/// rounding artifact of a positive semi-definite matrix and are clamped
/// rather than allowed to produce NaN. Returns `(eigen_index, sigma)` pairs
/// in original index order. Fails if nothing survives the threshold.
pub fn filter_singular_values(
    eigenvalues: &Array1<f64>,
    min_svalue: f64,
) -> Result<Vec<(usize, f64)>, SvdError> {
    validate_threshold(min_svalue)?;

    let retained: Vec<(usize, f64)> = eigenvalues
        .iter()
        .enumerate()
        .map(|(i, &lambda)| (i, lambda.max(0.0).sqrt()))
        .filter(|&(_, sigma)| sigma >= min_svalue)
        .collect();

    if retained.is_empty() {
        return Err(SvdError::NoSingularValuesAboveThreshold(min_svalue));
    }
    Ok(retained)
}

/// Computes `U = A * V * S^-1` as sparse triplets.
///
/// `eigenvectors` is the full n x n eigenvector matrix; `retained` selects
/// the surviving columns together with their singular values. The columns
/// are first rescaled by `1 / sigma` into the dense n x k matrix W, then
/// every A-entry `(r, c, v)` is joined against row `c` of W and the partial
/// products `v * w` are summed per output coordinate `(r, j)`. The join and
/// the summation both run in parallel over entry chunks; merging is plain
/// addition. Pairs whose sum is exactly zero are dropped from the output.
///
/// Entries must lie within the shape already validated by the Gram stage.
pub fn reconstruct_u(
    entries: &[MatrixEntry],
    eigenvectors: &Array2<f64>,
    retained: &[(usize, f64)],
) -> Vec<MatrixEntry> {
    let n = eigenvectors.nrows();

    // W = V * S^-1, stored row-wise for the join on the inner index.
    let w_rows: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            retained
                .iter()
                .enumerate()
                .map(|(j, &(idx, sigma))| (j, eigenvectors[[i, idx]] / sigma))
                .collect()
        })
        .collect();

    let sums = entries
        .par_iter()
        .fold(
            HashMap::<(usize, usize), f64>::new,
            |mut acc, e| {
                for &(j, w) in &w_rows[e.col - 1] {
                    *acc.entry((e.row, j)).or_insert(0.0) += e.value * w;
                }
                acc
            },
        )
        .reduce(HashMap::new, |mut a, b| {
            for (key, partial) in b {
                *a.entry(key).or_insert(0.0) += partial;
            }
            a
        });

    sums.into_iter()
        .filter(|&(_, sum)| sum != 0.0)
        .map(|((row, j), sum)| MatrixEntry::new(row, j + 1, sum))
        .collect()
}

/// Singular value decomposition of a tall-and-skinny sparse matrix, using a
/// caller-provided dense eigensolver for the Gram matrix.
///
/// `data` holds the 1-indexed entries of the m x n matrix A with m >= n;
/// duplicate `(row, col)` pairs must be summed beforehand (see
/// [`crate::sparse::compact`]). Singular values below `min_svalue` are
/// discarded; the surviving rank k determines the shapes of the three
/// factors. All preconditions are checked before any aggregation starts.
pub fn sparse_svd_with<S: EigenSolver>(
    solver: &S,
    data: &[MatrixEntry],
    m: usize,
    n: usize,
    min_svalue: f64,
) -> Result<SvdOutput, SvdError> {
    validate_threshold(min_svalue)?;

    let gram = gram_matrix(data, m, n)?;
    let (eigenvectors, eigenvalues) = solver.decompose(gram).map_err(SvdError::Eigen)?;

    let retained = filter_singular_values(&eigenvalues, min_svalue)?;
    info!(
        "retained {} of {} singular values (threshold {})",
        retained.len(),
        n,
        min_svalue
    );

    let u = reconstruct_u(data, &eigenvectors, &retained);
    debug!("reconstructed U with {} nonzero entries", u.len());

    let s = retained
        .iter()
        .enumerate()
        .map(|(j, &(_, sigma))| MatrixEntry::new(j + 1, j + 1, sigma))
        .collect();

    let mut v = Vec::with_capacity(n * retained.len());
    for i in 0..n {
        for (j, &(idx, _)) in retained.iter().enumerate() {
            v.push(MatrixEntry::new(i + 1, j + 1, eigenvectors[[i, idx]]));
        }
    }

    Ok(SvdOutput { u, s, v })
}

/// [`sparse_svd_with`] using the default nalgebra-backed eigensolver.
pub fn sparse_svd(
    data: &[MatrixEntry],
    m: usize,
    n: usize,
    min_svalue: f64,
) -> Result<SvdOutput, SvdError> {
    sparse_svd_with(&NalgebraEigen, data, m, n, min_svalue)
}
