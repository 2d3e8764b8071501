use std::collections::HashMap;

use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::SvdError;
use crate::sparse::MatrixEntry;

/// Checks that `m x n` describes a tall-and-skinny matrix.
pub fn validate_shape(m: usize, n: usize) -> Result<(), SvdError> {
    if m == 0 || n == 0 || m < n {
        return Err(SvdError::InvalidShape { m, n });
    }
    Ok(())
}

/// Builds the dense Gram matrix `G = A^T A` from the sparse entries of A.
///
/// Entries are grouped by row; within a row every ordered pair of nonzeros
/// `(col_a, v_a)`, `(col_b, v_b)` contributes `v_a * v_b` to
/// `G[col_a - 1][col_b - 1]`. Per-row partial sums are accumulated in
/// parallel and merged by addition, which is safe because summation is
/// commutative and associative. The result is symmetric up to floating-point
/// summation order.
pub fn gram_matrix(
    entries: &[MatrixEntry],
    m: usize,
    n: usize,
) -> Result<Array2<f64>, SvdError> {
    validate_shape(m, n)?;

    let mut by_row: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
    for e in entries {
        if e.row < 1 || e.row > m || e.col < 1 || e.col > n {
            return Err(SvdError::IndexOutOfBounds {
                row: e.row,
                col: e.col,
                m,
                n,
            });
        }
        by_row.entry(e.row).or_default().push((e.col, e.value));
    }

    debug!(
        "building {}x{} gram matrix from {} entries in {} occupied rows",
        n,
        n,
        entries.len(),
        by_row.len()
    );

    let rows: Vec<&Vec<(usize, f64)>> = by_row.values().collect();
    let gram = rows
        .par_iter()
        .fold(
            || Array2::<f64>::zeros((n, n)),
            |mut acc, cols| {
                for &(col_a, v_a) in cols.iter() {
                    for &(col_b, v_b) in cols.iter() {
                        acc[[col_a - 1, col_b - 1]] += v_a * v_b;
                    }
                }
                acc
            },
        )
        .reduce(|| Array2::<f64>::zeros((n, n)), |a, b| a + b);

    Ok(gram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::to_dense;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_gram_matches_dense_product() {
        let entries = vec![
            MatrixEntry::new(1, 1, 1.0),
            MatrixEntry::new(1, 2, 2.0),
            MatrixEntry::new(2, 1, 3.0),
            MatrixEntry::new(3, 2, -1.0),
            MatrixEntry::new(4, 1, 0.5),
            MatrixEntry::new(4, 2, 4.0),
        ];
        let gram = gram_matrix(&entries, 4, 2).unwrap();

        let a = to_dense(&entries, 4, 2);
        let expected = a.t().dot(&a);
        assert_abs_diff_eq!(gram, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_gram_is_symmetric() {
        let entries = vec![
            MatrixEntry::new(1, 1, 2.0),
            MatrixEntry::new(1, 3, -1.0),
            MatrixEntry::new(2, 2, 5.0),
            MatrixEntry::new(3, 1, 1.0),
            MatrixEntry::new(3, 2, 0.25),
        ];
        let gram = gram_matrix(&entries, 5, 3).unwrap();
        assert_abs_diff_eq!(gram.clone(), gram.t().to_owned(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_entry_row_contributes_diagonal() {
        let entries = vec![MatrixEntry::new(2, 1, 3.0)];
        let gram = gram_matrix(&entries, 3, 2).unwrap();
        assert_abs_diff_eq!(gram, array![[9.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_rejects_wide_matrix() {
        let entries = vec![MatrixEntry::new(1, 1, 1.0)];
        let err = gram_matrix(&entries, 2, 5).unwrap_err();
        assert!(matches!(err, SvdError::InvalidShape { m: 2, n: 5 }));
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(matches!(
            gram_matrix(&[], 0, 0).unwrap_err(),
            SvdError::InvalidShape { .. }
        ));
    }

    #[test]
    fn test_rejects_out_of_bounds_entry() {
        let entries = vec![MatrixEntry::new(5, 1, 1.0)];
        let err = gram_matrix(&entries, 4, 2).unwrap_err();
        assert!(matches!(
            err,
            SvdError::IndexOutOfBounds { row: 5, col: 1, m: 4, n: 2 }
        ));
    }

    #[test]
    fn test_empty_input_gives_zero_gram() {
        let gram = gram_matrix(&[], 3, 2).unwrap();
        assert_abs_diff_eq!(gram, Array2::zeros((2, 2)));
    }
}
