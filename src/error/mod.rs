use thiserror::Error;

/// Errors raised by the tall-skinny SVD pipeline. All of them are fatal to
/// the call that produced them; no partial decomposition is ever returned.
#[derive(Error, Debug)]
pub enum SvdError {
    /// The input is not tall-and-skinny, or a dimension is zero.
    #[error("invalid matrix shape {m}x{n}: need m >= n and both dimensions positive")]
    InvalidShape { m: usize, n: usize },

    /// An entry's 1-indexed coordinates fall outside the declared `m x n` shape.
    #[error("entry ({row}, {col}) is outside the declared {m}x{n} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        m: usize,
        n: usize,
    },

    /// Thresholds below 1e-8 would make the division by sigma in the U
    /// reconstruction numerically unstable.
    #[error("minimum singular value {0} is below the 1e-8 floor")]
    InvalidThreshold(f64),

    /// Every singular value fell below the requested threshold.
    #[error("no singular values above threshold {0}")]
    NoSingularValuesAboveThreshold(f64),

    /// The external eigensolver failed.
    #[error("eigendecomposition failed")]
    Eigen(#[source] anyhow::Error),
}
