use log::debug;
use ndarray::{Array1, Array2};
use nshare::{IntoNalgebra, IntoNdarray1, IntoNdarray2};

/// Boundary to the dense symmetric eigensolver.
///
/// Implementations take ownership of the Gram matrix and return the
/// eigenvector matrix (columns) and eigenvalues matched by index. No ordering
/// or sign convention is promised; callers must keep column `i` of the
/// eigenvector matrix and eigenvalue `i` in lock-step and must not assume the
/// eigenvalues are sorted.
pub trait EigenSolver: Send + Sync {
    fn decompose(&self, gram: Array2<f64>) -> anyhow::Result<(Array2<f64>, Array1<f64>)>;
}

/// Default eigensolver backed by nalgebra's symmetric eigendecomposition.
pub struct NalgebraEigen;

impl EigenSolver for NalgebraEigen {
    fn decompose(&self, gram: Array2<f64>) -> anyhow::Result<(Array2<f64>, Array1<f64>)> {
        let n = gram.nrows();
        let eig = gram.into_nalgebra().symmetric_eigen();
        debug!("symmetric eigendecomposition of {}x{} matrix complete", n, n);
        Ok((
            eig.eigenvectors.into_ndarray2(),
            eig.eigenvalues.into_ndarray1(),
        ))
    }
}
