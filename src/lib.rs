pub mod eigen;
pub mod error;
pub mod gram;
pub mod sparse;
pub mod svd;

pub use error::SvdError;
pub use sparse::MatrixEntry;
pub use svd::{sparse_svd, sparse_svd_with, SvdOutput};
