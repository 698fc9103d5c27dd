use thiserror::Error;

// Unified error type for amgmc

#[derive(Error, Debug)]
pub enum McError {
    #[error("matrix must be square, got {nrows}x{ncols}")]
    NotSquare { nrows: usize, ncols: usize },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("empty matrix: a chain needs at least one state")]
    EmptyMatrix,
    #[error("degenerate row {0}: row sum is zero or not finite")]
    DegenerateRow(usize),
    #[error("negative or NaN entry at ({row}, {col})")]
    NegativeEntry { row: usize, col: usize },
    #[error("dense SVD of a {n}x{n} operator exceeds the configured limit of {limit}")]
    ResourceLimit { n: usize, limit: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// faer's `SvdError` does not implement `std::error::Error`, so it is carried by value.
    #[error("singular value decomposition failed: {0:?}")]
    Svd(faer::linalg::svd::SvdError),
    #[error("thread pool configuration failed: {0}")]
    ThreadPool(String),
}
