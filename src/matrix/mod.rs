//! Matrix module: dense and sparse matrix types and traits.

pub mod dense;
pub use dense::{dense_from_rows, ensure_square};
pub mod sparse;
pub use sparse::{CsrMatrix, SparseMatrix};
