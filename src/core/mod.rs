//! Core traits and their implementations for dense faer types and plain vectors.

pub mod traits;
pub mod wrappers;

pub use traits::{InnerProduct, MatTransVec, MatVec};
