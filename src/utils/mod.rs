//! Convergence bookkeeping, validation metrics and graph helpers.

pub mod convergence;
pub mod graph;
pub mod metrics;

pub use convergence::{Convergence, SolveStats, SolveStatus};
pub use metrics::{NormOrd, l1_error, l2_error, residual_norm, vector_norm};
