//! amgmc: Markov chain stationary distributions and singular solves over Faer
//!
//! This crate normalizes non-negative matrices into row-stochastic transition matrices,
//! computes their stationary distribution by power iteration, builds the singular
//! operator A = I − P with a random-aggregation coarsening hierarchy, and solves
//! consistent systems A x = b with LGMRES preconditioned by a regularized SVD
//! pseudo-inverse. Sparse kernels optionally run in parallel with rayon.

pub mod amg;
pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod markov;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use amg::*;
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use error::*;
pub use markov::*;
pub use matrix::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
