//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and the dense SVD pseudo-inverse preconditioner
//! used for the singular Markov system.

use crate::error::McError;

/// A preconditioner M ≈ A⁺.
pub trait Preconditioner<M, V> {
    /// Apply M to r, writing z = M r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), McError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), McError> { Ok(()) }
}

pub mod svd;

// Re-exports for convenience
pub use svd::SvdPreconditioner;
