//! Stationary distribution by power iteration on Pᵀ.
//!
//! Starting from the uniform vector, each step computes x ← Pᵀx and rescales by the
//! sum so the iterate stays a probability vector. The iteration stops when two
//! successive iterates differ by less than `tol` in L1. Reaching `maxit` is not an
//! error: the last iterate is returned and [`PowerStats::converged`] is false.

use crate::core::traits::MatTransVec;
use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};

/// Outcome of a power iteration run.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerStats {
    pub iterations: usize,
    /// L1 distance between the last two iterates.
    pub delta: f64,
    pub converged: bool,
}

/// Left Perron vector of a stochastic `p`.
pub fn stationary_distribution_power(
    p: &CsrMatrix,
    maxit: usize,
    tol: f64,
) -> Result<Vec<f64>, McError> {
    stationary_distribution_power_with_stats(p, maxit, tol).map(|(pi, _)| pi)
}

/// [`stationary_distribution_power`] that also reports iteration count and final delta.
pub fn stationary_distribution_power_with_stats(
    p: &CsrMatrix,
    maxit: usize,
    tol: f64,
) -> Result<(Vec<f64>, PowerStats), McError> {
    let n = ensure_square(p.nrows(), p.ncols())?;
    if n == 0 {
        return Err(McError::EmptyMatrix);
    }
    let mut x = vec![1.0 / n as f64; n];
    let mut x_new = vec![0.0; n];
    let mut stats = PowerStats {
        iterations: 0,
        delta: f64::INFINITY,
        converged: false,
    };
    for k in 0..maxit {
        p.mattransvec(&x, &mut x_new);
        let sum: f64 = x_new.iter().sum();
        for v in x_new.iter_mut() {
            *v /= sum;
        }
        let delta: f64 = x_new.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        stats.iterations = k + 1;
        stats.delta = delta;
        log::trace!("power iteration {}: delta = {delta:e}", k + 1);
        std::mem::swap(&mut x, &mut x_new);
        if delta < tol {
            stats.converged = true;
            break;
        }
    }
    if stats.converged {
        log::debug!("power iteration converged in {} iterations", stats.iterations);
    } else {
        log::warn!(
            "power iteration stopped after {} iterations without reaching tol {tol:e} (delta = {:e})",
            stats.iterations,
            stats.delta
        );
    }
    Ok((x, stats))
}
