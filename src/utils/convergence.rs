//! Convergence tracking & tolerance checks for iterative solvers.

/// Stopping criteria: `‖r‖ ≤ max(tol, rtol·‖b‖)` within `max_iters` cycles.
#[derive(Clone, Debug)]
pub struct Convergence<T> {
    /// Absolute tolerance.
    pub tol: T,
    /// Relative tolerance, scaled by ‖b‖.
    pub rtol: T,
    pub max_iters: usize,
}

/// How an iterative solve ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    Converged,
    /// Iteration cap reached; carries the cap.
    IterationLimit(usize),
    /// Numerical breakdown (zero preconditioned residual, non-finite update).
    Breakdown,
}

impl SolveStatus {
    /// Integer status code: 0 converged, the iteration cap when it was hit, -1 on breakdown.
    pub fn info(&self) -> i64 {
        match *self {
            SolveStatus::Converged => 0,
            SolveStatus::IterationLimit(maxit) => maxit as i64,
            SolveStatus::Breakdown => -1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
    pub status: SolveStatus,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Effective absolute threshold for a right-hand side of norm `b_norm`.
    pub fn target(&self, b_norm: T) -> T {
        self.tol.max(self.rtol * b_norm)
    }

    /// Returns (converged, stats) given the current true residual and cycle count.
    pub fn check(&self, res_norm: T, b_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = res_norm <= self.target(b_norm);
        let status = if converged {
            SolveStatus::Converged
        } else {
            SolveStatus::IterationLimit(self.max_iters)
        };
        (
            converged,
            SolveStats {
                iterations: i,
                final_residual: res_norm,
                converged,
                status,
            },
        )
    }
}
