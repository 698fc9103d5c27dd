#![allow(clippy::needless_range_loop)]
//! Loose GMRES (LGMRES): restarted GMRES augmented with outer error approximations
//! (Baker, Jessup & Manteuffel, 2005)
//!
//! Each outer cycle runs a left-preconditioned Arnoldi process on M·A starting from the
//! preconditioned residual. After `inner_m` ordinary Krylov directions the subspace is
//! augmented with the `outer_k` most recent normalized corrections `dx` from earlier
//! cycles, which carries convergence history across restarts. The products A·dx are
//! stored with the corrections, so augmentation costs no extra matrix-vector products.
//!
//! # Features
//! - Left preconditioning with any [`Preconditioner`], or none
//! - Double (iterative) modified Gram-Schmidt orthogonalization
//! - Happy breakdown detection for early termination
//! - Givens rotations for the least-squares update
//! - Convergence judged on the true residual ‖b − Ax‖₂ at every restart
//!
//! The operator may be singular. When b lies in the range of A the returned x solves
//! the consistent system, but it is not projected off the null space and need not
//! equal any particular generating vector.
//!
//! # References
//! - Baker, A. H., Jessup, E. R., Manteuffel, T. (2005). A technique for accelerating the
//!   convergence of restarted GMRES. SIAM J. Matrix Anal. Appl. 26(4).
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.4

use std::collections::VecDeque;

use crate::config::LgmresOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats, SolveStatus};

/// LGMRES solver struct with inner dimension, augmentation depth and stopping criteria.
pub struct LgmresSolver {
    /// Convergence criteria; `max_iters` counts outer cycles
    pub conv: Convergence<f64>,
    /// Krylov directions per cycle before augmentation
    pub inner_m: usize,
    /// Outer corrections retained across restarts
    pub outer_k: usize,
    /// Relative happy-breakdown tolerance
    pub haptol: f64,
    /// True residual norm at the start of every cycle, plus the final one
    pub residual_history: Vec<f64>,
}

/// Outcome of [`solve_singular_system_lgmres`].
#[derive(Clone, Debug)]
pub struct SolveInfo {
    /// 0 converged, the cycle cap when it was hit, -1 on breakdown.
    pub info: i64,
    pub converged: bool,
    pub stats: SolveStats<f64>,
}

fn axpy(y: &mut [f64], alpha: f64, x: &[f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * *xi;
    }
}

impl LgmresSolver {
    /// Create a new LGMRES solver with absolute tolerance and maximum outer cycles.
    pub fn new(tol: f64, max_iters: usize) -> Self {
        let defaults = LgmresOptions::default();
        Self {
            conv: Convergence { tol, rtol: 0.0, max_iters },
            inner_m: defaults.inner_m,
            outer_k: defaults.outer_k,
            haptol: 1e-14,
            residual_history: Vec::new(),
        }
    }

    pub fn from_options(opts: &LgmresOptions) -> Result<Self, McError> {
        opts.validate()?;
        Ok(Self::new(opts.tol, opts.maxit)
            .with_rtol(opts.rtol)
            .with_inner_m(opts.inner_m)
            .with_outer_k(opts.outer_k))
    }

    pub fn with_inner_m(mut self, inner_m: usize) -> Self {
        self.inner_m = inner_m;
        self
    }

    pub fn with_outer_k(mut self, outer_k: usize) -> Self {
        self.outer_k = outer_k;
        self
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.conv.rtol = rtol;
        self
    }

    pub fn with_haptol(mut self, haptol: f64) -> Self {
        self.haptol = haptol;
        self
    }

    // --- Apply Givens rotation and update g together ---
    /// Apply Givens rotations to Hessenberg matrix and update g vector.
    fn apply_givens_and_update_g(h: &mut [Vec<f64>], g: &mut [f64], cs: &mut [f64], sn: &mut [f64], j: usize, epsilon: f64) {
        for i in 0..j {
            let temp = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
            h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
            h[i][j] = temp;
        }
        let h_kk = h[j][j];
        let h_k1k = h[j + 1][j];
        let r = (h_kk * h_kk + h_k1k * h_k1k).sqrt();
        if r.abs() < epsilon {
            cs[j] = 1.0;
            sn[j] = 0.0;
        } else {
            cs[j] = h_kk / r;
            sn[j] = h_k1k / r;
        }
        h[j][j] = cs[j] * h_kk + sn[j] * h_k1k;
        h[j + 1][j] = 0.0;
        // Update g
        let temp = cs[j] * g[j] + sn[j] * g[j + 1];
        g[j + 1] = -sn[j] * g[j] + cs[j] * g[j + 1];
        g[j] = temp;
    }

    // --- Back-substitution for least squares with zero-pivot protection ---
    /// Solve upper-triangular system Hy = g for y, with zero-pivot protection.
    fn back_substitution(h: &[Vec<f64>], g: &[f64], y: &mut [f64], m: usize, epsilon: f64) {
        for i in (0..m).rev() {
            y[i] = g[i];
            for j in (i + 1)..m {
                y[i] -= h[i][j] * y[j];
            }
            if h[i][i].abs() > epsilon {
                y[i] /= h[i][i];
            } else {
                y[i] = 0.0;
            }
        }
    }

    fn precondition<M>(
        pc: Option<&dyn Preconditioner<M, Vec<f64>>>,
        v: &Vec<f64>,
    ) -> Result<Vec<f64>, McError> {
        match pc {
            Some(pc) => {
                let mut z = vec![0.0; v.len()];
                pc.apply(v, &mut z)?;
                Ok(z)
            }
            None => Ok(v.clone()),
        }
    }

    /// One outer cycle. Returns the correction `dx` and `A·dx`, or `None` on breakdown.
    fn cycle<M: MatVec<Vec<f64>>>(
        &self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, Vec<f64>>>,
        r: &Vec<f64>,
        inner_ratio: f64,
        outer: &VecDeque<(Vec<f64>, Vec<f64>)>,
    ) -> Result<Option<(Vec<f64>, Vec<f64>)>, McError> {
        let n = r.len();
        let ip = ();
        let epsilon = 1e-14;
        let v0 = Self::precondition(pc, r)?;
        let beta = ip.norm(&v0);
        if beta == 0.0 || !beta.is_finite() {
            return Ok(None);
        }
        let inner_tol = inner_ratio * beta;
        let m = self.inner_m + outer.len();
        let first_outer = m - outer.len();
        let mut vs: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
        vs.push(v0.iter().map(|&v| v / beta).collect());
        let mut zs: Vec<Vec<f64>> = Vec::with_capacity(m);
        let mut azs: Vec<Vec<f64>> = Vec::with_capacity(m);
        let mut h = vec![vec![0.0; m]; m + 1];
        let mut g = vec![0.0; m + 1];
        g[0] = beta;
        let mut cs = vec![0.0; m];
        let mut sn = vec![0.0; m];
        let mut k = 0;
        for j in 0..m {
            let (z, az) = if j >= first_outer {
                outer[j - first_outer].clone()
            } else {
                let z = vs[j].clone();
                let mut az = vec![0.0; n];
                a.matvec(&z, &mut az);
                (z, az)
            };
            let mut w = Self::precondition(pc, &az)?;
            let w_norm = ip.norm(&w);
            // Modified Gram-Schmidt, then a second pass for stability
            for i in 0..=j {
                h[i][j] = ip.dot(&w, &vs[i]);
                axpy(&mut w, -h[i][j], &vs[i]);
            }
            for i in 0..=j {
                let tmp = ip.dot(&w, &vs[i]);
                h[i][j] += tmp;
                axpy(&mut w, -tmp, &vs[i]);
            }
            let h_next = ip.norm(&w);
            h[j + 1][j] = h_next;
            zs.push(z);
            azs.push(az);
            k = j + 1;
            let happy = h_next <= self.haptol * w_norm;
            Self::apply_givens_and_update_g(&mut h, &mut g, &mut cs, &mut sn, j, epsilon);
            let inner_res = g[j + 1].abs();
            log::trace!("lgmres inner step {j}: preconditioned residual {inner_res:e}");
            if happy || inner_res <= inner_tol {
                break;
            }
            vs.push(w.iter().map(|&wi| wi / h_next).collect());
        }
        let mut y = vec![0.0; k];
        Self::back_substitution(&h, &g, &mut y, k, epsilon);
        let mut dx = vec![0.0; n];
        let mut adx = vec![0.0; n];
        for i in 0..k {
            axpy(&mut dx, y[i], &zs[i]);
            axpy(&mut adx, y[i], &azs[i]);
        }
        if dx.iter().any(|v| !v.is_finite()) {
            return Ok(None);
        }
        Ok(Some((dx, adx)))
    }
}

impl<M: MatVec<Vec<f64>>> LinearSolver<M, Vec<f64>> for LgmresSolver {
    type Error = McError;
    type Scalar = f64;

    /// Solve Ax = b with restarted, augmented GMRES.
    ///
    /// # Arguments
    /// * `a` - Operator implementing `MatVec`
    /// * `pc` - Optional left preconditioner
    /// * `b` - Right-hand side vector
    /// * `x` - On input: initial guess; on output: solution vector
    ///
    /// # Returns
    /// * `Ok(SolveStats)` whether or not the tolerance was reached; inspect `status`
    /// * `Err(McError)` on dimension mismatch or preconditioner failure
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, Vec<f64>>>,
        b: &Vec<f64>,
        x: &mut Vec<f64>,
    ) -> Result<SolveStats<f64>, McError> {
        let n = b.len();
        if x.len() != n {
            return Err(McError::DimensionMismatch { expected: n, found: x.len() });
        }
        if self.inner_m == 0 {
            return Err(McError::InvalidParameter("inner_m must be at least 1".into()));
        }
        let ip = ();
        let b_norm = ip.norm(b);
        let target = self.conv.target(b_norm);
        let mut outer: VecDeque<(Vec<f64>, Vec<f64>)> = VecDeque::with_capacity(self.outer_k + 1);
        let mut ax = vec![0.0; n];
        let mut r = vec![0.0; n];
        let mut cycles = 0;
        let mut res_norm;
        self.residual_history.clear();
        let status = loop {
            // True residual r = b - A x
            a.matvec(x, &mut ax);
            for ((ri, bi), axi) in r.iter_mut().zip(b).zip(&ax) {
                *ri = bi - axi;
            }
            res_norm = ip.norm(&r);
            self.residual_history.push(res_norm);
            log::trace!("lgmres cycle {cycles}: residual {res_norm:e}");
            let (done, stats) = self.conv.check(res_norm, b_norm, cycles);
            if done {
                break stats.status;
            }
            if !res_norm.is_finite() {
                break SolveStatus::Breakdown;
            }
            if cycles >= self.conv.max_iters {
                break stats.status;
            }
            cycles += 1;
            // inner iteration stops once it has gained the reduction the outer test needs
            let inner_ratio = (target / res_norm).min(1.0);
            let Some((dx, adx)) = self.cycle(a, pc, &r, inner_ratio, &outer)? else {
                break SolveStatus::Breakdown;
            };
            for (xi, dxi) in x.iter_mut().zip(&dx) {
                *xi += dxi;
            }
            let nx = ip.norm(&dx);
            if nx > 0.0 && self.outer_k > 0 {
                let scale = 1.0 / nx;
                outer.push_back((
                    dx.iter().map(|v| v * scale).collect(),
                    adx.iter().map(|v| v * scale).collect(),
                ));
                while outer.len() > self.outer_k {
                    outer.pop_front();
                }
            }
        };
        let converged = status == SolveStatus::Converged;
        match status {
            SolveStatus::Converged => {
                log::debug!("lgmres converged in {cycles} cycles, residual {res_norm:e}")
            }
            SolveStatus::IterationLimit(maxit) => {
                log::warn!("lgmres hit the cycle limit {maxit}, residual {res_norm:e}")
            }
            SolveStatus::Breakdown => {
                log::warn!("lgmres breakdown after {cycles} cycles, residual {res_norm:e}")
            }
        }
        Ok(SolveStats {
            iterations: cycles,
            final_residual: res_norm,
            converged,
            status,
        })
    }
}

/// Solve the (possibly singular) system A x = b with LGMRES from a zero initial guess,
/// using an absolute tolerance, inner dimension 30 and 3 retained outer vectors.
pub fn solve_singular_system_lgmres(
    a: &CsrMatrix,
    b: &[f64],
    m: Option<&dyn Preconditioner<CsrMatrix, Vec<f64>>>,
    tol: f64,
    maxit: usize,
) -> Result<(Vec<f64>, SolveInfo), McError> {
    let opts = LgmresOptions { tol, maxit, ..LgmresOptions::default() };
    solve_singular_system_lgmres_with(a, b, m, &opts)
}

/// [`solve_singular_system_lgmres`] with every LGMRES parameter explicit.
pub fn solve_singular_system_lgmres_with(
    a: &CsrMatrix,
    b: &[f64],
    m: Option<&dyn Preconditioner<CsrMatrix, Vec<f64>>>,
    opts: &LgmresOptions,
) -> Result<(Vec<f64>, SolveInfo), McError> {
    let n = ensure_square(a.nrows(), a.ncols())?;
    if b.len() != n {
        return Err(McError::DimensionMismatch { expected: n, found: b.len() });
    }
    let mut solver = LgmresSolver::from_options(opts)?;
    let mut x = vec![0.0; n];
    let stats = solver.solve(a, m, &b.to_vec(), &mut x)?;
    let info = SolveInfo {
        info: stats.status.info(),
        converged: stats.converged,
        stats,
    };
    Ok((x, info))
}
