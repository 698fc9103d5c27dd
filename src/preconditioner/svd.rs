//! Regularized SVD pseudo-inverse preconditioner.
//!
//! The operator is converted to dense, factorized once as A = U Σ Vᵀ with faer, and
//! the pseudo-inverse A⁺ = V Σ⁺ Uᵀ is cached, where Σ⁺_i = 1/σ_i for σ_i > `reg` and
//! 0 otherwise. Dropping the small singular values keeps the null-space direction of
//! a singular A from being amplified. Construction is O(n³) time and O(n²) memory,
//! every application is a dense O(n²) product, so sizes above a configurable
//! ceiling are refused with [`McError::ResourceLimit`].

use faer::Mat;

use crate::config::SvdOptions;
use crate::core::traits::MatVec;
use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};
use crate::preconditioner::Preconditioner;

#[derive(Clone, Debug)]
pub struct SvdPreconditioner {
    pinv: Mat<f64>,
    reg: f64,
    max_dim: usize,
    rank: usize,
}

impl SvdPreconditioner {
    /// Factorize `a` with the default size ceiling.
    pub fn new(a: &CsrMatrix, reg: f64) -> Result<Self, McError> {
        Self::with_limit(a, reg, SvdOptions::default().max_dim)
    }

    pub fn from_options(a: &CsrMatrix, opts: &SvdOptions) -> Result<Self, McError> {
        Self::with_limit(a, opts.reg, opts.max_dim)
    }

    /// Factorize `a`, refusing operators larger than `max_dim`.
    pub fn with_limit(a: &CsrMatrix, reg: f64, max_dim: usize) -> Result<Self, McError> {
        if !(reg >= 0.0) {
            return Err(McError::InvalidParameter(format!(
                "regularization floor must be non-negative, got {reg}"
            )));
        }
        let (pinv, rank) = Self::factorize(a, reg, max_dim)?;
        Ok(Self { pinv, reg, max_dim, rank })
    }

    fn factorize(a: &CsrMatrix, reg: f64, max_dim: usize) -> Result<(Mat<f64>, usize), McError> {
        let n = ensure_square(a.nrows(), a.ncols())?;
        if n == 0 {
            return Err(McError::EmptyMatrix);
        }
        if n > max_dim {
            return Err(McError::ResourceLimit { n, limit: max_dim });
        }
        let dense = a.to_dense();
        let svd = dense.as_ref().svd().map_err(McError::Svd)?;
        let sigma = svd.S().column_vector();
        let s_inv: Vec<f64> = (0..n)
            .map(|k| if sigma[k] > reg { 1.0 / sigma[k] } else { 0.0 })
            .collect();
        let rank = s_inv.iter().filter(|&&s| s != 0.0).count();
        let v = svd.V();
        // V Σ⁺, then (V Σ⁺) Uᵀ
        let v_scaled = Mat::from_fn(n, n, |i, k| v[(i, k)] * s_inv[k]);
        let u_t = svd.U().transpose().to_owned();
        let pinv = &v_scaled * &u_t;
        log::debug!("svd preconditioner: n = {n}, kept {rank} of {n} singular values (reg = {reg:e})");
        Ok((pinv, rank))
    }

    /// The cached dense pseudo-inverse.
    pub fn pinv(&self) -> &Mat<f64> {
        &self.pinv
    }

    /// Number of singular values above the regularization floor.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn reg(&self) -> f64 {
        self.reg
    }

    pub fn dim(&self) -> usize {
        self.pinv.nrows()
    }

    /// A⁺ v as a new vector.
    pub fn apply_vec(&self, v: &[f64]) -> Result<Vec<f64>, McError> {
        let mut z = vec![0.0; self.dim()];
        self.apply(&v.to_vec(), &mut z)?;
        Ok(z)
    }

    /// View as a matrix-free operator for the Krylov solver.
    pub fn as_operator(&self) -> &dyn Preconditioner<CsrMatrix, Vec<f64>> {
        self
    }
}

impl Preconditioner<CsrMatrix, Vec<f64>> for SvdPreconditioner {
    fn apply(&self, r: &Vec<f64>, z: &mut Vec<f64>) -> Result<(), McError> {
        let n = self.dim();
        if r.len() != n {
            return Err(McError::DimensionMismatch { expected: n, found: r.len() });
        }
        if z.len() != n {
            return Err(McError::DimensionMismatch { expected: n, found: z.len() });
        }
        self.pinv.matvec(r, z);
        Ok(())
    }

    fn setup(&mut self, a: &CsrMatrix) -> Result<(), McError> {
        let (pinv, rank) = Self::factorize(a, self.reg, self.max_dim)?;
        self.pinv = pinv;
        self.rank = rank;
        Ok(())
    }
}
