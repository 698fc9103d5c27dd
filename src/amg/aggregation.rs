//! One level of random-aggregation coarsening.
//!
//! Every fine index is assigned independently and uniformly to one of
//! `m = max(1, floor(n * ratio))` aggregates drawn from the injected random source.
//! The prolongation has one entry per row, `P(i, agg(i)) = 1 / |agg(i)|`, the
//! restriction is its exact transpose, and the coarse operator is the Galerkin
//! product `(R · A) · P`. No strength-of-connection information is used.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};

/// Random aggregation with an explicit random source.
#[derive(Clone, Debug)]
pub struct AggregationCoarsener<R> {
    rng: R,
    ratio: f64,
}

impl AggregationCoarsener<StdRng> {
    /// Reproducible coarsener backed by `StdRng::seed_from_u64(seed)`.
    pub fn seeded(ratio: f64, seed: u64) -> Result<Self, McError> {
        Self::new(ratio, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AggregationCoarsener<R> {
    pub fn new(ratio: f64, rng: R) -> Result<Self, McError> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(McError::InvalidParameter(format!(
                "coarsening ratio must lie in (0, 1], got {ratio}"
            )));
        }
        Ok(Self { rng, ratio })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Number of aggregates for `n` fine indices.
    pub fn coarse_size(&self, n: usize) -> usize {
        ((n as f64 * self.ratio).floor() as usize).max(1)
    }

    /// Draw the aggregate of each fine index.
    pub fn assign(&mut self, n: usize) -> Vec<usize> {
        let m = self.coarse_size(n);
        (0..n).map(|_| self.rng.gen_range(0..m)).collect()
    }

    /// Coarsen `a`, returning `(A_c, P_op, R_op)`.
    pub fn coarsen(&mut self, a: &CsrMatrix) -> Result<(CsrMatrix, CsrMatrix, CsrMatrix), McError> {
        let n = ensure_square(a.nrows(), a.ncols())?;
        if n == 0 {
            return Err(McError::EmptyMatrix);
        }
        let m = self.coarse_size(n);
        let groups = self.assign(n);
        let p_op = prolongation(&groups, m);
        let r_op = p_op.transpose();
        let a_c = r_op.matmul(a)?.matmul(&p_op)?;
        log::debug!("coarsened {n} -> {m}: nnz {} -> {}", a.nnz(), a_c.nnz());
        Ok((a_c, p_op, r_op))
    }
}

/// Piecewise-constant prolongation for the assignment `groups` into `m` aggregates.
///
/// An empty aggregate keeps an inverse count of one; its column simply has no entries.
pub fn prolongation(groups: &[usize], m: usize) -> CsrMatrix {
    let n = groups.len();
    let mut counts = vec![0usize; m];
    for &g in groups {
        counts[g] += 1;
    }
    let inv_counts: Vec<f64> = counts
        .iter()
        .map(|&c| if c > 0 { 1.0 / c as f64 } else { 1.0 })
        .collect();
    let values = groups.iter().map(|&g| inv_counts[g]).collect();
    CsrMatrix::from_csr(n, m, (0..=n).collect(), groups.to_vec(), values)
}
