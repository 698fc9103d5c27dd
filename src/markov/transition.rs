//! Row-stochastic transition matrices: normalization and validation.

use bitflags::bitflags;
use faer::Mat;

use crate::config::ZeroRowPolicy;
use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};
use crate::utils::graph::{adjacency, reachable_from, reverse};

/// Maximum allowed deviation of a row sum from one.
pub const ROW_SUM_TOL: f64 = 1e-10;

bitflags! {
    /// Properties of a transition matrix reported by [`chain_properties`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ChainFlags: u32 {
        const ROW_STOCHASTIC     = 0b001;
        const FORWARD_REACHABLE  = 0b010; // every state reachable from state 0
        const BACKWARD_REACHABLE = 0b100; // state 0 reachable from every state
        const IRREDUCIBLE        = Self::FORWARD_REACHABLE.bits() | Self::BACKWARD_REACHABLE.bits();
    }
}

/// Normalize a dense non-negative matrix into a row-stochastic CSR matrix.
///
/// Rows summing to zero are rejected with [`McError::DegenerateRow`].
pub fn build_transition_matrix(dense: &Mat<f64>) -> Result<CsrMatrix, McError> {
    build_transition_matrix_with(dense, ZeroRowPolicy::Reject)
}

/// Same as [`build_transition_matrix`] with an explicit zero-row policy.
pub fn build_transition_matrix_with(
    dense: &Mat<f64>,
    policy: ZeroRowPolicy,
) -> Result<CsrMatrix, McError> {
    let n = ensure_square(dense.nrows(), dense.ncols())?;
    if n == 0 {
        return Err(McError::EmptyMatrix);
    }
    let mut normalized = Mat::<f64>::zeros(n, n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            let v = dense[(i, j)];
            // written so that NaN also fails
            if !(v >= 0.0) {
                return Err(McError::NegativeEntry { row: i, col: j });
            }
            sum += v;
        }
        if sum > 0.0 && sum.is_finite() {
            for j in 0..n {
                normalized[(i, j)] = dense[(i, j)] / sum;
            }
        } else {
            match policy {
                ZeroRowPolicy::Reject => return Err(McError::DegenerateRow(i)),
                ZeroRowPolicy::Uniform if sum == 0.0 => {
                    log::warn!("row {i} sums to zero; replacing it with the uniform distribution");
                    for j in 0..n {
                        normalized[(i, j)] = 1.0 / n as f64;
                    }
                }
                ZeroRowPolicy::Uniform => return Err(McError::DegenerateRow(i)),
            }
        }
    }
    let p = CsrMatrix::from_dense(&normalized);
    log::debug!("transition matrix built: n = {n}, nnz = {}", p.nnz());
    Ok(p)
}

/// Check row sums and strong connectivity of the graph with edges i→j iff P[i][j] > tol.
pub fn chain_properties(p: &CsrMatrix, tol: f64) -> ChainFlags {
    let mut flags = ChainFlags::empty();
    if !p.is_square() || p.nrows() == 0 {
        return flags;
    }
    if p.row_sums().iter().all(|s| (s - 1.0).abs() <= ROW_SUM_TOL) {
        flags |= ChainFlags::ROW_STOCHASTIC;
    }
    let adj = adjacency(p, tol);
    if reachable_from(&adj, 0).iter().all(|&v| v) {
        flags |= ChainFlags::FORWARD_REACHABLE;
    }
    if reachable_from(&reverse(&adj), 0).iter().all(|&v| v) {
        flags |= ChainFlags::BACKWARD_REACHABLE;
    }
    flags
}

/// True iff every row sums to one (within 1e-10) and the transition graph is strongly connected.
pub fn is_stochastic_irreducible(p: &CsrMatrix, tol: f64) -> bool {
    chain_properties(p, tol).contains(ChainFlags::ROW_STOCHASTIC | ChainFlags::IRREDUCIBLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_normalized() {
        let d = Mat::from_fn(3, 3, |i, j| (i + j + 1) as f64);
        let p = build_transition_matrix(&d).unwrap();
        for s in p.row_sums() {
            assert!((s - 1.0).abs() < 1e-12);
        }
        // row 0 = [1,2,3] / 6
        assert!((p.get(0, 2) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn zero_row_rejected_by_default() {
        let d = Mat::from_fn(2, 2, |i, _| if i == 1 { 0.0 } else { 1.0 });
        assert!(matches!(build_transition_matrix(&d), Err(McError::DegenerateRow(1))));
    }

    #[test]
    fn zero_row_uniform_policy() {
        let d = Mat::from_fn(2, 2, |i, _| if i == 1 { 0.0 } else { 1.0 });
        let p = build_transition_matrix_with(&d, ZeroRowPolicy::Uniform).unwrap();
        assert_eq!(p.get(1, 0), 0.5);
        assert_eq!(p.get(1, 1), 0.5);
    }

    #[test]
    fn shape_and_sign_errors() {
        let rect = Mat::<f64>::zeros(2, 3);
        assert!(matches!(build_transition_matrix(&rect), Err(McError::NotSquare { .. })));
        let neg = Mat::from_fn(2, 2, |i, j| if i == 0 && j == 1 { -1.0 } else { 1.0 });
        assert!(matches!(
            build_transition_matrix(&neg),
            Err(McError::NegativeEntry { row: 0, col: 1 })
        ));
        assert!(matches!(build_transition_matrix(&Mat::<f64>::zeros(0, 0)), Err(McError::EmptyMatrix)));
    }

    #[test]
    fn irreducibility_detects_absorbing_state() {
        // state 1 is absorbing: 0 -> 1, 1 -> 1
        let d = Mat::from_fn(2, 2, |i, j| if (i, j) == (1, 0) { 0.0 } else { 1.0 });
        let p = build_transition_matrix(&d).unwrap();
        let flags = chain_properties(&p, 1e-12);
        assert!(flags.contains(ChainFlags::ROW_STOCHASTIC | ChainFlags::FORWARD_REACHABLE));
        assert!(!flags.contains(ChainFlags::BACKWARD_REACHABLE));
        assert!(!is_stochastic_irreducible(&p, 1e-12));
    }

    #[test]
    fn non_stochastic_rejected() {
        let a = CsrMatrix::from_dense(&Mat::from_fn(2, 2, |_, _| 1.0));
        assert!(!is_stochastic_irreducible(&a, 1e-12));
        let p = build_transition_matrix(&Mat::from_fn(2, 2, |_, _| 1.0)).unwrap();
        assert!(is_stochastic_irreducible(&p, 1e-12));
    }
}
