//! The singular operator A = I − P of a stochastic matrix.

use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};

/// Sparse A = I − P. P is not checked for stochasticity.
pub fn build_singular_system(p: &CsrMatrix) -> Result<CsrMatrix, McError> {
    let n = ensure_square(p.nrows(), p.ncols())?;
    let a = CsrMatrix::identity(n).add_scaled(p, -1.0)?;
    log::debug!("singular system built: n = {n}, nnz = {}", a.nnz());
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use crate::markov::build_transition_matrix;
    use faer::Mat;

    #[test]
    fn constant_vector_is_in_null_space() {
        let d = Mat::from_fn(4, 4, |i, j| ((i * 7 + j * 3) % 5 + 1) as f64);
        let p = build_transition_matrix(&d).unwrap();
        let a = build_singular_system(&p).unwrap();
        let mut y = vec![0.0; 4];
        a.matvec(&vec![1.0; 4], &mut y);
        assert!(y.iter().all(|v| v.abs() < 1e-14));
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 - p.get(i, j) } else { -p.get(i, j) };
                assert_eq!(a.get(i, j), expected);
            }
        }
    }

    #[test]
    fn rejects_non_square() {
        assert!(build_singular_system(&CsrMatrix::zeros(3, 2)).is_err());
    }
}
