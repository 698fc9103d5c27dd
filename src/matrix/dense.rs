//! Dense input helpers on top of Faer.
//!
//! Row-major construction of `faer::Mat` inputs, plus the shape check shared by the
//! Markov builders, the solver and the SVD preconditioner.

use crate::error::McError;
use faer::Mat;

/// Build a dense matrix from row vectors; ragged rows are rejected.
pub fn dense_from_rows(rows: &[Vec<f64>]) -> Result<Mat<f64>, McError> {
    let ncols = rows.first().map_or(0, |r| r.len());
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(McError::DimensionMismatch {
            expected: ncols,
            found: bad.len(),
        });
    }
    Ok(Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

/// Fail fast with `NotSquare` unless `nrows == ncols`.
pub fn ensure_square(nrows: usize, ncols: usize) -> Result<usize, McError> {
    if nrows != ncols {
        return Err(McError::NotSquare { nrows, ncols });
    }
    Ok(nrows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            dense_from_rows(&rows),
            Err(McError::DimensionMismatch { expected: 2, found: 1 })
        ));
        let ok = dense_from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(ok[(1, 0)], 3.0);
    }

    #[test]
    fn square_check() {
        assert_eq!(ensure_square(3, 3).unwrap(), 3);
        assert!(matches!(ensure_square(2, 3), Err(McError::NotSquare { nrows: 2, ncols: 3 })));
    }
}
