//! Residual and error norms used to validate solver output.

use crate::core::traits::MatVec;
use crate::error::McError;
use crate::matrix::CsrMatrix;

/// Vector norm selector for [`residual_norm`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NormOrd {
    L1,
    #[default]
    L2,
    Max,
}

pub fn vector_norm(v: &[f64], ord: NormOrd) -> f64 {
    match ord {
        NormOrd::L1 => v.iter().map(|x| x.abs()).sum(),
        NormOrd::L2 => v.iter().map(|x| x * x).sum::<f64>().sqrt(),
        NormOrd::Max => v.iter().fold(0.0, |m, x| m.max(x.abs())),
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), McError> {
    if expected != found {
        return Err(McError::DimensionMismatch { expected, found });
    }
    Ok(())
}

/// ‖A x − b‖ under `ord`.
pub fn residual_norm(a: &CsrMatrix, x: &[f64], b: &[f64], ord: NormOrd) -> Result<f64, McError> {
    check_len(a.ncols(), x.len())?;
    check_len(a.nrows(), b.len())?;
    let mut r = vec![0.0; a.nrows()];
    a.matvec(&x.to_vec(), &mut r);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri -= bi;
    }
    Ok(vector_norm(&r, ord))
}

/// ‖x − y‖₁
pub fn l1_error(x: &[f64], y: &[f64]) -> Result<f64, McError> {
    check_len(x.len(), y.len())?;
    Ok(x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum())
}

/// ‖x − y‖₂
pub fn l2_error(x: &[f64], y: &[f64]) -> Result<f64, McError> {
    check_len(x.len(), y.len())?;
    Ok(x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_error() {
        let v = vec![0.3, -1.5, 1e300, 7.0];
        assert_eq!(l1_error(&v, &v).unwrap(), 0.0);
        assert_eq!(l2_error(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn norms_of_known_vector() {
        let v = [3.0, -4.0];
        assert_eq!(vector_norm(&v, NormOrd::L1), 7.0);
        assert_eq!(vector_norm(&v, NormOrd::L2), 5.0);
        assert_eq!(vector_norm(&v, NormOrd::Max), 4.0);
        assert_eq!(NormOrd::default(), NormOrd::L2);
    }

    #[test]
    fn residual_of_identity() {
        let a = CsrMatrix::identity(2);
        let r = residual_norm(&a, &[1.0, 2.0], &[1.0, 0.0], NormOrd::L2).unwrap();
        assert_eq!(r, 2.0);
        assert!(residual_norm(&a, &[1.0], &[1.0, 0.0], NormOrd::L1).is_err());
        assert!(l1_error(&[1.0], &[1.0, 2.0]).is_err());
    }
}
