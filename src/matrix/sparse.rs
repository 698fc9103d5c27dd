// SparseMatrix trait and the CSR matrix used throughout the Markov pipeline

/// A read‐only sparse matrix supporting y = A * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
}

use crate::core::traits::{MatTransVec, MatVec};
use crate::error::McError;
use faer::Mat;
use faer::sparse::{
    SymbolicSparseRowMat, // owning symbolic CSR alias
    SparseRowMat,         // owning numeric CSR alias
};

/// Compressed sparse row matrix of `f64` backed by faer's `SparseRowMat`.
///
/// Column indices inside each row are kept sorted and unique; every constructor
/// in this module upholds that, which is what `new_checked` asks for.
#[derive(Clone, Debug)]
pub struct CsrMatrix {
    inner: SparseRowMat<usize, f64>,
}

impl CsrMatrix {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        // Build symbolic structure; second argument `None` means “no separate row_nnz”:
        let symbolic = SymbolicSparseRowMat::new_checked(
            nrows,
            ncols,
            row_ptr,
            None, // optional row_nnz: Option<Vec<usize>>
            col_idx,
        );
        // Attach the numerical values:
        let inner = SparseRowMat::new(symbolic, values);
        Self { inner }
    }

    /// Convert a dense matrix, dropping exact zeros.
    pub fn from_dense(dense: &Mat<f64>) -> Self {
        let (nrows, ncols) = (dense.nrows(), dense.ncols());
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..nrows {
            for j in 0..ncols {
                let v = dense[(i, j)];
                if v != 0.0 {
                    col_idx.push(j);
                    values.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    /// The n×n identity.
    pub fn identity(n: usize) -> Self {
        Self::from_csr(n, n, (0..=n).collect(), (0..n).collect(), vec![1.0; n])
    }

    /// An all-zero matrix with no stored entries.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_csr(nrows, ncols, vec![0; nrows + 1], Vec::new(), Vec::new())
    }

    fn parts(&self) -> (&[usize], &[usize], &[f64]) {
        let symbolic = self.inner.symbolic();
        (symbolic.row_ptr(), symbolic.col_idx(), self.inner.val())
    }

    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.parts().1.len()
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let (row_ptr, col_idx, values) = self.parts();
        let range = row_ptr[i]..row_ptr[i + 1];
        (&col_idx[range.clone()], &values[range])
    }

    /// Entry (i, j), zero when not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (cols, vals) = self.row(i);
        match cols.binary_search(&j) {
            Ok(k) => vals[k],
            Err(_) => 0.0,
        }
    }

    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.nrows()).map(|i| self.row(i).1.iter().sum()).collect()
    }

    pub fn to_dense(&self) -> Mat<f64> {
        let (row_ptr, col_idx, values) = self.parts();
        let mut dense = Mat::<f64>::zeros(self.nrows(), self.ncols());
        for i in 0..self.nrows() {
            for k in row_ptr[i]..row_ptr[i + 1] {
                dense[(i, col_idx[k])] = values[k];
            }
        }
        dense
    }

    /// Exact transpose; rows of the result come out with sorted column indices.
    pub fn transpose(&self) -> Self {
        let (nrows, ncols) = (self.nrows(), self.ncols());
        let (row_ptr, col_idx, values) = self.parts();
        let mut t_ptr = vec![0usize; ncols + 1];
        for &j in col_idx {
            t_ptr[j + 1] += 1;
        }
        for j in 0..ncols {
            t_ptr[j + 1] += t_ptr[j];
        }
        let mut next = t_ptr.clone();
        let mut t_idx = vec![0usize; col_idx.len()];
        let mut t_val = vec![0.0; col_idx.len()];
        for i in 0..nrows {
            for k in row_ptr[i]..row_ptr[i + 1] {
                let j = col_idx[k];
                let dst = next[j];
                t_idx[dst] = i;
                t_val[dst] = values[k];
                next[j] += 1;
            }
        }
        Self::from_csr(ncols, nrows, t_ptr, t_idx, t_val)
    }

    /// Sparse product `self * other` (Gustavson, one dense accumulator row).
    ///
    /// Entries are accumulated in row order of `self` and then `other`, so the
    /// result is reproducible bit-for-bit for identical inputs.
    pub fn matmul(&self, other: &CsrMatrix) -> Result<CsrMatrix, McError> {
        if self.ncols() != other.nrows() {
            return Err(McError::DimensionMismatch {
                expected: self.ncols(),
                found: other.nrows(),
            });
        }
        let (nrows, ncols) = (self.nrows(), other.ncols());
        let mut acc = vec![0.0; ncols];
        let mut marker = vec![usize::MAX; ncols];
        let mut touched: Vec<usize> = Vec::new();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..nrows {
            touched.clear();
            let (a_cols, a_vals) = self.row(i);
            for (&k, &a_ik) in a_cols.iter().zip(a_vals) {
                let (b_cols, b_vals) = other.row(k);
                for (&j, &b_kj) in b_cols.iter().zip(b_vals) {
                    if marker[j] != i {
                        marker[j] = i;
                        acc[j] = 0.0;
                        touched.push(j);
                    }
                    acc[j] += a_ik * b_kj;
                }
            }
            touched.sort_unstable();
            for &j in &touched {
                if acc[j] != 0.0 {
                    col_idx.push(j);
                    values.push(acc[j]);
                }
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self::from_csr(nrows, ncols, row_ptr, col_idx, values))
    }

    /// `self + alpha * other`, pruning entries that cancel to exactly zero.
    pub fn add_scaled(&self, other: &CsrMatrix, alpha: f64) -> Result<CsrMatrix, McError> {
        if self.nrows() != other.nrows() {
            return Err(McError::DimensionMismatch {
                expected: self.nrows(),
                found: other.nrows(),
            });
        }
        if self.ncols() != other.ncols() {
            return Err(McError::DimensionMismatch {
                expected: self.ncols(),
                found: other.ncols(),
            });
        }
        let nrows = self.nrows();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(self.nnz() + other.nnz());
        let mut values = Vec::with_capacity(self.nnz() + other.nnz());
        row_ptr.push(0);
        let push = |j: usize, v: f64, col_idx: &mut Vec<usize>, values: &mut Vec<f64>| {
            if v != 0.0 {
                col_idx.push(j);
                values.push(v);
            }
        };
        for i in 0..nrows {
            let (a_cols, a_vals) = self.row(i);
            let (b_cols, b_vals) = other.row(i);
            let (mut p, mut q) = (0, 0);
            while p < a_cols.len() || q < b_cols.len() {
                if q == b_cols.len() || (p < a_cols.len() && a_cols[p] < b_cols[q]) {
                    push(a_cols[p], a_vals[p], &mut col_idx, &mut values);
                    p += 1;
                } else if p == a_cols.len() || b_cols[q] < a_cols[p] {
                    push(b_cols[q], alpha * b_vals[q], &mut col_idx, &mut values);
                    q += 1;
                } else {
                    push(a_cols[p], a_vals[p] + alpha * b_vals[q], &mut col_idx, &mut values);
                    p += 1;
                    q += 1;
                }
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self::from_csr(nrows, self.ncols(), row_ptr, col_idx, values))
    }

    /// Serial y = A x over the CSR rows.
    pub fn spmv_serial(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        let (row_ptr, col_idx, values) = self.parts();
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = 0.0;
            for k in row_ptr[i]..row_ptr[i + 1] {
                sum += values[k] * x[col_idx[k]];
            }
            *yi = sum;
        }
    }

    /// y = Aᵀ x by scattering each row of A.
    pub fn spmv_transpose(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.nrows());
        assert_eq!(y.len(), self.ncols());
        let (row_ptr, col_idx, values) = self.parts();
        y.iter_mut().for_each(|v| *v = 0.0);
        for (i, &xi) in x.iter().enumerate() {
            for k in row_ptr[i]..row_ptr[i + 1] {
                y[col_idx[k]] += values[k] * xi;
            }
        }
    }
}

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "rayon")]
impl CsrMatrix {
    /// Parallel SpMV using Rayon, one task per row.
    pub fn spmv_parallel(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        let (row_ptr, col_idx, values) = self.parts();
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            let mut sum = 0.0;
            for k in row_ptr[i]..row_ptr[i + 1] {
                sum += values[k] * x[col_idx[k]];
            }
            *yi = sum;
        });
    }
}

impl SparseMatrix<f64> for CsrMatrix {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
    fn spmv(&self, x: &[f64], y: &mut [f64]) {
        #[cfg(feature = "rayon")]
        {
            self.spmv_parallel(x, y)
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.spmv_serial(x, y)
        }
    }
}

impl MatVec<Vec<f64>> for CsrMatrix {
    fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
        SparseMatrix::spmv(self, x, y);
    }
}

impl MatTransVec<Vec<f64>> for CsrMatrix {
    fn mattransvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
        self.spmv_transpose(x, y);
    }
}

/// Structural and bitwise equality: same shape, same pattern, identical values.
impl PartialEq for CsrMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.nrows() == other.nrows() && self.ncols() == other.ncols() && self.parts() == other.parts()
    }
}
