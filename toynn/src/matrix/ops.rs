use super::{Dim2, Matrix};
use crate::dtype::DType;
use crate::error::{Error, Result};
use std::iter::zip;

impl<F: DType> Matrix<F> {
    pub fn transpose(&self) -> Matrix<F> {
        let Dim2(rows, cols) = self.dims;
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..cols {
            for r in 0..rows {
                data.push(self.data[r * cols + c]);
            }
        }
        Matrix {
            data,
            dims: self.dims.transposed(),
        }
    }

    /// Matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix<F>) -> Result<Matrix<F>> {
        let Dim2(m, k) = self.dims;
        let Dim2(rhs_rows, n) = rhs.dims;
        if k != rhs_rows {
            return Err(Error::mismatch("matmul", self.dims, rhs.dims));
        }
        let mut data = vec![F::ZERO; m * n];
        for (a_row, c_row) in zip(self.data.chunks_exact(k), data.chunks_exact_mut(n)) {
            for (&a, b_row) in zip(a_row, rhs.data.chunks_exact(n)) {
                for (c, &b) in zip(c_row.iter_mut(), b_row) {
                    *c += a * b;
                }
            }
        }
        Ok(Matrix {
            data,
            dims: Dim2(m, n),
        })
    }

    /// Elementwise `self - rhs`.
    pub fn sub(&self, rhs: &Matrix<F>) -> Result<Matrix<F>> {
        self.check_same_dims("sub", rhs)?;
        let data = zip(&self.data, &rhs.data).map(|(&a, &b)| a - b).collect();
        Ok(Matrix {
            data,
            dims: self.dims,
        })
    }

    pub fn add_assign_matrix(&mut self, rhs: &Matrix<F>) -> Result<()> {
        self.check_same_dims("add", rhs)?;
        for (a, &b) in zip(self.data.iter_mut(), &rhs.data) {
            *a += b;
        }
        Ok(())
    }

    pub fn add_assign_scalar(&mut self, value: F) {
        for a in self.data.iter_mut() {
            *a += value;
        }
    }

    /// Elementwise (Hadamard) product, not the matrix product.
    pub fn mul_assign_matrix(&mut self, rhs: &Matrix<F>) -> Result<()> {
        self.check_same_dims("hadamard", rhs)?;
        for (a, &b) in zip(self.data.iter_mut(), &rhs.data) {
            *a *= b;
        }
        Ok(())
    }

    pub fn mul_assign_scalar(&mut self, value: F) {
        for a in self.data.iter_mut() {
            *a *= value;
        }
    }

    pub fn map_assign<M>(&mut self, mut f: M)
    where
        M: FnMut(F) -> F,
    {
        for a in self.data.iter_mut() {
            *a = f(*a);
        }
    }

    pub fn map<M>(&self, f: M) -> Matrix<F>
    where
        M: FnMut(F) -> F,
    {
        Matrix {
            data: self.data.iter().copied().map(f).collect(),
            dims: self.dims,
        }
    }

    #[inline]
    fn check_same_dims(&self, op: &'static str, rhs: &Matrix<F>) -> Result<()> {
        if self.dims == rhs.dims {
            Ok(())
        } else {
            Err(Error::mismatch(op, self.dims, rhs.dims))
        }
    }
}
