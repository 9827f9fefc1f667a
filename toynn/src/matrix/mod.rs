mod dims;
mod debug;
mod ops;
mod serialize;
#[cfg(any(test, feature = "approx"))]
mod approx;

use crate::dtype::DType;
use crate::error::{Error, Result};
use rand::Rng;
use std::ops::{Index, IndexMut};
use std::slice::{ChunksExact, Iter};

pub use dims::Dim2;

/// Dense row-major matrix of `F` values.
///
/// Both dimensions are at least one and fixed for the lifetime of the value;
/// operations that change the shape (e.g. [`Matrix::transpose`]) allocate a
/// new matrix.
#[derive(Clone, PartialEq)]
pub struct Matrix<F: DType = f32> {
    data: Vec<F>,
    dims: Dim2,
}

impl<F: DType> Matrix<F> {
    /// Creates a `rows x cols` matrix filled with zeros.
    #[inline]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::zeroed(Dim2(rows, cols))
    }

    pub fn zeroed(dims: Dim2) -> Self {
        Self::filled(F::ZERO, dims)
    }

    pub fn filled(value: F, dims: Dim2) -> Self {
        assert_valid_dims(dims);
        Matrix {
            data: vec![value; dims.len()],
            dims,
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::new(size, size);
        for i in 0..size {
            m[(i, i)] = F::ONE;
        }
        m
    }

    pub fn from_vec(data: Vec<F>, dims: Dim2) -> Self {
        assert_valid_dims(dims);
        assert_eq!(data.len(), dims.len(), "data length does not match dims {dims}");
        Matrix { data, dims }
    }

    /// Builds a column matrix (`values.len() x 1`).
    pub fn from_col_vec(values: Vec<F>) -> Self {
        let rows = values.len();
        Self::from_vec(values, Dim2(rows, 1))
    }

    #[inline]
    pub fn from_col_slice(values: &[F]) -> Self {
        Self::from_col_vec(values.to_vec())
    }

    pub fn from_vec_2d<const N: usize>(rows: Vec<[F; N]>) -> Self {
        let dims = Dim2(rows.len(), N);
        Self::from_vec(rows.into_iter().flatten().collect(), dims)
    }

    /// Builds a matrix from nested rows, failing if the rows are empty or ragged.
    pub fn from_rows(rows: Vec<Vec<F>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(Error::InvalidModel("matrix must have at least one row and one column".into()));
        }
        let dims = Dim2(rows.len(), cols);
        let mut data = Vec::with_capacity(dims.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidModel(format!(
                    "row {i} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Matrix { data, dims })
    }

    /// Sets every entry to an independent uniform sample from `[-1, 1)`.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for x in self.data.iter_mut() {
            *x = rng.gen_range(-F::ONE..F::ONE);
        }
    }

    #[inline]
    pub fn dims(&self) -> Dim2 {
        self.dims
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims.cols()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<F> {
        if row < self.rows() && col < self.cols() {
            Some(self.data[row * self.cols() + col])
        } else {
            None
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [F] {
        &mut self.data
    }

    /// Entries in row-major order.
    #[inline]
    pub fn to_vec(&self) -> Vec<F> {
        self.data.clone()
    }

    #[inline]
    pub fn into_vec(self) -> Vec<F> {
        self.data
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, F> {
        self.data.iter()
    }

    #[inline]
    pub fn iter_rows(&self) -> ChunksExact<'_, F> {
        self.data.chunks_exact(self.cols())
    }
}

#[inline]
fn assert_valid_dims(dims: Dim2) {
    assert!(dims.rows() > 0 && dims.cols() > 0, "Invalid matrix dims {dims}");
}

impl<F: DType> Index<(usize, usize)> for Matrix<F> {
    type Output = F;
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows() && col < self.cols(), "index ({row}, {col}) out of bounds for {}", self.dims);
        &self.data[row * self.cols() + col]
    }
}

impl<F: DType> IndexMut<(usize, usize)> for Matrix<F> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.rows() && col < self.cols(), "index ({row}, {col}) out of bounds for {}", self.dims);
        let cols = self.cols();
        &mut self.data[row * cols + col]
    }
}

impl<'a, F: DType> IntoIterator for &'a Matrix<F> {
    type Item = &'a F;
    type IntoIter = Iter<'a, F>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[macro_export]
macro_rules! matrix {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {
        $crate::matrix::Matrix::from_vec_2d(vec![$([$($x,)*],)*])
    };
}

#[cfg(test)]
mod test {
    use super::{Dim2, Matrix};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_is_zeroed() {
        let m: Matrix = Matrix::new(2, 3);
        assert_eq!(m.dims(), Dim2(2, 3));
        assert!(m.iter().all(|&x| x == 0.0));
    }

    #[test]
    #[should_panic]
    fn test_zero_rows() {
        let _: Matrix = Matrix::new(0, 3);
    }

    #[test]
    #[should_panic]
    fn test_zero_cols() {
        let _: Matrix<f64> = Matrix::new(4, 0);
    }

    #[test]
    fn test_macro_layout() {
        let m: Matrix = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(m.dims(), Dim2(2, 3));
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.get(1, 3), None);
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_col_vec() {
        let m: Matrix = Matrix::from_col_vec(vec![0.25, 0.5, 0.75]);
        assert_eq!(m.dims(), Dim2(3, 1));
        assert_eq!(m[(2, 0)], 0.75);
        assert_eq!(m.into_vec(), vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_from_rows() {
        let m: Matrix = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m, matrix![[1.0, 2.0], [3.0, 4.0]]);
        assert!(Matrix::<f32>::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::<f32>::from_rows(vec![]).is_err());
        assert!(Matrix::<f32>::from_rows(vec![vec![]]).is_err());
    }

    #[test]
    fn test_identity() {
        let m: Matrix<f64> = Matrix::identity(3);
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(m[(r, c)], if r == c { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_randomize_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut m: Matrix = Matrix::new(20, 30);
        m.randomize_with(&mut rng);
        assert!(m.iter().all(|&x| (-1.0..1.0).contains(&x)));
        // all zero after randomizing 600 entries would be a broken rng
        assert!(m.iter().any(|&x| x != 0.0));
        assert!(m.iter().any(|&x| x < 0.0));
    }

    #[test]
    fn test_iter_rows() {
        let m: Matrix = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let rows: Vec<&[f32]> = m.iter_rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..], &[5.0, 6.0][..]]);
    }
}
