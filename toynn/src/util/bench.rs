use crate::dtype::DType;
use crate::matrix::Matrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const SIZE_LG: usize = 256;
pub const SIZE_MD: usize = 128;
pub const SIZE_SM: usize = 32;
const SEED: u64 = 0x8371943;

pub fn get_square_matrices<F: DType>(size: usize) -> [Matrix<F>; 2] {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut a = Matrix::new(size, size);
    let mut b = Matrix::new(size, size);
    a.randomize_with(&mut rng);
    b.randomize_with(&mut rng);
    [a, b]
}

/// A `hidden x input` weight matrix and an `input x 1` sample, the shape of
/// the first layer's forward product.
pub fn get_layer_operands<F: DType>(input: usize, hidden: usize) -> [Matrix<F>; 2] {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut w = Matrix::new(hidden, input);
    let mut x = Matrix::new(input, 1);
    w.randomize_with(&mut rng);
    x.randomize_with(&mut rng);
    [w, x]
}
