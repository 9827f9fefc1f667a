use crate::dtype::DType;
use crate::matrix::{Dim2, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Which parameter block of a layer is being initialized.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LayerKind {
    Hidden,
    Output,
}

pub trait NetInitializer<F: DType> {
    fn get_weights(&mut self, layer: LayerKind, input_size: usize, output_size: usize) -> Matrix<F>;
    fn get_biases(&mut self, layer: LayerKind, size: usize) -> Matrix<F>;
}

/// Uniform `[-1, 1)` weights and biases.
pub struct RandomNetInitializer {
    rng: StdRng,
}

impl RandomNetInitializer {
    pub fn seed_from_u64(seed: u64) -> Self {
        RandomNetInitializer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomNetInitializer {
    fn default() -> Self {
        RandomNetInitializer {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<F: DType> NetInitializer<F> for RandomNetInitializer {
    fn get_weights(&mut self, _layer: LayerKind, input_size: usize, output_size: usize) -> Matrix<F> {
        let mut m = Matrix::new(output_size, input_size);
        m.randomize_with(&mut self.rng);
        m
    }

    fn get_biases(&mut self, _layer: LayerKind, size: usize) -> Matrix<F> {
        let mut m = Matrix::new(size, 1);
        m.randomize_with(&mut self.rng);
        m
    }
}

/// Glorot normal weights with zero biases.
pub struct GaussianNetInitializer {
    rng: StdRng,
}

impl GaussianNetInitializer {
    pub fn seed_from_u64(seed: u64) -> Self {
        GaussianNetInitializer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for GaussianNetInitializer {
    fn default() -> Self {
        GaussianNetInitializer {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<F: DType> NetInitializer<F> for GaussianNetInitializer {
    fn get_weights(&mut self, _layer: LayerKind, input_size: usize, output_size: usize) -> Matrix<F> {
        let std = (2.0 / (input_size + output_size) as f64).sqrt();
        let data: Vec<F> = (&mut self.rng)
            .sample_iter(StandardNormal)
            .take(output_size * input_size)
            .map(|z: f64| F::from_f64(z * std))
            .collect();
        Matrix::from_vec(data, Dim2(output_size, input_size))
    }

    fn get_biases(&mut self, _layer: LayerKind, size: usize) -> Matrix<F> {
        Matrix::new(size, 1)
    }
}
