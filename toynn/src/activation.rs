use crate::dtype::DType;

/// Activation function bound to a network for its lifetime.
///
/// `derivative` takes the already activated output `y = compute(x)`, not the
/// pre-activation input, so the backward pass can reuse forward outputs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ActivationFn {
    #[default]
    Sigmoid,
    Tanh,
}

impl ActivationFn {
    #[inline]
    pub fn compute<F: DType>(&self, x: F) -> F {
        match self {
            ActivationFn::Sigmoid => F::ONE / (F::ONE + (-x).exp()),
            ActivationFn::Tanh => x.tanh(),
        }
    }

    #[inline]
    pub fn derivative<F: DType>(&self, y: F) -> F {
        match self {
            ActivationFn::Sigmoid => y * (F::ONE - y),
            ActivationFn::Tanh => F::ONE - y * y,
        }
    }
}
