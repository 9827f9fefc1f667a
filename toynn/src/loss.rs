use crate::dtype::DType;
use std::iter::zip;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LossFn {
    #[default]
    MSE,
}

impl LossFn {
    pub fn compute<F: DType>(&self, output: &[F], expected: &[F]) -> F {
        debug_assert_eq!(output.len(), expected.len());
        match self {
            LossFn::MSE => {
                let sum = zip(output, expected).fold(F::ZERO, |acc, (&o, &e)| acc + (o - e) * (o - e));
                sum / F::from_usize(output.len())
            }
        }
    }
}
