use super::Matrix;
use crate::dtype::DType;
use approx::{AbsDiffEq, RelativeEq};
use std::iter::zip;

impl<F> AbsDiffEq for Matrix<F>
where
    F: DType + AbsDiffEq<Epsilon = F>,
{
    type Epsilon = F;
    fn default_epsilon() -> Self::Epsilon {
        F::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dims() == other.dims()
            && zip(self.as_slice(), other.as_slice()).all(|(a, b)| F::abs_diff_eq(a, b, epsilon))
    }
}

impl<F> RelativeEq for Matrix<F>
where
    F: DType + RelativeEq<Epsilon = F>,
{
    fn default_max_relative() -> Self::Epsilon {
        F::default_max_relative()
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.dims() == other.dims()
            && zip(self.as_slice(), other.as_slice())
                .all(|(a, b)| F::relative_eq(a, b, epsilon, max_relative))
    }
}
