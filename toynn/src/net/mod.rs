use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::matrix::{Dim2, Matrix};
use crate::net::initializer::{LayerKind, NetInitializer, RandomNetInitializer};
use crate::util;
use std::fmt::{Debug, Formatter};
use std::path::Path;

pub mod initializer;

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Fully connected network with one hidden layer, trained one sample at a
/// time with plain stochastic gradient descent.
///
/// Cloning yields an independent deep copy.
#[derive(Clone)]
pub struct NeuralNetwork<F: DType = f32> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    /// `hidden_size x input_size`
    weights_ih: Matrix<F>,
    /// `output_size x hidden_size`
    weights_ho: Matrix<F>,
    /// `hidden_size x 1`
    bias_h: Matrix<F>,
    /// `output_size x 1`
    bias_o: Matrix<F>,
    learning_rate: F,
    activation_fn: ActivationFn,
}

/// Column matrices retained from a forward pass.
struct Forward<F: DType> {
    hidden: Matrix<F>,
    output: Matrix<F>,
}

impl<F: DType> NeuralNetwork<F> {
    /// Creates a sigmoid network with uniform random weights and biases and
    /// the default learning rate.
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        NetBuilder::new(input_size, hidden_size, output_size).build()
    }

    /// Assembles a network from existing parameters, validating every shape
    /// against the layer sizes implied by the weight matrices.
    pub fn from_parts(
        weights_ih: Matrix<F>,
        weights_ho: Matrix<F>,
        bias_h: Matrix<F>,
        bias_o: Matrix<F>,
        learning_rate: F,
        activation_fn: ActivationFn,
    ) -> Result<Self> {
        let Dim2(hidden_size, input_size) = weights_ih.dims();
        let output_size = weights_ho.rows();
        if weights_ho.cols() != hidden_size {
            return Err(Error::mismatch("weights_ho", Dim2(output_size, hidden_size), weights_ho.dims()));
        }
        if bias_h.dims() != Dim2(hidden_size, 1) {
            return Err(Error::mismatch("bias_h", Dim2(hidden_size, 1), bias_h.dims()));
        }
        if bias_o.dims() != Dim2(output_size, 1) {
            return Err(Error::mismatch("bias_o", Dim2(output_size, 1), bias_o.dims()));
        }
        Ok(NeuralNetwork {
            input_size,
            hidden_size,
            output_size,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate,
            activation_fn,
        })
    }

    /// Feeds `input` forward and returns the output layer activations.
    pub fn predict(&self, input: &[F]) -> Result<Vec<F>> {
        let input = column("input", input, self.input_size)?;
        Ok(self.forward(&input)?.output.into_vec())
    }

    /// One gradient descent step towards `target`.
    pub fn train(&mut self, input: &[F], target: &[F]) -> Result<()> {
        self.backprop(input, target).map(drop)
    }

    /// Like [`NeuralNetwork::train`], returning the loss of the output
    /// computed before the update.
    pub fn train_with_loss(&mut self, input: &[F], target: &[F], loss: &LossFn) -> Result<F> {
        let output = self.backprop(input, target)?;
        Ok(loss.compute(output.as_slice(), target))
    }

    fn forward(&self, input: &Matrix<F>) -> Result<Forward<F>> {
        let act = self.activation_fn;

        let mut hidden = self.weights_ih.matmul(input)?;
        hidden.add_assign_matrix(&self.bias_h)?;
        hidden.map_assign(|x| act.compute(x));

        let mut output = self.weights_ho.matmul(&hidden)?;
        output.add_assign_matrix(&self.bias_o)?;
        output.map_assign(|x| act.compute(x));

        Ok(Forward { hidden, output })
    }

    /// Every gradient is computed from the pre-update weights before any
    /// parameter is modified, so a shape error leaves the network untouched.
    fn backprop(&mut self, input: &[F], target: &[F]) -> Result<Matrix<F>> {
        let act = self.activation_fn;
        let input = column("input", input, self.input_size)?;
        let target = column("target", target, self.output_size)?;
        let Forward { hidden, output } = self.forward(&input)?;

        // error = target - output
        let output_error = target.sub(&output)?;

        let mut output_gradient = output.map(|y| act.derivative(y));
        output_gradient.mul_assign_matrix(&output_error)?;
        output_gradient.mul_assign_scalar(self.learning_rate);

        let hidden_error = self.weights_ho.transpose().matmul(&output_error)?;

        let mut hidden_gradient = hidden.map(|y| act.derivative(y));
        hidden_gradient.mul_assign_matrix(&hidden_error)?;
        hidden_gradient.mul_assign_scalar(self.learning_rate);

        let weights_ho_deltas = output_gradient.matmul(&hidden.transpose())?;
        let weights_ih_deltas = hidden_gradient.matmul(&input.transpose())?;

        self.weights_ho.add_assign_matrix(&weights_ho_deltas)?;
        self.bias_o.add_assign_matrix(&output_gradient)?;
        self.weights_ih.add_assign_matrix(&weights_ih_deltas)?;
        self.bias_h.add_assign_matrix(&hidden_gradient)?;

        Ok(output)
    }

    /// Perturbs both weight matrices with [`util::mutate`]; biases are kept.
    pub fn mutate(&mut self) {
        self.mutate_with(util::mutate);
    }

    pub fn mutate_with<M>(&mut self, mut f: M)
    where
        M: FnMut(F) -> F,
    {
        self.weights_ih.map_assign(&mut f);
        self.weights_ho.map_assign(&mut f);
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::persist::save(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::persist::load(path)
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[inline]
    pub fn learning_rate(&self) -> F {
        self.learning_rate
    }

    #[inline]
    pub fn set_learning_rate(&mut self, learning_rate: F) {
        self.learning_rate = learning_rate;
    }

    #[inline]
    pub fn activation_fn(&self) -> ActivationFn {
        self.activation_fn
    }

    #[inline]
    pub fn weights_ih(&self) -> &Matrix<F> {
        &self.weights_ih
    }

    #[inline]
    pub fn weights_ho(&self) -> &Matrix<F> {
        &self.weights_ho
    }

    #[inline]
    pub fn bias_h(&self) -> &Matrix<F> {
        &self.bias_h
    }

    #[inline]
    pub fn bias_o(&self) -> &Matrix<F> {
        &self.bias_o
    }
}

fn column<F: DType>(op: &'static str, values: &[F], len: usize) -> Result<Matrix<F>> {
    if values.len() != len {
        return Err(Error::mismatch(op, Dim2(len, 1), Dim2(values.len(), 1)));
    }
    Ok(Matrix::from_col_slice(values))
}

impl<F: DType> Debug for NeuralNetwork<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralNetwork")
            .field("input_size", &self.input_size)
            .field("hidden_size", &self.hidden_size)
            .field("output_size", &self.output_size)
            .field("learning_rate", &self.learning_rate)
            .field("activation_fn", &self.activation_fn)
            .field("weights_ih", &self.weights_ih)
            .field("weights_ho", &self.weights_ho)
            .finish_non_exhaustive()
    }
}

pub struct NetBuilder<F: DType = f32> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    learning_rate: F,
    activation_fn: ActivationFn,
    initializer: Box<dyn NetInitializer<F>>,
}

impl<F: DType> NetBuilder<F> {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        NetBuilder {
            input_size,
            hidden_size,
            output_size,
            learning_rate: F::from_f64(DEFAULT_LEARNING_RATE),
            activation_fn: ActivationFn::default(),
            initializer: Box::new(RandomNetInitializer::default()),
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: F) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_activation(mut self, activation_fn: ActivationFn) -> Self {
        self.activation_fn = activation_fn;
        self
    }

    pub fn with_initializer<I>(mut self, initializer: I) -> Self
    where
        I: 'static + NetInitializer<F>,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn build(mut self) -> NeuralNetwork<F> {
        let init = self.initializer.as_mut();
        let weights_ih = init.get_weights(LayerKind::Hidden, self.input_size, self.hidden_size);
        let bias_h = init.get_biases(LayerKind::Hidden, self.hidden_size);
        let weights_ho = init.get_weights(LayerKind::Output, self.hidden_size, self.output_size);
        let bias_o = init.get_biases(LayerKind::Output, self.output_size);
        NeuralNetwork {
            input_size: self.input_size,
            hidden_size: self.hidden_size,
            output_size: self.output_size,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate: self.learning_rate,
            activation_fn: self.activation_fn,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{NetBuilder, NeuralNetwork};
    use crate::activation::ActivationFn;
    use crate::error::Error;
    use crate::loss::LossFn;
    use crate::matrix;
    use crate::matrix::{Dim2, Matrix};
    use crate::net::initializer::RandomNetInitializer;
    use approx::assert_abs_diff_eq;

    fn seeded(input: usize, hidden: usize, output: usize) -> NeuralNetwork<f64> {
        NetBuilder::new(input, hidden, output)
            .with_initializer(RandomNetInitializer::seed_from_u64(0xf1234567))
            .build()
    }

    fn identity_like() -> NeuralNetwork<f64> {
        NeuralNetwork::from_parts(
            Matrix::identity(2),
            matrix![[1.0, 0.0]],
            Matrix::new(2, 1),
            Matrix::new(1, 1),
            0.1,
            ActivationFn::Sigmoid,
        )
        .unwrap()
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    #[test]
    fn test_new_shapes() {
        let net: NeuralNetwork = NeuralNetwork::new(784, 64, 3);
        assert_eq!(net.weights_ih().dims(), Dim2(64, 784));
        assert_eq!(net.weights_ho().dims(), Dim2(3, 64));
        assert_eq!(net.bias_h().dims(), Dim2(64, 1));
        assert_eq!(net.bias_o().dims(), Dim2(3, 1));
        assert_eq!(net.learning_rate(), 0.1);
        assert_eq!(net.activation_fn(), ActivationFn::Sigmoid);
        let mut all = net.weights_ih().iter().chain(net.weights_ho()).chain(net.bias_h()).chain(net.bias_o());
        assert!(all.all(|&x| (-1.0..1.0).contains(&x)));
        assert!(net.bias_o().iter().any(|&x| x != 0.0) || net.bias_h().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_from_parts_rejects_bad_shapes() {
        let bad_ho = NeuralNetwork::<f32>::from_parts(
            Matrix::new(2, 3),
            Matrix::new(1, 3),
            Matrix::new(2, 1),
            Matrix::new(1, 1),
            0.1,
            ActivationFn::Sigmoid,
        );
        assert!(matches!(bad_ho, Err(Error::DimensionMismatch { op: "weights_ho", .. })));

        let bad_bias = NeuralNetwork::<f32>::from_parts(
            Matrix::new(2, 3),
            Matrix::new(1, 2),
            Matrix::new(3, 1),
            Matrix::new(1, 1),
            0.1,
            ActivationFn::Sigmoid,
        );
        assert!(matches!(bad_bias, Err(Error::DimensionMismatch { op: "bias_h", .. })));
    }

    #[test]
    fn test_predict_by_hand() {
        let net = identity_like();
        let out = net.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0], sigmoid(sigmoid(1.0)), epsilon = 1e-12);
        let out = net.predict(&[0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(out[0], sigmoid(0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_predict_is_pure() {
        let net = seeded(6, 4, 3);
        let before = net.clone();
        let input = [0.1, 0.9, 0.3, 0.0, 1.0, 0.5];
        let a = net.predict(&input).unwrap();
        let b = net.predict(&input).unwrap();
        assert_eq!(a.len(), 3);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
        assert_eq!(net.weights_ih(), before.weights_ih());
        assert_eq!(net.weights_ho(), before.weights_ho());
    }

    #[test]
    fn test_predict_wrong_input_len() {
        let net = seeded(4, 3, 2);
        match net.predict(&[0.5; 5]) {
            Err(Error::DimensionMismatch { op, lhs, rhs }) => {
                assert_eq!(op, "input");
                assert_eq!(lhs, Dim2(4, 1));
                assert_eq!(rhs, Dim2(5, 1));
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
        assert!(net.predict(&[]).is_err());
    }

    #[test]
    fn test_train_single_step_by_hand() {
        let mut net = identity_like();
        net.train(&[1.0, 0.0], &[1.0]).unwrap();

        let lr = 0.1;
        let h = [sigmoid(1.0), sigmoid(0.0)];
        let y = sigmoid(h[0]);
        let out_err = 1.0 - y;
        let out_grad = y * (1.0 - y) * out_err * lr;
        // hidden error from the pre-update W_ho = [1, 0]
        let hidden_err = [out_err, 0.0];
        let hidden_grad = [
            h[0] * (1.0 - h[0]) * hidden_err[0] * lr,
            h[1] * (1.0 - h[1]) * hidden_err[1] * lr,
        ];

        let expected_ho: Matrix<f64> = matrix![[1.0 + out_grad * h[0], out_grad * h[1]]];
        let expected_ih: Matrix<f64> = matrix![[1.0 + hidden_grad[0], 0.0], [hidden_grad[1], 1.0]];
        assert_abs_diff_eq!(*net.weights_ho(), expected_ho, epsilon = 1e-12);
        assert_abs_diff_eq!(*net.bias_o(), matrix![[out_grad]], epsilon = 1e-12);
        assert_abs_diff_eq!(*net.weights_ih(), expected_ih, epsilon = 1e-12);
        assert_abs_diff_eq!(*net.bias_h(), matrix![[hidden_grad[0]], [hidden_grad[1]]], epsilon = 1e-12);
    }

    #[test]
    fn test_failed_train_leaves_network_untouched() {
        let mut net = seeded(3, 4, 2);
        let before = net.clone();
        assert!(net.train(&[0.1, 0.2, 0.3], &[1.0, 0.0, 0.0]).is_err());
        assert!(net.train(&[0.1, 0.2], &[1.0, 0.0]).is_err());
        assert_eq!(net.weights_ih(), before.weights_ih());
        assert_eq!(net.weights_ho(), before.weights_ho());
        assert_eq!(net.bias_h(), before.bias_h());
        assert_eq!(net.bias_o(), before.bias_o());
    }

    #[test]
    fn test_learns_to_separate() {
        let mut net = identity_like();
        for _ in 0..5000 {
            net.train(&[1.0, 0.0], &[1.0]).unwrap();
            net.train(&[0.0, 1.0], &[0.0]).unwrap();
        }
        let a = net.predict(&[1.0, 0.0]).unwrap()[0];
        let b = net.predict(&[0.0, 1.0]).unwrap()[0];
        assert!(a > b, "{a} <= {b}");
        assert!(a > 0.9, "{a}");
        assert!(b < 0.1, "{b}");
    }

    #[test]
    fn test_loss_decreases_on_xor() {
        let mut net = NetBuilder::new(2, 4, 1)
            .with_initializer(RandomNetInitializer::seed_from_u64(0xf666))
            .with_learning_rate(0.5)
            .build();
        let samples: [([f64; 2], [f64; 1]); 4] =
            [([0., 0.], [0.]), ([0., 1.], [1.]), ([1., 0.], [1.]), ([1., 1.], [0.])];
        let epoch_loss = |net: &mut NeuralNetwork<f64>| {
            samples
                .iter()
                .map(|(x, t)| net.train_with_loss(x, t, &LossFn::MSE).unwrap())
                .sum::<f64>()
        };
        let first = epoch_loss(&mut net);
        for _ in 0..3000 {
            epoch_loss(&mut net);
        }
        let last = epoch_loss(&mut net);
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn test_tanh_network_trains() {
        let mut net = NetBuilder::new(2, 3, 2)
            .with_initializer(RandomNetInitializer::seed_from_u64(9))
            .with_activation(ActivationFn::Tanh)
            .with_learning_rate(0.05)
            .build();
        for _ in 0..2000 {
            net.train(&[1.0, 0.0], &[0.8, -0.8]).unwrap();
        }
        let out = net.predict(&[1.0, 0.0]).unwrap();
        assert_abs_diff_eq!(out[0], 0.8, epsilon = 0.05);
        assert_abs_diff_eq!(out[1], -0.8, epsilon = 0.05);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut net = seeded(2, 2, 1);
        let copy = net.clone();
        net.train(&[1.0, 0.0], &[1.0]).unwrap();
        assert_ne!(net.weights_ho(), copy.weights_ho());
    }

    #[test]
    fn test_mutate_only_touches_weights() {
        let mut net = seeded(3, 3, 2);
        let before = net.clone();
        net.mutate_with(|x| x + 1.0);
        assert_abs_diff_eq!(*net.weights_ih(), before.weights_ih().map(|x| x + 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(*net.weights_ho(), before.weights_ho().map(|x| x + 1.0), epsilon = 1e-12);
        assert_eq!(net.bias_h(), before.bias_h());
        assert_eq!(net.bias_o(), before.bias_o());

        net.mutate();
        let moved = net
            .weights_ih()
            .iter()
            .zip(before.weights_ih().iter())
            .all(|(a, b)| (a - (b + 1.0)).abs() <= 0.1 + 1e-12);
        assert!(moved);
    }
}
