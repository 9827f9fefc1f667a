use crate::dtype::DType;
use crate::matrix::{Dim2, Matrix};
use crate::net::NeuralNetwork;
use crate::util::argmax;

pub trait Scorer<F: DType> {
    fn process(&mut self, output: &[F], label: usize);
}

/// Argmax accuracy and a confusion matrix with expected classes as rows and
/// predicted classes as columns.
#[derive(Clone, Debug)]
pub struct MulticlassScorer {
    matrix: Matrix<f64>,
    count: usize,
}

impl MulticlassScorer {
    pub fn new(classes: usize) -> Self {
        MulticlassScorer {
            matrix: Matrix::new(classes, classes),
            count: 0,
        }
    }
    pub fn for_net<F: DType>(net: &NeuralNetwork<F>) -> Self {
        Self::new(net.output_size())
    }
    pub fn classes(&self) -> usize {
        self.matrix.rows()
    }
    pub fn count(&self) -> usize {
        self.count
    }
    pub fn correct(&self) -> usize {
        (0..self.classes()).map(|i| self.matrix[(i, i)] as usize).sum()
    }
    /// Number of samples of class `expected` that were predicted as `predicted`.
    pub fn confusion(&self, expected: usize, predicted: usize) -> usize {
        self.matrix[(expected, predicted)] as usize
    }
    pub fn accuracy(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.correct() as f64 / self.count as f64
    }
    pub fn error_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        1.0 - self.accuracy()
    }
    /// Confusion matrix with every row scaled to sum to one.
    pub fn normalized(&self) -> Matrix<f64> {
        let classes = self.classes();
        let mut data = self.matrix.to_vec();
        for row in data.chunks_exact_mut(classes) {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|e| *e /= total);
            }
        }
        Matrix::from_vec(data, Dim2(classes, classes))
    }
    pub fn log_report(&self) {
        let count = self.count;
        let total_incorrect = count - self.correct();
        let percent_incorrect = self.error_rate() * 100.0;
        log::info!("Confusion Matrix: {:.3?}", self.normalized());
        log::info!("Error rate: {percent_incorrect:.2}% ({total_incorrect}/{count})");
    }
}

impl<F: DType> Scorer<F> for MulticlassScorer {
    fn process(&mut self, output: &[F], label: usize) {
        // an all-NaN output counts against class 0
        let predicted = argmax(output).unwrap_or(0);
        self.count += 1;
        self.matrix[(label, predicted)] += 1.0;
    }
}

#[cfg(test)]
mod test {
    use super::{MulticlassScorer, Scorer};
    use crate::net::NeuralNetwork;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_accuracy_and_confusion() {
        let mut scorer = MulticlassScorer::new(3);
        scorer.process(&[0.9f32, 0.1, 0.0], 0);
        scorer.process(&[0.2f32, 0.7, 0.1], 1);
        scorer.process(&[0.2f32, 0.7, 0.1], 2);
        scorer.process(&[0.0f32, 0.0, 1.0], 2);
        assert_eq!(scorer.count(), 4);
        assert_eq!(scorer.correct(), 3);
        assert_eq!(scorer.confusion(2, 1), 1);
        assert_eq!(scorer.confusion(1, 2), 0);
        assert_abs_diff_eq!(scorer.accuracy(), 0.75);
        assert_abs_diff_eq!(scorer.error_rate(), 0.25);
        let normalized = scorer.normalized();
        assert_abs_diff_eq!(normalized[(2, 1)], 0.5);
        assert_abs_diff_eq!(normalized[(0, 0)], 1.0);
    }

    #[test]
    fn test_empty() {
        let scorer = MulticlassScorer::for_net(&NeuralNetwork::<f32>::new(4, 3, 2));
        assert_eq!(scorer.classes(), 2);
        assert_eq!(scorer.accuracy(), 0.0);
        assert_eq!(scorer.error_rate(), 0.0);
        assert!(scorer.normalized().iter().all(|&x| x == 0.0));
    }
}
