//! A [`NeuralNetwork`] shared between a training thread and its readers.
//!
//! Only one epoch can run at a time. While it runs the classifier is in
//! [`ClassifierState::Training`] and every other operation fails fast with
//! [`Error::Busy`] instead of blocking on the network. Epochs are cancelled
//! between samples through a [`StopHandle`].

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::matrix::Dim2;
use crate::net::NeuralNetwork;
use crate::scoring::{MulticlassScorer, Scorer};
use crate::util;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ClassifierState {
    #[default]
    Idle,
    Training,
}

/// A cloneable flag asking a running epoch to end at the next sample boundary.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    state: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.state.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.state.store(false, Ordering::Relaxed);
    }

    /// True if [`StopHandle::stop`] has been called since the last reset.
    pub fn should_stop(&self) -> bool {
        self.state.load(Ordering::Relaxed)
    }
}

/// One labelled input.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<F: DType = f32> {
    pub input: Vec<F>,
    pub label: usize,
}

impl<F: DType> Sample<F> {
    pub fn new(input: Vec<F>, label: usize) -> Self {
        Sample { input, label }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EpochSummary<F: DType = f32> {
    /// Samples the network was trained on.
    pub trained: usize,
    /// Samples in the epoch.
    pub total: usize,
    /// Mean squared error over the trained samples, zero if none were.
    pub mean_loss: F,
    /// Whether the epoch ended early on a stop request.
    pub stopped: bool,
}

/// Puts the state back to idle however the epoch ends, unwinding included.
struct TrainingGuard<'a> {
    state: &'a Mutex<ClassifierState>,
}

impl<'a> TrainingGuard<'a> {
    fn enter(state: &'a Mutex<ClassifierState>) -> Result<Self> {
        let mut current = lock(state);
        if *current == ClassifierState::Training {
            return Err(Error::Busy);
        }
        *current = ClassifierState::Training;
        Ok(TrainingGuard { state })
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = ClassifierState::Idle;
    }
}

// Poisoning is ignored: a training step applies its updates only after every
// delta is computed, so the network is consistent between samples.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Classifier<F: DType = f32> {
    state: Mutex<ClassifierState>,
    net: Mutex<NeuralNetwork<F>>,
    rng: Mutex<StdRng>,
}

impl<F: DType> Classifier<F> {
    pub fn new(net: NeuralNetwork<F>) -> Self {
        Classifier {
            state: Mutex::new(ClassifierState::Idle),
            net: Mutex::new(net),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixes the seed used to shuffle each epoch.
    pub fn with_seed(self, seed: u64) -> Self {
        Classifier {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn state(&self) -> ClassifierState {
        *lock(&self.state)
    }

    /// Runs `f` on the network while holding the state lock, so no epoch can
    /// start until it returns.
    fn with_idle<R>(&self, f: impl FnOnce(&mut NeuralNetwork<F>) -> Result<R>) -> Result<R> {
        let state = lock(&self.state);
        if *state == ClassifierState::Training {
            return Err(Error::Busy);
        }
        let mut net = lock(&self.net);
        f(&mut net)
    }

    fn check_samples(net: &NeuralNetwork<F>, samples: &[Sample<F>]) -> Result<()> {
        let classes = net.output_size();
        for sample in samples {
            if sample.label >= classes {
                return Err(Error::InvalidLabel {
                    label: sample.label,
                    classes,
                });
            }
            if sample.input.len() != net.input_size() {
                return Err(Error::mismatch(
                    "input",
                    Dim2(net.input_size(), 1),
                    Dim2(sample.input.len(), 1),
                ));
            }
        }
        Ok(())
    }

    /// Trains on every sample once, in random order, unless `stop` is
    /// triggered first. Samples are validated before any weight changes.
    pub fn train_epoch(&self, samples: &[Sample<F>], stop: &StopHandle) -> Result<EpochSummary<F>> {
        let _guard = TrainingGuard::enter(&self.state)?;
        let mut net = lock(&self.net);
        Self::check_samples(&net, samples)?;

        let indices: Vec<usize> = (0..samples.len()).collect();
        let order = util::shuffle_with(&mut *lock(&self.rng), &indices);
        let classes = net.output_size();
        let mut trained = 0;
        let mut loss_sum = F::ZERO;
        let mut stopped = false;
        for i in order {
            if stop.should_stop() {
                stopped = true;
                break;
            }
            let sample = &samples[i];
            let target = util::one_hot(sample.label, classes);
            loss_sum += net.train_with_loss(&sample.input, &target, &LossFn::MSE)?;
            trained += 1;
        }

        let mean_loss = if trained > 0 {
            loss_sum / F::from_usize(trained)
        } else {
            F::ZERO
        };
        let total = samples.len();
        if stopped {
            log::warn!("epoch stopped after {trained}/{total} samples");
        } else {
            log::info!("epoch complete: {total} samples, mean loss {mean_loss:.6}");
        }
        Ok(EpochSummary {
            trained,
            total,
            mean_loss,
            stopped,
        })
    }

    pub fn evaluate(&self, samples: &[Sample<F>]) -> Result<MulticlassScorer> {
        self.with_idle(|net| {
            Self::check_samples(net, samples)?;
            let mut scorer = MulticlassScorer::for_net(net);
            for sample in samples {
                scorer.process(&net.predict(&sample.input)?, sample.label);
            }
            log::info!(
                "evaluated {} samples, accuracy {:.2}%",
                scorer.count(),
                scorer.accuracy() * 100.0
            );
            Ok(scorer)
        })
    }

    pub fn predict(&self, input: &[F]) -> Result<Vec<F>> {
        self.with_idle(|net| net.predict(input))
    }

    /// Index of the strongest output.
    pub fn classify(&self, input: &[F]) -> Result<usize> {
        let output = self.predict(input)?;
        Ok(util::argmax(&output).unwrap_or(0))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.with_idle(|net| net.save(path))
    }

    /// Replaces the network with one read from `path`. On failure the current
    /// network is kept.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.with_idle(|net| {
            *net = NeuralNetwork::load(path)?;
            Ok(())
        })
    }

    /// Gives `f` exclusive access to the network between epochs.
    pub fn with_network<R>(&self, f: impl FnOnce(&mut NeuralNetwork<F>) -> R) -> Result<R> {
        self.with_idle(|net| Ok(f(net)))
    }

    pub fn into_network(self) -> NeuralNetwork<F> {
        self.net.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: DType> From<NeuralNetwork<F>> for Classifier<F> {
    fn from(net: NeuralNetwork<F>) -> Self {
        Classifier::new(net)
    }
}
