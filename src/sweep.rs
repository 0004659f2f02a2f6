//! The experiment sweep over difficulty parameters, splits, and re-initializations.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    autodiff::Tape,
    dataset,
    error::{Error, Result},
    harness::{self, FitTrace, Hyperparameters},
    model::{Activation, Mlp},
};

/// Immutable configuration of one experiment sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Ordered set of difficulty parameters; each value is the standard deviation of the
    /// cluster x-coordinates.
    pub spreads: Vec<f64>,
    /// Number of samples synthesized per difficulty parameter.
    pub dataset_size: usize,
    /// Fraction of each dataset assigned to the training partition.
    pub train_ratio: f64,
    /// Number of train/test partitions drawn per difficulty parameter.
    pub n_splits: usize,
    /// Number of model re-initializations per partition.
    pub n_inits: usize,
    /// Width of the hidden layer.
    pub n_neurons: usize,
    /// Step size of the gradient-descent update.
    pub learning_rate: f64,
    /// Momentum coefficient of the gradient-descent update.
    pub momentum: f64,
    /// Number of training epochs per trial.
    pub epochs: usize,
}

impl SweepConfig {
    /// Number of trials recorded per difficulty parameter.
    pub fn trials(&self) -> usize {
        self.n_splits * self.n_inits
    }

    /// Check every field before any random draw or training begins.
    pub fn validate(&self) -> Result<()> {
        if self.spreads.is_empty() {
            return Err(Error::InvalidParameter(
                "the set of spreads must not be empty".to_string(),
            ));
        }
        if let Some(&spread) = self.spreads.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "every spread must be a positive real, got {}",
                spread
            )));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "train ratio must lie in (0, 1), got {}",
                self.train_ratio
            )));
        }
        for (name, value) in [
            ("dataset_size", self.dataset_size),
            ("n_splits", self.n_splits),
            ("n_inits", self.n_inits),
            ("n_neurons", self.n_neurons),
            ("epochs", self.epochs),
        ] {
            if value == 0 {
                return Err(Error::InvalidParameter(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "learning rate must be a positive real, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && self.momentum >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "momentum must be a non-negative real, got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

/// Everything known about one completed trial, handed to the sweep observer.
#[derive(Debug)]
pub struct TrialReport<'a> {
    /// Index into the configured set of spreads.
    pub param_index: usize,
    /// Index of the train/test partition within the current spread.
    pub split_index: usize,
    /// Index of the model re-initialization within the current partition.
    pub init_index: usize,
    /// The spread the trial's dataset was synthesized with.
    pub spread: f64,
    /// The per-epoch error curves of the trial.
    pub trace: &'a FitTrace,
}

/// Pre-sized storage of per-epoch test errors, indexed by (difficulty parameter, trial, epoch).
///
/// The trial index decomposes as `split_index * n_inits + init_index`. Cells start out as NaN
/// and are overwritten in place as trials complete; a successful sweep leaves no NaN behind.
#[derive(Debug, Clone)]
pub struct ResultTensor {
    params: usize,
    trials: usize,
    epochs: usize,
    data: Vec<f64>,
}

impl ResultTensor {
    fn sized(params: usize, trials: usize, epochs: usize) -> Self {
        Self {
            params,
            trials,
            epochs,
            data: vec![f64::NAN; params * trials * epochs],
        }
    }

    /// The tensor's dimensions as (parameters, trials, epochs).
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.params, self.trials, self.epochs)
    }

    fn offset(&self, param: usize, trial: usize) -> usize {
        assert!(param < self.params && trial < self.trials);
        (param * self.trials + trial) * self.epochs
    }

    /// The per-epoch test error curve of one trial.
    pub fn curve(&self, param: usize, trial: usize) -> &[f64] {
        let offset = self.offset(param, trial);
        &self.data[offset..offset + self.epochs]
    }

    fn curve_mut(&mut self, param: usize, trial: usize) -> &mut [f64] {
        let offset = self.offset(param, trial);
        &mut self.data[offset..offset + self.epochs]
    }

    /// The final-epoch test error of every trial for one difficulty parameter.
    pub fn final_errors(&self, param: usize) -> Vec<f64> {
        (0..self.trials)
            .map(|trial| self.curve(param, trial)[self.epochs - 1])
            .collect()
    }
}

/// Run the full sweep described by `config`, reporting each completed trial to `observer`.
///
/// For each spread, one dataset is synthesized; for each of `n_splits` repetitions, one
/// partition is drawn and reused across `n_inits` freshly initialized models. Trials are
/// enumerated deterministically (spreads in given order, split outer, init inner) while the
/// random draws remain independent events on the caller's `rng`. Any failure aborts the sweep
/// immediately; nothing is retried.
pub fn run<R, F>(config: &SweepConfig, rng: &mut R, mut observer: F) -> Result<ResultTensor>
where
    R: Rng,
    F: FnMut(&TrialReport<'_>),
{
    config.validate()?;
    let hyper = Hyperparameters {
        learning_rate: config.learning_rate,
        momentum: config.momentum,
        epochs: config.epochs,
    };
    let widths = [2, config.n_neurons, 1];
    let mut tensor = ResultTensor::sized(config.spreads.len(), config.trials(), config.epochs);

    for (param_index, &spread) in config.spreads.iter().enumerate() {
        let samples = dataset::two_clusters(config.dataset_size, spread, rng)?;
        for split_index in 0..config.n_splits {
            let (train, test) = dataset::split(&samples, config.train_ratio, rng)?;
            for init_index in 0..config.n_inits {
                let tape = Tape::default();
                let mut mlp =
                    Mlp::rand(&tape, rng, StandardNormal, Activation::Tanh, &widths)?;
                let trace = harness::fit(&mut mlp, &train, &test, &hyper)?;
                let trial = split_index * config.n_inits + init_index;
                tensor
                    .curve_mut(param_index, trial)
                    .copy_from_slice(&trace.test);
                observer(&TrialReport {
                    param_index,
                    split_index,
                    init_index,
                    spread,
                    trace: &trace,
                });
            }
        }
    }
    Ok(tensor)
}
