//! The epoch loop producing per-epoch error curves on both partitions.

use crate::{dataset::Sample, error::Result, model::Model};

/// An ordered sequence of per-epoch error values, one entry per training epoch.
pub type ErrorCurve = Vec<f64>;

/// Hyperparameters of a single training run.
#[derive(Debug, Clone, Copy)]
pub struct Hyperparameters {
    /// Step size of the gradient-descent update.
    pub learning_rate: f64,
    /// Momentum coefficient of the gradient-descent update.
    pub momentum: f64,
    /// Number of training epochs.
    pub epochs: usize,
}

/// Per-epoch error curves recorded while training a model on one partition.
#[derive(Debug, Clone)]
pub struct FitTrace {
    /// Mean squared error on the training partition, one entry per epoch.
    pub train: ErrorCurve,
    /// Mean squared error on the untouched test partition, one entry per epoch.
    pub test: ErrorCurve,
}

/// Train `model` for exactly `hyper.epochs` epochs, recording the mean squared error on both
/// partitions after every epoch.
///
/// Each epoch updates the parameters using only the training partition, then evaluates both
/// partitions at that epoch index. Training is continuous; the parameters are never reset
/// between epochs. Callers must construct a fresh model per trial to isolate re-initializations.
pub fn fit<M, const I: usize, const O: usize>(
    model: &mut M,
    train: &[Sample<I, O>],
    test: &[Sample<I, O>],
    hyper: &Hyperparameters,
) -> Result<FitTrace>
where
    M: Model<I, O>,
{
    let mut trace = FitTrace {
        train: Vec::with_capacity(hyper.epochs),
        test: Vec::with_capacity(hyper.epochs),
    };
    for _ in 0..hyper.epochs {
        model.train_step(train, hyper.learning_rate, hyper.momentum)?;
        trace.train.push(model.mean_squared_error(train));
        trace.test.push(model.mean_squared_error(test));
    }
    Ok(trace)
}
