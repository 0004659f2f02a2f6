//! Read-only reductions of sweep results for distributional comparison.

use crate::{
    error::{Error, Result},
    sweep::ResultTensor,
};

/// Five-number summary of a sample, the quantities a boxplot draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    /// Smallest observed value.
    pub min: f64,
    /// 25th percentile.
    pub lower_quartile: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub upper_quartile: f64,
    /// Largest observed value.
    pub max: f64,
}

impl FiveNumber {
    /// Summarize a sample of values, interpolating linearly between order statistics.
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidParameter(
                "cannot summarize an empty sample".to_string(),
            ));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Ok(Self {
            min: sorted[0],
            lower_quartile: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            upper_quartile: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (position - below as f64)
}

/// The final-epoch test error of every trial, grouped per difficulty parameter.
///
/// This is the per-trial scatter data a plot would overlay on the boxplots.
pub fn final_errors(tensor: &ResultTensor) -> Vec<Vec<f64>> {
    let (params, _, _) = tensor.shape();
    (0..params).map(|param| tensor.final_errors(param)).collect()
}

/// Five-number summary of the final test error per difficulty parameter.
pub fn summarize(tensor: &ResultTensor) -> Result<Vec<FiveNumber>> {
    final_errors(tensor)
        .iter()
        .map(|errors| FiveNumber::of(errors))
        .collect()
}
