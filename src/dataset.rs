//! Synthetic two-class datasets and hold-out partitioning.

use rand::{seq::SliceRandom, Rng};
use rand_distr::{Normal, Uniform};

use crate::error::{Error, Result};

/// A single sample within a dataset of mappings from vectors to vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<const M: usize, const N: usize> {
    /// The input data.
    pub input: [f64; M],
    /// The output data.
    pub output: [f64; N],
}

/// Create a dataset of `n` labeled 2D points drawn from two overlapping clusters.
///
/// The first `ceil(n / 2)` samples carry label `+1.0` with their x-coordinate
/// drawn from `Normal(-1, spread)`; the remaining `floor(n / 2)` samples carry
/// label `-1.0` with their x-coordinate drawn from `Normal(+1, spread)`. The
/// y-coordinate is drawn from `Uniform[-1, 1]` regardless of the label. Larger
/// `spread` increases the overlap between the clusters, making the classes
/// harder to separate.
pub fn two_clusters<R>(n: usize, spread: f64, rng: &mut R) -> Result<Vec<Sample<2, 1>>>
where
    R: Rng,
{
    if n == 0 {
        return Err(Error::InvalidParameter(
            "dataset size must be positive".to_string(),
        ));
    }
    if !spread.is_finite() || spread <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "spread must be a positive real, got {}",
            spread
        )));
    }

    let positive_x = Normal::new(-1.0, spread).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    let negative_x = Normal::new(1.0, spread).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    let y = Uniform::new_inclusive(-1.0, 1.0);

    let n_positive = n / 2 + n % 2;
    let mut samples = Vec::with_capacity(n);
    for _ in 0..n_positive {
        samples.push(Sample {
            input: [rng.sample(positive_x), rng.sample(y)],
            output: [1.0],
        });
    }
    for _ in n_positive..n {
        samples.push(Sample {
            input: [rng.sample(negative_x), rng.sample(y)],
            output: [-1.0],
        });
    }
    Ok(samples)
}

/// Randomly partition a dataset into disjoint train and test subsets.
///
/// A fresh uniform permutation of the sample indices is drawn on every call;
/// the first `floor(ratio * n)` permuted samples form the training set and the
/// remainder form the test set. The two subsets are disjoint as index sets and
/// together recover the full dataset.
#[allow(clippy::type_complexity)]
pub fn split<R, const M: usize, const N: usize>(
    samples: &[Sample<M, N>],
    ratio: f64,
    rng: &mut R,
) -> Result<(Vec<Sample<M, N>>, Vec<Sample<M, N>>)>
where
    R: Rng,
{
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "train ratio must lie in (0, 1), got {}",
            ratio
        )));
    }
    let mut indices: Vec<usize> = (0..samples.len()).collect();
    indices.shuffle(rng);
    let cut = (ratio * samples.len() as f64).floor() as usize;
    let train = indices[..cut].iter().map(|&i| samples[i].clone()).collect();
    let test = indices[cut..].iter().map(|&i| samples[i].clone()).collect();
    Ok((train, test))
}
