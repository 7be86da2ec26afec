// medseg-data/src/samplers/weighted.rs

use medseg_core::MedsegError;
use rand::Rng;
use rand_distr::{Distribution, Gumbel};

/// Weight given to samples that have not been seen yet: large enough that
/// they count as "hard" until a real loss is reported for them.
pub const UNSEEN_WEIGHT: f64 = i16::MAX as f64;

/// Per-sample difficulty weights, written by the training loop after each
/// forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWeights {
    weights: Vec<f64>,
}

impl SampleWeights {
    /// `len` weights, all set to [`UNSEEN_WEIGHT`].
    pub fn new(len: usize) -> Self {
        SampleWeights {
            weights: vec![UNSEEN_WEIGHT; len],
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// Largest stored weight, 0 when empty.
    pub fn max(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Overwrites the weight of every index in `indices` with the matching
    /// entry of `weights`.
    ///
    /// Nothing is written unless every index is valid.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the two slices differ in length, `IndexOutOfBounds`
    /// if an index is not below `len()`.
    pub fn update<W: Copy + Into<f64>>(&mut self, weights: &[W], indices: &[usize]) -> Result<(), MedsegError> {
        if weights.len() != indices.len() {
            return Err(MedsegError::ShapeMismatch {
                expected: format!("{} weights", indices.len()),
                actual: format!("{} weights", weights.len()),
                operation: "update_weights".to_string(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.weights.len()) {
            return Err(MedsegError::IndexOutOfBounds {
                index: vec![bad],
                shape: vec![self.weights.len()],
            });
        }
        for (&i, &w) in indices.iter().zip(weights) {
            self.weights[i] = w.into();
        }
        Ok(())
    }
}

/// Draws `k` distinct indices, each with probability proportional to its
/// weight, using a single Gumbel-top-k pass.
///
/// Indices with a non-positive (or non-finite) weight are never drawn.
///
/// # Errors
///
/// `InsufficientSamples` if fewer than `k` weights are positive.
pub fn weighted_sample_without_replacement<R: Rng + ?Sized>(
    weights: &[f64],
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>, MedsegError> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let gumbel = Gumbel::new(0.0, 1.0).map_err(|e| MedsegError::InvalidConfig(e.to_string()))?;
    let mut keys: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .filter(|&(_, &w)| w > 0.0 && w.is_finite())
        .map(|(i, &w)| (w.ln() + gumbel.sample(rng), i))
        .collect();
    if keys.len() < k {
        return Err(MedsegError::InsufficientSamples {
            requested: k,
            available: keys.len(),
        });
    }
    keys.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
    Ok(keys.into_iter().take(k).map(|(_, i)| i).collect())
}

/// Window `step` of the warm-up permutation: `initial[step * n..(step + 1) * n]`,
/// clamped to the permutation's length.
pub(crate) fn warm_up_window(initial: &[usize], step: usize, n: usize) -> Vec<usize> {
    let start = step.saturating_mul(n).min(initial.len());
    let end = start.saturating_add(n).min(initial.len());
    initial[start..end].to_vec()
}
