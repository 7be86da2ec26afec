// medseg-data/src/samplers/weighted_subset.rs

use super::traits::Sampler;
use super::weighted::{warm_up_window, weighted_sample_without_replacement, SampleWeights};
use crate::rng::make_rng;
use log::debug;
use medseg_core::MedsegError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Settings of a [`WeightedSubsetRandomSampler`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumConfig {
    /// Each epoch draws `ceil(total / sample_div)` samples; the first
    /// `sample_div` epochs walk through a fixed permutation of the dataset.
    pub sample_div: usize,
    /// Fraction of hard samples in the first curriculum epoch.
    pub initial_rate: f64,
    /// Added to the hard fraction every `sample_div` epochs, up to 1.
    pub rate_increase: f64,
    pub seed: Option<u64>,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        CurriculumConfig {
            sample_div: 2,
            initial_rate: 0.1,
            rate_increase: 0.05,
            seed: None,
        }
    }
}

impl CurriculumConfig {
    pub fn validate(&self) -> Result<(), MedsegError> {
        if self.sample_div == 0 {
            return Err(MedsegError::InvalidConfig("sample_div must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.initial_rate) {
            return Err(MedsegError::InvalidConfig(format!(
                "initial_rate must lie in [0, 1], got {}",
                self.initial_rate
            )));
        }
        if !self.rate_increase.is_finite() || self.rate_increase < 0.0 {
            return Err(MedsegError::InvalidConfig(format!(
                "rate_increase must be a non-negative number, got {}",
                self.rate_increase
            )));
        }
        Ok(())
    }
}

/// Curriculum sampler mixing "easy" and "hard" samples.
///
/// Every sample carries a difficulty weight (typically its last loss),
/// reported through [`update_weights`](Self::update_weights). Each call to
/// [`update`](Self::update) starts a new epoch:
///
/// - while `step < sample_div`, the epoch is the next window of a fixed
///   random permutation, so the whole dataset is visited first;
/// - afterwards `ceil(n * rate)` hard samples are drawn proportionally to
///   their weight and the rest proportionally to `max_w - w`, without
///   overlap, and the union is shuffled.
///
/// The hard fraction `rate` grows by `rate_increase` every `sample_div`
/// epochs once the warm-up is over.
#[derive(Debug, Clone)]
pub struct WeightedSubsetRandomSampler {
    config: CurriculumConfig,
    num_samples: usize,
    step: usize,
    /// Number of `rate_increase` steps applied so far.
    increments: usize,
    weights: SampleWeights,
    initial: Vec<usize>,
    indices: Vec<usize>,
    rng: StdRng,
}

impl WeightedSubsetRandomSampler {
    /// Creates a sampler over `total_samples` dataset indices.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an invalid configuration or an empty dataset.
    pub fn new(total_samples: usize, config: CurriculumConfig) -> Result<Self, MedsegError> {
        config.validate()?;
        if total_samples == 0 {
            return Err(MedsegError::InvalidConfig(
                "cannot sample from an empty dataset".to_string(),
            ));
        }
        let mut rng = make_rng(config.seed);
        let num_samples = total_samples.div_ceil(config.sample_div);
        let mut initial: Vec<usize> = (0..total_samples).collect();
        initial.shuffle(&mut rng);
        let indices = warm_up_window(&initial, 0, num_samples);
        debug!(
            "WeightedSubsetRandomSampler: {} samples per epoch out of {}",
            num_samples, total_samples
        );
        Ok(WeightedSubsetRandomSampler {
            config,
            num_samples,
            step: 0,
            increments: 0,
            weights: SampleWeights::new(total_samples),
            initial,
            indices,
            rng,
        })
    }

    /// Stores new weights for the given dataset indices.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `weights` and `indices` differ in length,
    /// `IndexOutOfBounds` for an index outside the dataset. No weight is
    /// written on error.
    pub fn update_weights<W: Copy + Into<f64>>(&mut self, weights: &[W], indices: &[usize]) -> Result<(), MedsegError> {
        self.weights.update(weights, indices)
    }

    /// Advances to the next epoch and draws its indices.
    ///
    /// Call once per epoch, after every weight of the finished epoch has
    /// been reported. On error the sampler is left as it was.
    ///
    /// # Errors
    ///
    /// `InsufficientSamples` when fewer samples than requested have a
    /// positive easy or hard weight.
    pub fn update(&mut self) -> Result<(), MedsegError> {
        let step = self.step + 1;
        let indices = if step < self.config.sample_div {
            warm_up_window(&self.initial, step, self.num_samples)
        } else {
            self.curriculum_draw()?
        };

        self.step = step;
        self.indices = indices;
        if step > self.config.sample_div && step % self.config.sample_div == 0 && self.rate() < 1.0 {
            self.increments += 1;
            debug!("WeightedSubsetRandomSampler: step {}, hard rate now {}", step, self.rate());
        }
        Ok(())
    }

    fn curriculum_draw(&mut self) -> Result<Vec<usize>, MedsegError> {
        let n_hard = hard_count(self.num_samples, self.rate());
        let n_easy = self.num_samples - n_hard;

        let max_w = self.weights.max();
        let easy_w: Vec<f64> = self
            .weights
            .as_slice()
            .iter()
            .map(|&w| (max_w - w).clamp(0.0, max_w))
            .collect();
        let easy = weighted_sample_without_replacement(&easy_w, n_easy, &mut self.rng)?;

        let mut hard_w = self.weights.as_slice().to_vec();
        for &i in &easy {
            hard_w[i] = 0.0;
        }
        let mut mixed = weighted_sample_without_replacement(&hard_w, n_hard, &mut self.rng)?;
        mixed.extend(easy);
        mixed.shuffle(&mut self.rng);
        Ok(mixed)
    }

    /// Indices of the current epoch.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn weights(&self) -> &SampleWeights {
        &self.weights
    }

    /// Current fraction of hard samples.
    pub fn rate(&self) -> f64 {
        (self.config.initial_rate + self.increments as f64 * self.config.rate_increase).min(1.0)
    }

    /// Number of completed `update` calls.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Samples drawn per epoch.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn total_samples(&self) -> usize {
        self.weights.len()
    }
}

/// `ceil(n * rate)`, ignoring the rounding error left in `rate` by the
/// decimal increments (`0.1 + 0.05` is stored above `0.15`).
fn hard_count(n: usize, rate: f64) -> usize {
    let hard = (n as f64 * rate - 1e-9).ceil().max(0.0) as usize;
    hard.min(n)
}

impl Sampler for WeightedSubsetRandomSampler {
    fn iter(&self, _dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        Box::new(self.indices.clone().into_iter())
    }

    fn len(&self, _dataset_len: usize) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
#[path = "weighted_subset_test.rs"]
mod tests;
