// medseg-data/src/samplers/weighted_split.rs

use super::traits::Sampler;
use super::weighted::{warm_up_window, SampleWeights};
use crate::rng::make_rng;
use log::debug;
use medseg_core::MedsegError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Settings of a [`WeightedSplitRandomSampler`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSamplerConfig {
    /// Each epoch draws `total / sample_div` samples.
    pub sample_div: usize,
    pub seed: Option<u64>,
}

impl Default for SplitSamplerConfig {
    fn default() -> Self {
        SplitSamplerConfig {
            sample_div: 2,
            seed: None,
        }
    }
}

impl SplitSamplerConfig {
    pub fn validate(&self) -> Result<(), MedsegError> {
        if self.sample_div == 0 {
            return Err(MedsegError::InvalidConfig("sample_div must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Sampler balancing low- and high-weight halves of the dataset.
///
/// The warm-up is the same as [`WeightedSubsetRandomSampler`](super::WeightedSubsetRandomSampler).
/// Afterwards the samples are ranked by weight and every epoch takes
/// `n / 2` of them uniformly from the lower half and the rest from the
/// upper half.
#[derive(Debug, Clone)]
pub struct WeightedSplitRandomSampler {
    config: SplitSamplerConfig,
    num_samples: usize,
    step: usize,
    weights: SampleWeights,
    initial: Vec<usize>,
    indices: Vec<usize>,
    rng: StdRng,
}

impl WeightedSplitRandomSampler {
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is invalid or `total_samples /
    /// sample_div` is zero.
    pub fn new(total_samples: usize, config: SplitSamplerConfig) -> Result<Self, MedsegError> {
        config.validate()?;
        let num_samples = total_samples / config.sample_div;
        if num_samples == 0 {
            return Err(MedsegError::InvalidConfig(format!(
                "{} samples split in {} leave an empty epoch",
                total_samples, config.sample_div
            )));
        }
        let mut rng = make_rng(config.seed);
        let mut initial: Vec<usize> = (0..total_samples).collect();
        initial.shuffle(&mut rng);
        let indices = warm_up_window(&initial, 0, num_samples);
        Ok(WeightedSplitRandomSampler {
            config,
            num_samples,
            step: 0,
            weights: SampleWeights::new(total_samples),
            initial,
            indices,
            rng,
        })
    }

    /// Stores new weights for the given dataset indices; see
    /// [`SampleWeights::update`].
    pub fn update_weights<W: Copy + Into<f64>>(&mut self, weights: &[W], indices: &[usize]) -> Result<(), MedsegError> {
        self.weights.update(weights, indices)
    }

    /// Advances to the next epoch and draws its indices.
    pub fn update(&mut self) {
        self.step += 1;
        if self.step < self.config.sample_div {
            self.indices = warm_up_window(&self.initial, self.step, self.num_samples);
            return;
        }

        let weights = self.weights.as_slice();
        let mut ranked: Vec<usize> = (0..weights.len()).collect();
        ranked.sort_by(|&a, &b| weights[a].total_cmp(&weights[b]));
        let (low, high) = ranked.split_at(ranked.len() / 2);

        let n_low = self.num_samples / 2;
        let mut indices: Vec<usize> = low.choose_multiple(&mut self.rng, n_low).copied().collect();
        indices.extend(high.choose_multiple(&mut self.rng, self.num_samples - n_low));
        indices.shuffle(&mut self.rng);
        debug!(
            "WeightedSplitRandomSampler: step {}, {} low-weight + {} high-weight samples",
            self.step,
            n_low,
            self.num_samples - n_low
        );
        self.indices = indices;
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

impl Sampler for WeightedSplitRandomSampler {
    fn iter(&self, _dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        Box::new(self.indices.clone().into_iter())
    }

    fn len(&self, _dataset_len: usize) -> usize {
        self.indices.len()
    }
}
