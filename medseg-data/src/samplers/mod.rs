pub mod traits;
pub mod sequential_sampler;
pub mod weighted;
pub mod weighted_split;
pub mod weighted_subset;

pub use traits::Sampler;
pub use sequential_sampler::SequentialSampler;
pub use weighted::{weighted_sample_without_replacement, SampleWeights, UNSEEN_WEIGHT};
pub use weighted_split::{SplitSamplerConfig, WeightedSplitRandomSampler};
pub use weighted_subset::{CurriculumConfig, WeightedSubsetRandomSampler};
