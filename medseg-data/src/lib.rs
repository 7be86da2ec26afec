//! Patch datasets and curriculum sampling for volumetric segmentation.
//!
//! The pieces fit together as follows:
//! - [`indexing`] computes, once per case, the table of patch slices to
//!   train on (regular grid, lesion/background balanced, label boundary);
//! - [`datasets`] exposes those tables through a flat index space and cuts
//!   the patches on demand;
//! - [`samplers`] choose which indices make up each epoch, including the
//!   curriculum samplers driven by per-sample losses;
//! - [`dataloader`] batches the sampled indices.

pub mod dataloader;
pub mod datasets;
pub mod indexing;
mod rng;
pub mod samplers;

pub use dataloader::{collate_patches, stack_patches, CollateFn, DataLoader, PatchBatch};
pub use datasets::{
    BoundaryConfig, BoundaryCroppingDataset, BoundingBoxDataset, BoundingBoxTupleDataset, BoundingBoxValueDataset,
    BoxMode, BoxSample, CroppingConfig, CroppingDataset, Dataset, PatchSample,
};
pub use indexing::PatchTable;
pub use medseg_core::{MedsegError, PatchSize, PatchSlice};
pub use samplers::{
    CurriculumConfig, Sampler, SequentialSampler, SplitSamplerConfig, WeightedSplitRandomSampler,
    WeightedSubsetRandomSampler,
};
