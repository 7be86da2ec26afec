// medseg-data/src/datasets/boundary.rs

use super::check_volumes;
use super::cropping::{PatchSample, PatchVolumes};
use super::traits::Dataset;
use crate::indexing::{boundary_slices, PatchTable};
use crate::rng::make_rng;
use log::debug;
use medseg_core::{MedsegError, PatchSize};
use ndarray::{ArrayD, IxDyn};

/// Settings of a [`BoundaryCroppingDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    pub patch_size: PatchSize,
    /// Fraction of each label's boundary voxels used as patch centers.
    pub rate: f64,
    pub seed: Option<u64>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig {
            patch_size: PatchSize::default(),
            rate: 0.1,
            seed: None,
        }
    }
}

impl BoundaryConfig {
    pub fn validate(&self) -> Result<(), MedsegError> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(MedsegError::InvalidConfig(format!(
                "boundary rate must lie in [0, 1], got {}",
                self.rate
            )));
        }
        Ok(())
    }
}

/// Patch dataset centred on label boundaries.
///
/// Behaves like [`CroppingDataset`](super::CroppingDataset) except that the
/// patch centers are a random fraction of the boundary voxels of every label
/// value. Without labels the whole volume acts as a single label.
#[derive(Debug, Clone)]
pub struct BoundaryCroppingDataset {
    volumes: PatchVolumes,
}

impl BoundaryCroppingDataset {
    pub fn new(
        cases: Vec<ArrayD<f32>>,
        labels: Option<Vec<ArrayD<u8>>>,
        config: BoundaryConfig,
    ) -> Result<Self, MedsegError> {
        config.validate()?;
        check_volumes(&cases, &[("labels", labels.as_deref())])?;
        let patch_size = config.patch_size.resolve(cases[0].ndim() - 1)?;
        let mut rng = make_rng(config.seed);

        let tables = match &labels {
            Some(labels) => boundary_slices(labels, &patch_size, config.rate, &mut rng)?,
            None => {
                let ones: Vec<ArrayD<u8>> = cases
                    .iter()
                    .map(|case| ArrayD::from_elem(IxDyn(&case.shape()[1..]), 1u8))
                    .collect();
                boundary_slices(&ones, &patch_size, config.rate, &mut rng)?
            }
        };

        let table = PatchTable::new(tables);
        debug!(
            "BoundaryCroppingDataset: {} cases, {} patches (rate {})",
            cases.len(),
            table.len(),
            config.rate
        );
        Ok(BoundaryCroppingDataset {
            volumes: PatchVolumes { cases, labels, table },
        })
    }

    pub fn table(&self) -> &PatchTable {
        &self.volumes.table
    }
}

impl Dataset for BoundaryCroppingDataset {
    type Item = PatchSample;

    fn get(&self, index: usize) -> Result<Self::Item, MedsegError> {
        self.volumes.sample(index)
    }

    fn len(&self) -> usize {
        self.volumes.table.len()
    }
}
