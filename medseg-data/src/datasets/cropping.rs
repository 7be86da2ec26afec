// medseg-data/src/datasets/cropping.rs

use super::traits::Dataset;
use super::{check_volumes, whole_volume_masks};
use crate::indexing::{balanced_slices, grid_slices, PatchTable};
use crate::rng::make_rng;
use log::debug;
use medseg_core::{MedsegError, PatchSize, PatchSlice};
use ndarray::{ArrayD, Axis};

/// Settings of a [`CroppingDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct CroppingConfig {
    /// Patch extent, broadcast to every spatial axis when uniform.
    pub patch_size: PatchSize,
    /// Lesion/background balanced centers instead of a regular grid.
    pub balanced: bool,
    /// Voxels shared by neighbouring grid patches.
    pub overlap: usize,
    /// Grid patches need strictly more foreground voxels than this to be
    /// kept. Balanced mode ignores it.
    pub min_size: usize,
    /// Background patches per lesion patch in balanced mode.
    pub neg_ratio: f64,
    /// Seed of the background subsampling, entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for CroppingConfig {
    fn default() -> Self {
        CroppingConfig {
            patch_size: PatchSize::default(),
            balanced: true,
            overlap: 0,
            min_size: 0,
            neg_ratio: 1.0,
            seed: None,
        }
    }
}

impl CroppingConfig {
    pub fn validate(&self) -> Result<(), MedsegError> {
        if !self.neg_ratio.is_finite() || self.neg_ratio < 0.0 {
            return Err(MedsegError::InvalidConfig(format!(
                "neg_ratio must be a non-negative number, got {}",
                self.neg_ratio
            )));
        }
        Ok(())
    }
}

/// One patch cut out of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSample {
    /// Input patch, `(channels, *patch_size)`.
    pub inputs: ArrayD<f32>,
    /// Label patch with a leading channel axis, `(1, *patch_size)`.
    pub target: Option<ArrayD<u8>>,
    /// Global index of the patch, as reported back to weighted samplers.
    pub index: usize,
    /// Case the patch was cut from.
    pub case: usize,
    /// Extent of the patch inside the case.
    pub slice: PatchSlice,
}

/// Cases, optional labels and their patch table; shared by the patch
/// datasets.
#[derive(Debug, Clone)]
pub(crate) struct PatchVolumes {
    pub(crate) cases: Vec<ArrayD<f32>>,
    pub(crate) labels: Option<Vec<ArrayD<u8>>>,
    pub(crate) table: PatchTable,
}

impl PatchVolumes {
    pub(crate) fn sample(&self, index: usize) -> Result<PatchSample, MedsegError> {
        let (case, slice) = self.table.get(index)?;
        let inputs = slice.apply(self.cases[case].view())?.to_owned();
        let target = match &self.labels {
            Some(labels) => Some(slice.apply(labels[case].view())?.to_owned().insert_axis(Axis(0))),
            None => None,
        };
        Ok(PatchSample {
            inputs,
            target,
            index,
            case,
            slice: slice.clone(),
        })
    }
}

/// Patch dataset over multi-channel volumes.
///
/// Every case is indexed once at construction; afterwards `get` is a pure
/// lookup followed by array slicing. Indices are global over all cases, in
/// case order.
///
/// Patch centers come from:
/// - balanced mode with labels: [`balanced_slices`] on the labels, using the
///   masks (when given) as region of interest;
/// - grid mode: [`grid_slices`] on the masks, else the labels, filtered by
///   `min_size`;
/// - without labels or masks, a grid over the whole volume.
#[derive(Debug, Clone)]
pub struct CroppingDataset {
    volumes: PatchVolumes,
    patch_size: Vec<usize>,
}

impl CroppingDataset {
    /// Builds the patch table of every case.
    ///
    /// # Arguments
    ///
    /// * `cases` - One `(channels, *spatial)` array per subject.
    /// * `labels` - Optional label maps, one `spatial` array per case.
    /// * `masks` - Optional regions of interest, one `spatial` array per case.
    /// * `config` - Patch size and sampling settings.
    ///
    /// # Errors
    ///
    /// `EmptyCaseList`, `RankMismatch` or `ShapeMismatch` for inconsistent
    /// volumes, `EmptyMask` if a mask or label map used for indexing has no
    /// foreground, `InvalidConfig` for a bad configuration.
    pub fn new(
        cases: Vec<ArrayD<f32>>,
        labels: Option<Vec<ArrayD<u8>>>,
        masks: Option<Vec<ArrayD<u8>>>,
        config: CroppingConfig,
    ) -> Result<Self, MedsegError> {
        config.validate()?;
        check_volumes(&cases, &[("labels", labels.as_deref()), ("masks", masks.as_deref())])?;
        let patch_size = config.patch_size.resolve(cases[0].ndim() - 1)?;
        let mut rng = make_rng(config.seed);

        let tables = match (config.balanced, labels.as_deref(), masks.as_deref()) {
            (true, Some(labels), rois) => balanced_slices(
                labels,
                &patch_size,
                rois,
                0,
                config.neg_ratio,
                &mut rng,
            )?,
            (true, None, _) => grid_slices(&whole_volume_masks(&cases), &patch_size, 0, None)?,
            (false, labels, masks) => match masks.or(labels) {
                Some(source) => grid_slices(source, &patch_size, config.overlap, Some(config.min_size))?,
                None => grid_slices(
                    &whole_volume_masks(&cases),
                    &patch_size,
                    config.overlap,
                    Some(config.min_size),
                )?,
            },
        };

        let table = PatchTable::new(tables);
        debug!(
            "CroppingDataset: {} cases, {} patches of size {:?} (balanced: {})",
            cases.len(),
            table.len(),
            patch_size,
            config.balanced
        );
        Ok(CroppingDataset {
            volumes: PatchVolumes { cases, labels, table },
            patch_size,
        })
    }

    pub fn patch_size(&self) -> &[usize] {
        &self.patch_size
    }

    pub fn num_cases(&self) -> usize {
        self.volumes.cases.len()
    }

    /// The per-case patch tables and their cumulative counts.
    pub fn table(&self) -> &PatchTable {
        &self.volumes.table
    }
}

impl Dataset for CroppingDataset {
    type Item = PatchSample;

    fn get(&self, index: usize) -> Result<Self::Item, MedsegError> {
        self.volumes.sample(index)
    }

    fn len(&self) -> usize {
        self.volumes.table.len()
    }
}

#[cfg(test)]
#[path = "cropping_test.rs"]
mod tests;
