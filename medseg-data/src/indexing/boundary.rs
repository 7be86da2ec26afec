// medseg-data/src/indexing/boundary.rs

use super::centers_to_slices;
use log::{debug, warn};
use medseg_core::mask::{boundary, mask_voxels};
use medseg_core::patch::legal_centers;
use medseg_core::{MedsegError, PatchSlice};
use ndarray::ArrayD;
use rand::seq::index;
use rand::Rng;

/// Patches centred on a random fraction of every label's boundary.
///
/// For each label value `l` in `1..=max(label)` the boundary of `label == l`
/// (the voxels removed by one binary erosion) is restricted to legal patch
/// centers, and `floor(rate * count)` of its voxels are drawn without
/// replacement. A case's table concatenates the labels in increasing order.
pub fn boundary_slices<G: Rng + ?Sized>(
    labels: &[ArrayD<u8>],
    patch_size: &[usize],
    rate: f64,
    rng: &mut G,
) -> Result<Vec<Vec<PatchSlice>>, MedsegError> {
    let mut tables = Vec::with_capacity(labels.len());
    for (case, label) in labels.iter().enumerate() {
        if label.ndim() != patch_size.len() {
            return Err(MedsegError::RankMismatch {
                expected: patch_size.len(),
                actual: label.ndim(),
            });
        }
        let Some(legal) = legal_centers(label.shape(), patch_size) else {
            warn!("boundary_slices: case {} is smaller than the patch", case);
            tables.push(Vec::new());
            continue;
        };
        let max_label = label.iter().copied().max().unwrap_or(0);

        let mut centers = Vec::new();
        for value in 1..=max_label {
            let region = label.mapv(|v| v == value);
            let edge = boundary(&region.view());
            let candidates: Vec<Vec<usize>> = mask_voxels(&edge.view())
                .into_iter()
                .filter(|voxel| legal.contains(voxel))
                .collect();
            let amount = (candidates.len() as f64 * rate).floor() as usize;
            let amount = amount.min(candidates.len());
            let chosen = index::sample(rng, candidates.len(), amount);
            centers.extend(chosen.iter().map(|i| candidates[i].clone()));
        }

        let slices = centers_to_slices(&centers, patch_size)?;
        debug!("boundary_slices: case {} -> {} patches over {} labels", case, slices.len(), max_label);
        tables.push(slices);
    }
    Ok(tables)
}
