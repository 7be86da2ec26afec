// medseg-data/src/indexing/exhaustive.rs

use super::{centers_to_slices, filter_by_foreground};
use log::{debug, warn};
use medseg_core::mask::{bounding_box, Foreground};
use medseg_core::patch::legal_centers;
use medseg_core::{MedsegError, PatchSlice};
use ndarray::ArrayD;

/// Centers along one axis: `lo, lo + step, ...` below `hi`, then `hi`.
fn axis_centers(lo: usize, hi: usize, step: usize) -> Vec<usize> {
    let mut centers: Vec<usize> = (lo..hi).step_by(step).collect();
    centers.push(hi);
    centers
}

/// Every combination of one value per axis, last axis varying fastest.
fn cartesian_product(axes: &[Vec<usize>]) -> Vec<Vec<usize>> {
    if axes.iter().any(|a| a.is_empty()) {
        return Vec::new();
    }
    let total: usize = axes.iter().map(|a| a.len()).product();
    let mut out = Vec::with_capacity(total);
    let mut cursor = vec![0usize; axes.len()];
    loop {
        out.push(cursor.iter().zip(axes).map(|(&i, a)| a[i]).collect());
        let mut axis = axes.len();
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            cursor[axis] += 1;
            if cursor[axis] < axes[axis].len() {
                break;
            }
            cursor[axis] = 0;
        }
    }
}

/// Patch slices on a regular grid covering each mask's bounding box.
///
/// Centers step by `max(p - overlap, 1)` along each axis and always include
/// the far edge of the box. The box is clamped to the centers whose patch
/// fits in the array, so foreground touching the border is still covered.
/// With `min_size = Some(n)`, patches holding `n` or fewer foreground voxels
/// are dropped.
///
/// # Errors
///
/// `EmptyMask` if a mask has no foreground voxel, `RankMismatch` if the
/// patch size does not match a mask's rank.
pub fn grid_slices<T: Foreground>(
    masks: &[ArrayD<T>],
    patch_size: &[usize],
    overlap: usize,
    min_size: Option<usize>,
) -> Result<Vec<Vec<PatchSlice>>, MedsegError> {
    let steps: Vec<usize> = patch_size.iter().map(|&p| p.saturating_sub(overlap).max(1)).collect();
    let mut tables = Vec::with_capacity(masks.len());
    for (case, mask) in masks.iter().enumerate() {
        if mask.ndim() != patch_size.len() {
            return Err(MedsegError::RankMismatch {
                expected: patch_size.len(),
                actual: mask.ndim(),
            });
        }
        let bb = bounding_box(&mask.view()).ok_or(MedsegError::EmptyMask { case })?;
        let Some(legal) = legal_centers(mask.shape(), patch_size) else {
            warn!(
                "grid_slices: patch {:?} does not fit in case {} of shape {:?}, no patches produced",
                patch_size,
                case,
                mask.shape()
            );
            tables.push(Vec::new());
            continue;
        };
        let bb = bb.clamp_into(&legal);
        let axes: Vec<Vec<usize>> = (0..bb.ndim())
            .map(|d| axis_centers(bb.min()[d], bb.max()[d], steps[d]))
            .collect();
        let centers = cartesian_product(&axes);
        let mut slices = centers_to_slices(&centers, patch_size)?;
        if let Some(min_size) = min_size {
            slices = filter_by_foreground(slices, &mask.view(), min_size)?;
        }
        debug!("grid_slices: case {} -> {} patches ({} grid centers)", case, slices.len(), centers.len());
        tables.push(slices);
    }
    Ok(tables)
}

#[cfg(test)]
#[path = "exhaustive_test.rs"]
mod tests;
