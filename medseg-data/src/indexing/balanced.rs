// medseg-data/src/indexing/balanced.rs

use super::foreground_in;
use log::{debug, warn};
use medseg_core::mask::{bounding_box, Foreground};
use medseg_core::patch::legal_centers;
use medseg_core::{MedsegError, PatchSlice};
use ndarray::{ArrayD, Dimension};
use rand::seq::index;
use rand::Rng;

/// Lesion-centred patches plus a random subset of background patches.
///
/// For each case the candidate centers are restricted to the bounding box of
/// the region of interest (or of the labels when `rois` is `None`),
/// intersected with the centers whose patch fits in the array. Every
/// foreground candidate is kept; background candidates (outside the labels,
/// inside the ROI when one is given) are sampled without replacement down to
/// `round(neg_ratio * foreground_count)`. With `min_size > 0` only background
/// patches holding more than `min_size` foreground voxels are eligible.
///
/// The table of each case lists the foreground patches first, then the
/// sampled background ones.
///
/// # Errors
///
/// `EmptyMask` if the mask defining a case's bounding box is empty,
/// `ShapeMismatch` if labels, ROI and patch size disagree.
pub fn balanced_slices<L, R, G>(
    labels: &[ArrayD<L>],
    patch_size: &[usize],
    rois: Option<&[ArrayD<R>]>,
    min_size: usize,
    neg_ratio: f64,
    rng: &mut G,
) -> Result<Vec<Vec<PatchSlice>>, MedsegError>
where
    L: Foreground,
    R: Foreground,
    G: Rng + ?Sized,
{
    if let Some(rois) = rois {
        if rois.len() != labels.len() {
            return Err(MedsegError::ShapeMismatch {
                expected: format!("{} ROI masks", labels.len()),
                actual: format!("{} ROI masks", rois.len()),
                operation: "balanced_slices".to_string(),
            });
        }
    }

    let mut tables = Vec::with_capacity(labels.len());
    for (case, label) in labels.iter().enumerate() {
        let roi = rois.map(|r| &r[case]);
        if label.ndim() != patch_size.len() {
            return Err(MedsegError::RankMismatch {
                expected: patch_size.len(),
                actual: label.ndim(),
            });
        }
        if let Some(roi) = roi {
            if roi.shape() != label.shape() {
                return Err(MedsegError::ShapeMismatch {
                    expected: format!("{:?}", label.shape()),
                    actual: format!("{:?}", roi.shape()),
                    operation: "balanced_slices".to_string(),
                });
            }
        }

        let bb = match roi {
            Some(roi) => bounding_box(&roi.view()),
            None => bounding_box(&label.view()),
        }
        .ok_or(MedsegError::EmptyMask { case })?;
        let legal = legal_centers(label.shape(), patch_size).and_then(|l| l.intersection(&bb));
        let Some(legal) = legal else {
            warn!("balanced_slices: case {} has no legal patch center", case);
            tables.push(Vec::new());
            continue;
        };

        // Only the legal window is visited; background voxels are kept as
        // row-major offsets into it until they are sampled.
        let window = legal.to_patch_slice();
        let label_window = window.apply(label.view())?;
        let roi_window = roi.map(|roi| window.apply(roi.view())).transpose()?;
        let window_shape = label_window.shape().to_vec();
        let to_slice = |local: &[usize]| {
            let center: Vec<usize> = local.iter().zip(legal.min()).map(|(l, m)| l + m).collect();
            PatchSlice::from_center(&center, patch_size)
        };

        let mut lesion_slices = Vec::new();
        let mut background: Vec<usize> = Vec::new();
        for (offset, (idx, value)) in label_window.indexed_iter().enumerate() {
            if value.is_foreground() {
                lesion_slices.push(to_slice(idx.slice())?);
            } else if roi_window.as_ref().map_or(true, |roi| roi[idx.slice()].is_foreground()) {
                background.push(offset);
            }
        }

        if min_size > 0 {
            let mut eligible = Vec::with_capacity(background.len());
            for offset in background {
                let slice = to_slice(&unravel(offset, &window_shape))?;
                if foreground_in(&slice, &label.view())? > min_size {
                    eligible.push(offset);
                }
            }
            background = eligible;
        }

        let wanted = (neg_ratio * lesion_slices.len() as f64).round() as usize;
        let amount = wanted.min(background.len());
        if amount < wanted {
            warn!(
                "balanced_slices: case {} wanted {} background patches, only {} available",
                case, wanted, amount
            );
        }
        let chosen = index::sample(rng, background.len(), amount);

        let mut slices = lesion_slices;
        for i in chosen.iter() {
            slices.push(to_slice(&unravel(background[i], &window_shape))?);
        }
        debug!(
            "balanced_slices: case {} -> {} lesion + {} background patches",
            case,
            slices.len() - amount,
            amount
        );
        tables.push(slices);
    }
    Ok(tables)
}

/// Row-major coordinates of `offset` in an array of `shape`.
fn unravel(mut offset: usize, shape: &[usize]) -> Vec<usize> {
    let mut coords = vec![0; shape.len()];
    for d in (0..shape.len()).rev() {
        coords[d] = offset % shape[d];
        offset /= shape[d];
    }
    coords
}

#[cfg(test)]
#[path = "balanced_test.rs"]
mod tests;
