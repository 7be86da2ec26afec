//! Patch indexers: turn per-case masks into ordered tables of patch slices.
//!
//! Three strategies are provided:
//! - [`grid_slices`]: every patch on a regular grid over the mask's bounding
//!   box, optionally dropping patches with too little foreground;
//! - [`balanced_slices`]: one patch per foreground voxel plus a random
//!   subset of background voxels at a fixed negative ratio;
//! - [`boundary_slices`]: a random fraction of each label's boundary voxels.
//!
//! [`PatchTable`] flattens the per-case tables into one global index space.

pub mod balanced;
pub mod boundary;
pub mod exhaustive;
pub mod table;

pub use balanced::balanced_slices;
pub use boundary::boundary_slices;
pub use exhaustive::grid_slices;
pub use table::PatchTable;

use medseg_core::mask::Foreground;
use medseg_core::{MedsegError, PatchSlice};
use ndarray::ArrayViewD;

/// Patch slices centred on each of `centers`.
pub fn centers_to_slices(centers: &[Vec<usize>], patch_size: &[usize]) -> Result<Vec<PatchSlice>, MedsegError> {
    centers
        .iter()
        .map(|center| PatchSlice::from_center(center, patch_size))
        .collect()
}

/// Keeps the slices whose patch holds strictly more than `min_size`
/// foreground voxels of `mask`.
pub fn filter_by_foreground<T: Foreground>(
    slices: Vec<PatchSlice>,
    mask: &ArrayViewD<T>,
    min_size: usize,
) -> Result<Vec<PatchSlice>, MedsegError> {
    let mut kept = Vec::with_capacity(slices.len());
    for slice in slices {
        if foreground_in(&slice, mask)? > min_size {
            kept.push(slice);
        }
    }
    Ok(kept)
}

/// Number of foreground voxels of `mask` inside `slice`.
pub fn foreground_in<T: Foreground>(slice: &PatchSlice, mask: &ArrayViewD<T>) -> Result<usize, MedsegError> {
    let patch = slice.apply(mask.view())?;
    Ok(patch.iter().filter(|v| v.is_foreground()).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_centers_to_slices() {
        let slices = centers_to_slices(&[vec![2, 2], vec![3, 5]], &[4, 4]).unwrap();
        assert_eq!(slices[0].ranges(), &[0..4, 0..4]);
        assert_eq!(slices[1].ranges(), &[1..5, 3..7]);
    }

    #[test]
    fn test_filter_by_foreground_is_strict() {
        let mut mask = ArrayD::<u8>::zeros(IxDyn(&[4, 4]));
        mask[[0, 0].as_slice()] = 1;
        mask[[0, 1].as_slice()] = 1;
        let slices = vec![PatchSlice::new(vec![0..2, 0..2]), PatchSlice::new(vec![2..4, 2..4])];
        let kept = filter_by_foreground(slices.clone(), &mask.view(), 1).unwrap();
        assert_eq!(kept, vec![slices[0].clone()]);
        assert!(filter_by_foreground(slices, &mask.view(), 2).unwrap().is_empty());
    }
}
