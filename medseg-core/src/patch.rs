// medseg-core/src/patch.rs

use crate::error::MedsegError;
use crate::mask::BoundingBox;
use ndarray::{ArrayViewD, Axis, Slice};
use std::ops::Range;

/// Extent of the patches cut out of a volume.
///
/// A single value is broadcast to every spatial axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSize {
    Uniform(usize),
    PerAxis(Vec<usize>),
}

impl Default for PatchSize {
    fn default() -> Self {
        PatchSize::Uniform(32)
    }
}

impl From<usize> for PatchSize {
    fn from(size: usize) -> Self {
        PatchSize::Uniform(size)
    }
}

impl From<Vec<usize>> for PatchSize {
    fn from(sizes: Vec<usize>) -> Self {
        PatchSize::PerAxis(sizes)
    }
}

impl PatchSize {
    /// Expands the patch size to one length per spatial axis.
    ///
    /// # Errors
    ///
    /// `RankMismatch` if a per-axis size does not have `ndim` entries,
    /// `InvalidConfig` if any length is zero.
    pub fn resolve(&self, ndim: usize) -> Result<Vec<usize>, MedsegError> {
        let sizes = match self {
            PatchSize::Uniform(size) => vec![*size; ndim],
            PatchSize::PerAxis(sizes) => {
                if sizes.len() != ndim {
                    return Err(MedsegError::RankMismatch {
                        expected: ndim,
                        actual: sizes.len(),
                    });
                }
                sizes.clone()
            }
        };
        if sizes.iter().any(|&p| p == 0) {
            return Err(MedsegError::InvalidConfig(format!(
                "patch size must be positive on every axis, got {:?}",
                sizes
            )));
        }
        Ok(sizes)
    }
}

/// Half extent used to go from a patch center to its first voxel.
pub fn patch_half(patch_size: &[usize]) -> Vec<usize> {
    patch_size.iter().map(|p| p / 2).collect()
}

/// Box (inclusive on both ends) of every center whose patch fits inside an
/// array of `shape`.
///
/// Returns `None` when the patch is larger than the array on some axis.
pub fn legal_centers(shape: &[usize], patch_size: &[usize]) -> Option<BoundingBox> {
    let mut min = Vec::with_capacity(shape.len());
    let mut max = Vec::with_capacity(shape.len());
    for (&dim, &p) in shape.iter().zip(patch_size) {
        if p > dim {
            return None;
        }
        let half = p / 2;
        min.push(half);
        max.push(dim - (p - half));
    }
    Some(BoundingBox::new(min, max))
}

/// Half-open extent of one patch, one range per spatial axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchSlice {
    ranges: Vec<Range<usize>>,
}

impl PatchSlice {
    pub fn new(ranges: Vec<Range<usize>>) -> Self {
        PatchSlice { ranges }
    }

    /// The patch of `patch_size` voxels whose center voxel is `center`.
    ///
    /// Each axis covers `[c - p/2, c - p/2 + p)`, so odd sizes keep exactly
    /// `p` voxels.
    ///
    /// # Errors
    ///
    /// `RankMismatch` if the two slices differ in length, `IndexOutOfBounds`
    /// if the patch would start before voxel 0.
    pub fn from_center(center: &[usize], patch_size: &[usize]) -> Result<Self, MedsegError> {
        if center.len() != patch_size.len() {
            return Err(MedsegError::RankMismatch {
                expected: patch_size.len(),
                actual: center.len(),
            });
        }
        let mut ranges = Vec::with_capacity(center.len());
        for (&c, &p) in center.iter().zip(patch_size) {
            let half = p / 2;
            if c < half {
                return Err(MedsegError::IndexOutOfBounds {
                    index: center.to_vec(),
                    shape: patch_size.to_vec(),
                });
            }
            ranges.push(c - half..c - half + p);
        }
        Ok(PatchSlice { ranges })
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn ndim(&self) -> usize {
        self.ranges.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.end - r.start).collect()
    }

    pub fn fits_within(&self, shape: &[usize]) -> bool {
        self.ranges.len() == shape.len()
            && self
                .ranges
                .iter()
                .zip(shape)
                .all(|(r, &dim)| r.start <= r.end && r.end <= dim)
    }

    /// Restricts the trailing axes of `view` to this patch.
    ///
    /// Leading axes (channels) are kept whole, so the same slice cuts a
    /// `(channels, x, y, z)` case and its `(x, y, z)` label map.
    pub fn apply<'a, T>(&self, mut view: ArrayViewD<'a, T>) -> Result<ArrayViewD<'a, T>, MedsegError> {
        let rank = view.ndim();
        if rank < self.ranges.len() {
            return Err(MedsegError::RankMismatch {
                expected: self.ranges.len(),
                actual: rank,
            });
        }
        let offset = rank - self.ranges.len();
        let spatial = view.shape()[offset..].to_vec();
        if !self.fits_within(&spatial) {
            return Err(MedsegError::IndexOutOfBounds {
                index: self.ranges.iter().map(|r| r.end).collect(),
                shape: spatial,
            });
        }
        for (i, range) in self.ranges.iter().enumerate() {
            view.slice_axis_inplace(Axis(offset + i), Slice::from(range.clone()));
        }
        Ok(view)
    }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod tests;
