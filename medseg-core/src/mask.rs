// medseg-core/src/mask.rs

use crate::patch::PatchSlice;
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use num_traits::Zero;

/// Element types that can mark a voxel as foreground.
///
/// Numeric labels are foreground when strictly positive.
pub trait Foreground {
    fn is_foreground(&self) -> bool;
}

impl Foreground for bool {
    fn is_foreground(&self) -> bool {
        *self
    }
}

macro_rules! impl_foreground {
    ($($t:ty),*) => {
        $(
            impl Foreground for $t {
                fn is_foreground(&self) -> bool {
                    *self > <$t as Zero>::zero()
                }
            }
        )*
    };
}

impl_foreground!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// Axis-aligned box, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    min: Vec<usize>,
    max: Vec<usize>,
}

impl BoundingBox {
    pub fn new(min: Vec<usize>, max: Vec<usize>) -> Self {
        debug_assert_eq!(min.len(), max.len());
        BoundingBox { min, max }
    }

    pub fn min(&self) -> &[usize] {
        &self.min
    }

    pub fn max(&self) -> &[usize] {
        &self.max
    }

    pub fn ndim(&self) -> usize {
        self.min.len()
    }

    pub fn contains(&self, voxel: &[usize]) -> bool {
        voxel.len() == self.ndim()
            && voxel
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Common region of both boxes, `None` when they do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min: Vec<usize> = self.min.iter().zip(&other.min).map(|(a, b)| *a.max(b)).collect();
        let max: Vec<usize> = self.max.iter().zip(&other.max).map(|(a, b)| *a.min(b)).collect();
        if min.iter().zip(&max).any(|(lo, hi)| lo > hi) {
            None
        } else {
            Some(BoundingBox { min, max })
        }
    }

    /// Smallest box holding both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.iter().zip(&other.min).map(|(a, b)| *a.min(b)).collect(),
            max: self.max.iter().zip(&other.max).map(|(a, b)| *a.max(b)).collect(),
        }
    }

    /// Clamps every coordinate of the box into `limits`.
    pub fn clamp_into(&self, limits: &BoundingBox) -> BoundingBox {
        let clamp = |v: usize, d: usize| v.clamp(limits.min[d], limits.max[d]);
        BoundingBox {
            min: self.min.iter().enumerate().map(|(d, &v)| clamp(v, d)).collect(),
            max: self.max.iter().enumerate().map(|(d, &v)| clamp(v, d)).collect(),
        }
    }

    /// Half-open slice covering every voxel of the box.
    pub fn to_patch_slice(&self) -> PatchSlice {
        PatchSlice::new(self.min.iter().zip(&self.max).map(|(&lo, &hi)| lo..hi + 1).collect())
    }
}

/// Coordinates of every foreground voxel, in row-major order.
pub fn mask_voxels<T: Foreground>(mask: &ArrayViewD<T>) -> Vec<Vec<usize>> {
    let ndim = mask.ndim();
    mask.indexed_iter()
        .filter(|(_, v)| v.is_foreground())
        .map(|(idx, _)| (0..ndim).map(|d| idx[d]).collect())
        .collect()
}

/// Number of foreground voxels.
pub fn foreground_count<T: Foreground>(mask: &ArrayViewD<T>) -> usize {
    mask.iter().filter(|v| v.is_foreground()).count()
}

/// Bounding box of the foreground, `None` for an empty mask.
pub fn bounding_box<T: Foreground>(mask: &ArrayViewD<T>) -> Option<BoundingBox> {
    let ndim = mask.ndim();
    let mut min = vec![usize::MAX; ndim];
    let mut max = vec![0; ndim];
    let mut found = false;
    for (idx, v) in mask.indexed_iter() {
        if !v.is_foreground() {
            continue;
        }
        found = true;
        for d in 0..ndim {
            min[d] = min[d].min(idx[d]);
            max[d] = max[d].max(idx[d]);
        }
    }
    if found {
        Some(BoundingBox { min, max })
    } else {
        None
    }
}

/// Boolean version of a label map.
pub fn to_binary<T: Foreground>(mask: &ArrayViewD<T>) -> ArrayD<bool> {
    mask.map(|v| v.is_foreground())
}

/// Binary erosion with the cross-shaped (face-connected) structuring
/// element. Voxels outside the array count as background, so foreground on
/// the array border is always eroded.
pub fn binary_erosion(mask: &ArrayViewD<bool>) -> ArrayD<bool> {
    let shape = mask.shape().to_vec();
    let mut neighbour = vec![0usize; shape.len()];
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        if !mask[idx.clone()] {
            return false;
        }
        for d in 0..shape.len() {
            if idx[d] == 0 || idx[d] + 1 >= shape[d] {
                return false;
            }
            for (n, i) in neighbour.iter_mut().enumerate() {
                *i = idx[n];
            }
            neighbour[d] = idx[d] - 1;
            if !mask[neighbour.as_slice()] {
                return false;
            }
            neighbour[d] = idx[d] + 1;
            if !mask[neighbour.as_slice()] {
                return false;
            }
        }
        true
    })
}

/// Inner boundary of a binary mask: the voxels removed by one erosion.
pub fn boundary(mask: &ArrayViewD<bool>) -> ArrayD<bool> {
    let eroded = binary_erosion(mask);
    ndarray::Zip::from(mask)
        .and(&eroded)
        .map_collect(|&m, &e| m && !e)
}

#[cfg(test)]
#[path = "mask_test.rs"]
mod tests;
