// medseg-data/src/datasets/bounding_box.rs

use super::check_volumes;
use super::traits::Dataset;
use log::debug;
use medseg_core::mask::{bounding_box, BoundingBox};
use medseg_core::{MedsegError, PatchSlice};
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};

/// How the crop box of each case is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxMode {
    /// Every case is cropped to its own mask's bounding box.
    #[default]
    PerCase,
    /// One box shared by all cases: the region common to every mask box.
    Intersection,
    /// One box shared by all cases: the smallest box holding every mask box.
    Union,
}

/// One cropped case.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSample<T> {
    /// Cropped case, `(channels, *box_shape)`.
    pub inputs: ArrayD<f32>,
    pub target: T,
    /// Index of the item in its dataset.
    pub index: usize,
}

fn out_of_bounds(index: usize, len: usize) -> MedsegError {
    MedsegError::IndexOutOfBounds {
        index: vec![index],
        shape: vec![len],
    }
}

/// Cases and the crop box of each one.
#[derive(Debug, Clone)]
struct CroppedCases {
    cases: Vec<ArrayD<f32>>,
    boxes: Vec<PatchSlice>,
}

impl CroppedCases {
    fn new(cases: Vec<ArrayD<f32>>, masks: &[ArrayD<u8>], mode: BoxMode) -> Result<Self, MedsegError> {
        let mut boxes = Vec::with_capacity(masks.len());
        for (case, mask) in masks.iter().enumerate() {
            boxes.push(bounding_box(&mask.view()).ok_or(MedsegError::EmptyMask { case })?);
        }
        let Some((first, rest)) = boxes.split_first() else {
            return Err(MedsegError::EmptyCaseList);
        };

        let slices: Vec<PatchSlice> = match mode {
            BoxMode::PerCase => boxes.iter().map(BoundingBox::to_patch_slice).collect(),
            BoxMode::Intersection => {
                let shared = rest
                    .iter()
                    .try_fold(first.clone(), |acc, bb| acc.intersection(bb))
                    .ok_or_else(|| {
                        MedsegError::InvalidConfig("the mask bounding boxes have no common region".to_string())
                    })?;
                vec![shared.to_patch_slice(); cases.len()]
            }
            BoxMode::Union => {
                let shared = rest.iter().fold(first.clone(), |acc, bb| acc.union(bb));
                vec![shared.to_patch_slice(); cases.len()]
            }
        };

        for (case, slice) in cases.iter().zip(&slices) {
            if !slice.fits_within(&case.shape()[1..]) {
                return Err(MedsegError::ShapeMismatch {
                    expected: format!("a case holding {:?}", slice.ranges()),
                    actual: format!("{:?}", &case.shape()[1..]),
                    operation: "bounding box crop".to_string(),
                });
            }
        }
        debug!("{:?} crop boxes for {} cases", mode, cases.len());
        Ok(CroppedCases { cases, boxes: slices })
    }

    fn len(&self) -> usize {
        self.cases.len()
    }

    fn crop<'a, T>(&self, case: usize, volume: &'a ArrayD<T>) -> Result<ArrayViewD<'a, T>, MedsegError> {
        self.boxes[case].apply(volume.view())
    }

    fn inputs(&self, case: usize) -> Result<ArrayViewD<'_, f32>, MedsegError> {
        self.crop(case, &self.cases[case])
    }
}

/// Whole cases cropped to their mask bounding box, with optional labels.
///
/// With `flip`, every case appears twice: odd indices return the crop
/// mirrored along the first spatial axis.
#[derive(Debug, Clone)]
pub struct BoundingBoxDataset {
    cropped: CroppedCases,
    labels: Option<Vec<ArrayD<u8>>>,
    flip: bool,
}

impl BoundingBoxDataset {
    pub fn new(
        cases: Vec<ArrayD<f32>>,
        labels: Option<Vec<ArrayD<u8>>>,
        masks: Vec<ArrayD<u8>>,
        mode: BoxMode,
        flip: bool,
    ) -> Result<Self, MedsegError> {
        check_volumes(&cases, &[("labels", labels.as_deref()), ("masks", Some(masks.as_slice()))])?;
        let cropped = CroppedCases::new(cases, &masks, mode)?;
        Ok(BoundingBoxDataset { cropped, labels, flip })
    }

    /// Crop box of every case.
    pub fn boxes(&self) -> &[PatchSlice] {
        &self.cropped.boxes
    }
}

impl Dataset for BoundingBoxDataset {
    type Item = BoxSample<Option<ArrayD<u8>>>;

    fn get(&self, index: usize) -> Result<Self::Item, MedsegError> {
        if index >= self.len() {
            return Err(out_of_bounds(index, self.len()));
        }
        let (case, flipped) = if self.flip { (index / 2, index % 2 == 1) } else { (index, false) };

        let mut inputs = self.cropped.inputs(case)?;
        if flipped {
            inputs.invert_axis(Axis(1));
        }
        let target = match &self.labels {
            Some(labels) => {
                let mut target = self.cropped.crop(case, &labels[case])?.insert_axis(Axis(0));
                if flipped {
                    target.invert_axis(Axis(1));
                }
                Some(target.to_owned())
            }
            None => None,
        };
        Ok(BoxSample {
            inputs: inputs.to_owned(),
            target,
            index,
        })
    }

    fn len(&self) -> usize {
        if self.flip {
            self.cropped.len() * 2
        } else {
            self.cropped.len()
        }
    }
}

/// Cropped cases paired with one scalar value each (e.g. a clinical score).
#[derive(Debug, Clone)]
pub struct BoundingBoxValueDataset {
    cropped: CroppedCases,
    values: Option<Vec<f32>>,
}

impl BoundingBoxValueDataset {
    pub fn new(
        cases: Vec<ArrayD<f32>>,
        values: Option<Vec<f32>>,
        masks: Vec<ArrayD<u8>>,
        mode: BoxMode,
    ) -> Result<Self, MedsegError> {
        check_volumes(&cases, &[("masks", Some(masks.as_slice()))])?;
        if let Some(values) = &values {
            if values.len() != cases.len() {
                return Err(MedsegError::ShapeMismatch {
                    expected: format!("{} values", cases.len()),
                    actual: format!("{} values", values.len()),
                    operation: "BoundingBoxValueDataset::new".to_string(),
                });
            }
        }
        let cropped = CroppedCases::new(cases, &masks, mode)?;
        Ok(BoundingBoxValueDataset { cropped, values })
    }
}

impl Dataset for BoundingBoxValueDataset {
    type Item = BoxSample<Option<f32>>;

    fn get(&self, index: usize) -> Result<Self::Item, MedsegError> {
        if index >= self.len() {
            return Err(out_of_bounds(index, self.len()));
        }
        Ok(BoxSample {
            inputs: self.cropped.inputs(index)?.to_owned(),
            target: self.values.as_ref().map(|values| values[index]),
            index,
        })
    }

    fn len(&self) -> usize {
        self.cropped.len()
    }
}

/// Cropped cases with two targets: the label crop and a three-level map
/// (0 outside the mask, 1 inside the mask, 2 on labelled voxels inside the
/// mask).
#[derive(Debug, Clone)]
pub struct BoundingBoxTupleDataset {
    cropped: CroppedCases,
    labels: Vec<ArrayD<u8>>,
    masks: Vec<ArrayD<u8>>,
}

impl BoundingBoxTupleDataset {
    pub fn new(
        cases: Vec<ArrayD<f32>>,
        labels: Vec<ArrayD<u8>>,
        masks: Vec<ArrayD<u8>>,
        mode: BoxMode,
    ) -> Result<Self, MedsegError> {
        check_volumes(&cases, &[("labels", Some(labels.as_slice())), ("masks", Some(masks.as_slice()))])?;
        let cropped = CroppedCases::new(cases, &masks, mode)?;
        Ok(BoundingBoxTupleDataset { cropped, labels, masks })
    }
}

impl Dataset for BoundingBoxTupleDataset {
    type Item = BoxSample<(ArrayD<u8>, ArrayD<u8>)>;

    fn get(&self, index: usize) -> Result<Self::Item, MedsegError> {
        if index >= self.len() {
            return Err(out_of_bounds(index, self.len()));
        }
        let labels = self.cropped.crop(index, &self.labels[index])?;
        let masks = self.cropped.crop(index, &self.masks[index])?;
        let mix = Zip::from(&labels)
            .and(&masks)
            .map_collect(|&l, &m| (l > 0) as u8 + (m > 0) as u8);
        Ok(BoxSample {
            inputs: self.cropped.inputs(index)?.to_owned(),
            target: (labels.to_owned().insert_axis(Axis(0)), mix.insert_axis(Axis(0))),
            index,
        })
    }

    fn len(&self) -> usize {
        self.cropped.len()
    }
}

#[cfg(test)]
#[path = "bounding_box_test.rs"]
mod tests;
