pub mod boundary;
pub mod bounding_box;
pub mod cropping;
pub mod traits;

pub use boundary::{BoundaryConfig, BoundaryCroppingDataset};
pub use bounding_box::{BoundingBoxDataset, BoundingBoxTupleDataset, BoundingBoxValueDataset, BoxMode, BoxSample};
pub use cropping::{CroppingConfig, CroppingDataset, PatchSample};
pub use traits::Dataset;

use medseg_core::MedsegError;
use ndarray::{ArrayD, IxDyn};

/// Checks that `cases` is a non-empty list of `(channels, *spatial)` arrays
/// and that every companion volume matches its case's spatial shape.
pub(crate) fn check_volumes(
    cases: &[ArrayD<f32>],
    companions: &[(&str, Option<&[ArrayD<u8>]>)],
) -> Result<(), MedsegError> {
    if cases.is_empty() {
        return Err(MedsegError::EmptyCaseList);
    }
    let spatial_rank = cases[0].ndim().saturating_sub(1);
    for case in cases {
        if case.ndim() < 2 || case.ndim() - 1 != spatial_rank {
            return Err(MedsegError::RankMismatch {
                expected: spatial_rank + 1,
                actual: case.ndim(),
            });
        }
    }
    for (name, volumes) in companions {
        let Some(volumes) = volumes else { continue };
        if volumes.len() != cases.len() {
            return Err(MedsegError::ShapeMismatch {
                expected: format!("{} {}", cases.len(), name),
                actual: format!("{} {}", volumes.len(), name),
                operation: "dataset construction".to_string(),
            });
        }
        for (case, volume) in cases.iter().zip(volumes.iter()) {
            if volume.shape() != &case.shape()[1..] {
                return Err(MedsegError::ShapeMismatch {
                    expected: format!("{:?}", &case.shape()[1..]),
                    actual: format!("{:?}", volume.shape()),
                    operation: format!("dataset construction ({})", name),
                });
            }
        }
    }
    Ok(())
}

/// One all-foreground mask per case, covering its spatial extent.
pub(crate) fn whole_volume_masks(cases: &[ArrayD<f32>]) -> Vec<ArrayD<bool>> {
    cases
        .iter()
        .map(|case| ArrayD::from_elem(IxDyn(&case.shape()[1..]), true))
        .collect()
}
