//! Core building blocks for volumetric segmentation training.
//!
//! `medseg-core` holds what the data crate and the training loop share:
//! the error type, patch geometry over `ndarray` volumes, mask utilities
//! (foreground voxels, bounding boxes, erosion) and the forward-evaluated
//! training criteria.

pub mod criteria;
pub mod error;
pub mod mask;
pub mod patch;

pub use error::MedsegError;
pub use mask::{bounding_box, mask_voxels, BoundingBox, Foreground};
pub use patch::{PatchSize, PatchSlice};

/// Re-export of the array crate so downstream users agree on its version.
pub use ndarray;
