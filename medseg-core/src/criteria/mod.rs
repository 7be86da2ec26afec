//! Forward-evaluated training criteria.
//!
//! Every criterion works on `f32` views and returns a scalar. Degenerate
//! inputs (constant arrays, empty masks, collapsed histograms) map to fixed
//! values instead of producing `NaN`.

pub mod batch;
pub mod correlation;
pub mod histogram;
pub mod overlap;
pub mod smoothness;

pub use batch::{per_sample_losses, Criterion};
pub use correlation::{mahalanobis_loss, normalised_xcor, normalised_xcor_loss};
pub use histogram::{
    entropy, histogram, histogram_loss, joint_entropy, joint_histogram, normalised_mi_loss,
    normalised_mutual_information, DEFAULT_BINS,
};
pub use overlap::{dice_coefficient, dice_loss};
pub use smoothness::{
    deformation_modulo_loss, deformation_smoothness_loss, gradient_mean, subtraction_loss,
    weighted_subtraction_loss,
};

use crate::error::MedsegError;
use ndarray::ArrayViewD;

pub(crate) fn check_same_shape<A, B>(
    x: &ArrayViewD<A>,
    y: &ArrayViewD<B>,
    operation: &str,
) -> Result<(), MedsegError> {
    if x.shape() != y.shape() {
        return Err(MedsegError::ShapeMismatch {
            expected: format!("{:?}", x.shape()),
            actual: format!("{:?}", y.shape()),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Mean absolute difference, used when there are too few voxels for
/// statistics. Empty inputs give 0.
pub(crate) fn mean_abs_diff(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    let total: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - b).abs() as f64).sum();
    (total / x.len() as f64) as f32
}

pub(crate) fn mean(x: &ArrayViewD<f32>) -> f64 {
    if x.is_empty() {
        0.0
    } else {
        x.iter().map(|&v| v as f64).sum::<f64>() / x.len() as f64
    }
}
