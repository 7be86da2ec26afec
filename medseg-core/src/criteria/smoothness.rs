// medseg-core/src/criteria/smoothness.rs

use super::check_same_shape;
use crate::error::MedsegError;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Slice, Zip};

fn check_field_layout(
    tensor: &ArrayViewD<f32>,
    mask: &ArrayViewD<bool>,
    operation: &str,
) -> Result<(), MedsegError> {
    if tensor.ndim() < 3 {
        return Err(MedsegError::RankMismatch {
            expected: 3,
            actual: tensor.ndim(),
        });
    }
    let mut expected = tensor.shape().to_vec();
    expected[1] = 1;
    if mask.shape() != expected.as_slice() {
        return Err(MedsegError::ShapeMismatch {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", mask.shape()),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn masked_mean(values: &ArrayD<f32>, mask: &ArrayViewD<bool>) -> f32 {
    let mut total = 0.0f64;
    let mut count = 0usize;
    Zip::from(values).and(mask).for_each(|&v, &m| {
        if m {
            total += v as f64;
            count += 1;
        }
    });
    if count == 0 {
        0.0
    } else {
        (total / count as f64) as f32
    }
}

/// Squared central-difference gradient magnitude, summed over channels.
///
/// `tensor` is laid out as `(batch, channels, *spatial)`. Along every
/// spatial axis the gradient at `i` is `0.5 * (t[i - 1] - t[i + 1])`, which
/// lines up with the voxel grid; the first and last voxel of each axis get 0.
/// The result has shape `(batch, 1, *spatial)`.
fn gradient_magnitude(tensor: &ArrayViewD<f32>) -> ArrayD<f32> {
    let mut out_shape = tensor.shape().to_vec();
    out_shape[1] = 1;
    let mut magnitude = ArrayD::<f32>::zeros(IxDyn(&out_shape));
    for axis in 2..tensor.ndim() {
        let n = tensor.len_of(Axis(axis));
        if n < 3 {
            continue;
        }
        let before = tensor.slice_axis(Axis(axis), Slice::from(0..n - 2));
        let after = tensor.slice_axis(Axis(axis), Slice::from(2..n));
        let gradient = (&before - &after) * 0.5;
        let squared = gradient.mapv(|g| g * g).sum_axis(Axis(1)).insert_axis(Axis(1));
        let mut interior = magnitude.slice_axis_mut(Axis(axis), Slice::from(1..n - 1));
        interior += &squared;
    }
    magnitude
}

/// Mean squared gradient magnitude of `tensor` inside `mask`.
///
/// `mask` has shape `(batch, 1, *spatial)`. An empty mask gives 0.
pub fn gradient_mean(tensor: &ArrayViewD<f32>, mask: &ArrayViewD<bool>) -> Result<f32, MedsegError> {
    check_field_layout(tensor, mask, "gradient_mean")?;
    Ok(masked_mean(&gradient_magnitude(tensor), mask))
}

/// Smoothness of the difference image `y - x` inside `mask`.
pub fn subtraction_loss(
    x: &ArrayViewD<f32>,
    y: &ArrayViewD<f32>,
    mask: &ArrayViewD<bool>,
) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "subtraction_loss")?;
    let difference = y - x;
    gradient_mean(&difference.view(), mask)
}

/// `subtraction_loss` scaled by the fraction of voxels inside `mask`.
pub fn weighted_subtraction_loss(
    x: &ArrayViewD<f32>,
    y: &ArrayViewD<f32>,
    mask: &ArrayViewD<bool>,
) -> Result<f32, MedsegError> {
    let loss = subtraction_loss(x, y, mask)?;
    if y.is_empty() {
        return Ok(0.0);
    }
    let inside = mask.iter().filter(|&&m| m).count();
    Ok(inside as f32 / y.len() as f32 * loss)
}

/// Smoothness regulariser for a deformation field of shape
/// `(batch, ndim, *spatial)`.
pub fn deformation_smoothness_loss(df: &ArrayViewD<f32>, mask: &ArrayViewD<bool>) -> Result<f32, MedsegError> {
    gradient_mean(df, mask)
}

/// `mean(exp(-|df|^2))` inside `mask`; decreases as displacements grow.
pub fn deformation_modulo_loss(df: &ArrayViewD<f32>, mask: &ArrayViewD<bool>) -> Result<f32, MedsegError> {
    check_field_layout(df, mask, "deformation_modulo_loss")?;
    let modulo = df.mapv(|v| v * v).sum_axis(Axis(1)).insert_axis(Axis(1));
    Ok(masked_mean(&modulo.mapv(|m| (-m).exp()), mask))
}

#[cfg(test)]
#[path = "smoothness_test.rs"]
mod tests;
