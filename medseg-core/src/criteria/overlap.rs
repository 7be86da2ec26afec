// medseg-core/src/criteria/overlap.rs

use super::check_same_shape;
use crate::error::MedsegError;
use ndarray::ArrayViewD;

/// Soft binary Dice similarity coefficient.
///
/// Predictions need not be binarised; targets are expected in `{0, 1}`.
/// Two empty inputs agree perfectly and score 1.
pub fn dice_coefficient(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "dice_coefficient")?;
    let (mut intersection, mut sum_x, mut sum_y) = (0.0f64, 0.0f64, 0.0f64);
    for (&a, &b) in x.iter().zip(y.iter()) {
        intersection += (a * b) as f64;
        sum_x += a as f64;
        sum_y += b as f64;
    }
    let sum_vals = sum_x + sum_y;
    if sum_vals > 0.0 {
        Ok((2.0 * intersection / sum_vals) as f32)
    } else {
        Ok(1.0)
    }
}

/// `1 - dice_coefficient(x, y)`.
pub fn dice_loss(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    Ok(1.0 - dice_coefficient(x, y)?)
}
