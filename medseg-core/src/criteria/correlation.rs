// medseg-core/src/criteria/correlation.rs

use super::{check_same_shape, mean, mean_abs_diff};
use crate::error::MedsegError;
use ndarray::ArrayViewD;

/// Absolute normalised cross correlation between two arrays.
///
/// Arrays with at most one element fall back to the mean absolute
/// difference. A constant array has no defined correlation and gives 0.
pub fn normalised_xcor(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "normalised_xcor")?;
    if x.len() <= 1 {
        return Ok(mean_abs_diff(x, y));
    }
    let mean_x = mean(x);
    let mean_y = mean(y);
    let (mut cross, mut var_x, mut var_y) = (0.0f64, 0.0f64, 0.0f64);
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a as f64 - mean_x;
        let dy = b as f64 - mean_y;
        cross += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator > 0.0 {
        Ok((cross.abs() / denominator) as f32)
    } else {
        Ok(0.0)
    }
}

/// `1 - normalised_xcor(x, y)`, or 0 for empty inputs.
pub fn normalised_xcor_loss(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "normalised_xcor_loss")?;
    if x.is_empty() {
        return Ok(0.0);
    }
    Ok(1.0 - normalised_xcor(x, y)?)
}

fn std_dev(x: &ArrayViewD<f32>, mean: f64) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = x.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
    (sum_sq / (x.len() - 1) as f64).sqrt()
}

/// Bidirectional Mahalanobis distance between the two value distributions.
///
/// The distance from each mean to the other distribution is summed:
/// `(σx + σy) |μx - μy| / (σx σy)`. When either spread is zero the
/// unnormalised numerator is returned.
pub fn mahalanobis_loss(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    let mu_x = mean(x);
    let mu_y = mean(y);
    let sigma_x = std_dev(x, mu_x);
    let sigma_y = std_dev(y, mu_y);
    let mahal = (sigma_x + sigma_y) * (mu_x - mu_y).abs();
    let spread = sigma_x * sigma_y;
    if spread > 0.0 {
        Ok((mahal / spread) as f32)
    } else {
        Ok(mahal as f32)
    }
}

#[cfg(test)]
#[path = "correlation_test.rs"]
mod tests;
