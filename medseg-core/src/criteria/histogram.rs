// medseg-core/src/criteria/histogram.rs

use super::{check_same_shape, mean_abs_diff};
use crate::error::MedsegError;
use log::debug;
use ndarray::ArrayViewD;

pub const DEFAULT_BINS: usize = 100;

/// Integer-aligned value range `[floor(min), ceil(max)]`, `None` when it
/// collapses to a single value.
fn value_range(x: &ArrayViewD<f32>) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in x.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let (lo, hi) = (min.floor(), max.ceil());
    if hi > lo && lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

/// Bin of `v` in `bins` equal half-open steps starting at `lo`. The top
/// edge belongs to no bin.
fn bin_of(v: f32, lo: f32, step: f32, bins: usize) -> Option<usize> {
    let bin = ((v - lo) / step).floor();
    if bin >= 0.0 && (bin as usize) < bins {
        Some(bin as usize)
    } else {
        None
    }
}

fn normalise(counts: Vec<usize>) -> Vec<f32> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts.into_iter().map(|c| c as f32 / total as f32).collect()
}

/// Normalised histogram of `x` with `bins` equal bins between the floor of
/// its minimum and the ceiling of its maximum.
///
/// Returns `None` for a degenerate range (constant integer-valued input)
/// or zero bins.
pub fn histogram(x: &ArrayViewD<f32>, bins: usize) -> Option<Vec<f32>> {
    if bins == 0 {
        return None;
    }
    let (lo, hi) = value_range(x)?;
    let step = (hi - lo) / bins as f32;
    let mut counts = vec![0usize; bins];
    for &v in x.iter() {
        if let Some(b) = bin_of(v, lo, step, bins) {
            counts[b] += 1;
        }
    }
    Some(normalise(counts))
}

/// Normalised joint histogram of two equally shaped arrays, flattened
/// row-major with `x` bins as rows.
pub fn joint_histogram(
    x: &ArrayViewD<f32>,
    y: &ArrayViewD<f32>,
    bins: usize,
) -> Result<Option<Vec<f32>>, MedsegError> {
    check_same_shape(x, y, "joint_histogram")?;
    if bins == 0 {
        return Ok(None);
    }
    let (Some((lo_x, hi_x)), Some((lo_y, hi_y))) = (value_range(x), value_range(y)) else {
        return Ok(None);
    };
    let step_x = (hi_x - lo_x) / bins as f32;
    let step_y = (hi_y - lo_y) / bins as f32;
    let mut counts = vec![0usize; bins * bins];
    for (&a, &b) in x.iter().zip(y.iter()) {
        if let (Some(i), Some(j)) = (bin_of(a, lo_x, step_x, bins), bin_of(b, lo_y, step_y, bins)) {
            counts[i * bins + j] += 1;
        }
    }
    Ok(Some(normalise(counts)))
}

fn shannon(h: &[f32]) -> f32 {
    -h.iter().filter(|&&p| p > 0.0).map(|&p| p * p.ln()).sum::<f32>()
}

/// Shannon entropy (nats) of the histogram of `x`; 0 when the histogram is
/// degenerate.
pub fn entropy(x: &ArrayViewD<f32>, bins: usize) -> f32 {
    histogram(x, bins).map(|h| shannon(&h)).unwrap_or(0.0)
}

/// Joint entropy of two arrays; 0 when either histogram is degenerate.
pub fn joint_entropy(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>, bins: usize) -> Result<f32, MedsegError> {
    Ok(joint_histogram(x, y, bins)?.map(|h| shannon(&h)).unwrap_or(0.0))
}

/// Mutual information normalised by the entropy of `x`:
/// `(H(x) + H(y) - H(x, y)) / H(x)`.
///
/// Arrays with at most one element fall back to the mean absolute
/// difference; `H(x) == 0` gives 0.
pub fn normalised_mutual_information(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "normalised_mutual_information")?;
    if x.len() <= 1 {
        return Ok(mean_abs_diff(x, y));
    }
    let entr_x = entropy(x, DEFAULT_BINS);
    if entr_x <= 0.0 {
        return Ok(0.0);
    }
    let entr_y = entropy(y, DEFAULT_BINS);
    let entr_xy = joint_entropy(x, y, DEFAULT_BINS)?;
    Ok((entr_x + entr_y - entr_xy) / entr_x)
}

/// `1 - normalised_mutual_information(x, y)`, or 0 for empty inputs.
pub fn normalised_mi_loss(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
    check_same_shape(x, y, "normalised_mi_loss")?;
    if x.is_empty() {
        return Ok(0.0);
    }
    Ok(1.0 - normalised_mutual_information(x, y)?)
}

/// Half the L1 distance between the two normalised histograms, in `[0, 1]`.
///
/// If either histogram is degenerate the maximum loss of 1 is returned.
pub fn histogram_loss(x: &ArrayViewD<f32>, y: &ArrayViewD<f32>) -> f32 {
    match (histogram(x, DEFAULT_BINS), histogram(y, DEFAULT_BINS)) {
        (Some(hx), Some(hy)) => hx.iter().zip(&hy).map(|(a, b)| (a - b).abs()).sum::<f32>() / 2.0,
        _ => {
            debug!("histogram_loss: constant input, histogram undefined");
            1.0
        }
    }
}

#[cfg(test)]
#[path = "histogram_test.rs"]
mod tests;
