// medseg-core/src/criteria/batch.rs

use super::{correlation, histogram, overlap};
use crate::error::MedsegError;
use ndarray::{ArrayViewD, Axis};
use std::str::FromStr;

/// Pairwise criteria that can be selected by name, e.g. from a training
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Dice,
    NormalisedXcor,
    NormalisedMutualInformation,
    Histogram,
    Mahalanobis,
}

impl FromStr for Criterion {
    type Err = MedsegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dice" | "dsc" => Ok(Criterion::Dice),
            "xcor" | "ncc" => Ok(Criterion::NormalisedXcor),
            "mi" | "nmi" => Ok(Criterion::NormalisedMutualInformation),
            "histogram" => Ok(Criterion::Histogram),
            "mahalanobis" => Ok(Criterion::Mahalanobis),
            _ => Err(MedsegError::InvalidConfig(format!("Unsupported criterion: {}", s))),
        }
    }
}

impl Criterion {
    /// Loss value of `prediction` against `target`.
    pub fn evaluate(&self, prediction: &ArrayViewD<f32>, target: &ArrayViewD<f32>) -> Result<f32, MedsegError> {
        match self {
            Criterion::Dice => overlap::dice_loss(prediction, target),
            Criterion::NormalisedXcor => correlation::normalised_xcor_loss(prediction, target),
            Criterion::NormalisedMutualInformation => histogram::normalised_mi_loss(prediction, target),
            Criterion::Histogram => Ok(histogram::histogram_loss(prediction, target)),
            Criterion::Mahalanobis => correlation::mahalanobis_loss(prediction, target),
        }
    }
}

/// Evaluates `criterion` separately on each item of the leading (batch)
/// axis.
///
/// The returned losses are in batch order, ready to be handed to a weighted
/// sampler together with the batch's sample indices.
pub fn per_sample_losses<F>(
    prediction: &ArrayViewD<f32>,
    target: &ArrayViewD<f32>,
    criterion: F,
) -> Result<Vec<f32>, MedsegError>
where
    F: Fn(&ArrayViewD<f32>, &ArrayViewD<f32>) -> Result<f32, MedsegError>,
{
    if prediction.ndim() == 0 || prediction.shape()[0] != target.shape().first().copied().unwrap_or(0) {
        return Err(MedsegError::ShapeMismatch {
            expected: format!("{:?}", prediction.shape()),
            actual: format!("{:?}", target.shape()),
            operation: "per_sample_losses".to_string(),
        });
    }
    prediction
        .axis_iter(Axis(0))
        .zip(target.axis_iter(Axis(0)))
        .map(|(p, t)| criterion(&p, &t))
        .collect()
}
