use thiserror::Error;

/// Error type shared by every medseg crate.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum MedsegError {
    #[error("Shape mismatch: expected {expected}, got {actual} during operation {operation}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Rank mismatch: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// The bounding box of a mask without foreground voxels is undefined.
    #[error("Mask {case} has no foreground voxels; its bounding box is undefined")]
    EmptyMask { case: usize },

    #[error("Insufficient samples: requested {requested} distinct indices but only {available} have a positive weight")]
    InsufficientSamples { requested: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot build a dataset from an empty list of cases")]
    EmptyCaseList,
}
