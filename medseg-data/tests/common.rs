use ndarray::{ArrayD, IxDyn};

// Shared by several integration test crates; not every crate uses every helper.
#[allow(dead_code)]
pub fn sphere_labels(shape: &[usize], center: &[usize], radius: f64) -> ArrayD<u8> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let dist2: f64 = (0..shape.len())
            .map(|d| (idx[d] as f64 - center[d] as f64).powi(2))
            .sum();
        (dist2 <= radius * radius) as u8
    })
}

/// Two-channel case whose first channel mirrors the labels plus a ramp.
#[allow(dead_code)]
pub fn case_from_labels(labels: &ArrayD<u8>) -> ArrayD<f32> {
    let mut shape = vec![2];
    shape.extend_from_slice(labels.shape());
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let spatial: Vec<usize> = (1..shape.len()).map(|d| idx[d]).collect();
        if idx[0] == 0 {
            labels[spatial.as_slice()] as f32
        } else {
            spatial.iter().sum::<usize>() as f32 / 100.0
        }
    })
}

#[allow(dead_code)]
pub fn body_mask(shape: &[usize], margin: usize) -> ArrayD<u8> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        (0..shape.len()).all(|d| idx[d] >= margin && idx[d] + margin < shape[d]) as u8
    })
}
