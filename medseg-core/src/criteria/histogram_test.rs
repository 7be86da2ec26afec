// medseg-core/src/criteria/histogram_test.rs

use super::*;
use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};

fn array(data: Vec<f32>) -> ArrayD<f32> {
    let len = data.len();
    ArrayD::from_shape_vec(IxDyn(&[len]), data).expect("Test array creation failed")
}

#[test]
fn test_histogram_counts() {
    // Range [0, 4] in 4 bins of width 1; the value 4.0 sits on the top edge.
    let x = array(vec![0.0, 0.5, 1.2, 3.9, 4.0]);
    let h = histogram(&x.view(), 4).unwrap();
    assert_eq!(h.len(), 4);
    assert_relative_eq!(h[0], 0.5);
    assert_relative_eq!(h[1], 0.25);
    assert_relative_eq!(h[2], 0.0);
    assert_relative_eq!(h[3], 0.25);
}

#[test]
fn test_histogram_degenerate() {
    let x = array(vec![3.0, 3.0, 3.0]);
    assert!(histogram(&x.view(), 10).is_none());
    assert_eq!(entropy(&x.view(), 10), 0.0);
    // Non-integer constants still span one integer step after floor/ceil.
    let y = array(vec![2.5, 2.5]);
    assert!(histogram(&y.view(), 10).is_some());
}

#[test]
fn test_histogram_sums_to_one() {
    let x = array((0..50).map(|i| (i as f32 * 0.37).sin() * 10.0).collect());
    let h = histogram(&x.view(), DEFAULT_BINS).unwrap();
    assert_relative_eq!(h.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_joint_histogram() -> Result<(), MedsegError> {
    let x = array(vec![0.0, 1.0, 0.0, 1.0]);
    let y = array(vec![0.0, 0.0, 1.0, 1.0]);
    // With 2 bins over [0, 1] the value 1.0 is on the top edge, so only
    // the (0, 0) pair is counted.
    let h = joint_histogram(&x.view(), &y.view(), 2)?.unwrap();
    assert_eq!(h, vec![1.0, 0.0, 0.0, 0.0]);
    Ok(())
}

#[test]
fn test_entropy_uniform() {
    let x = array(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    // Four populated bins of equal mass, the top edge value is dropped.
    assert_relative_eq!(entropy(&x.view(), 4), (4.0f32).ln(), epsilon = 1e-6);
}

#[test]
fn test_nmi_identical_is_one() -> Result<(), MedsegError> {
    let x = array((0..200).map(|i| (i % 17) as f32 + 0.5).collect());
    assert_relative_eq!(normalised_mutual_information(&x.view(), &x.view())?, 1.0, epsilon = 1e-5);
    assert_relative_eq!(normalised_mi_loss(&x.view(), &x.view())?, 0.0, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_nmi_constant_reference() -> Result<(), MedsegError> {
    let x = array(vec![1.0; 8]);
    let y = array((0..8).map(|i| i as f32).collect());
    assert_eq!(normalised_mutual_information(&x.view(), &y.view())?, 0.0);
    Ok(())
}

#[test]
fn test_histogram_loss() {
    let x = array((0..100).map(|i| i as f32 / 10.0).collect());
    assert_relative_eq!(histogram_loss(&x.view(), &x.view()), 0.0);
    let constant = array(vec![5.0; 100]);
    assert_eq!(histogram_loss(&x.view(), &constant.view()), 1.0);
}
