// medseg-core/src/criteria/correlation_test.rs

use super::*;
use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};

fn array(data: Vec<f32>, shape: &[usize]) -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(shape), data).expect("Test array creation failed")
}

#[test]
fn test_xcor_affine_copy() -> Result<(), MedsegError> {
    let x = array(vec![1.0, 2.0, 4.0, 7.0], &[2, 2]);
    let y = x.mapv(|v| 3.0 * v - 2.0);
    assert_relative_eq!(normalised_xcor(&x.view(), &y.view())?, 1.0, epsilon = 1e-6);
    assert_relative_eq!(normalised_xcor_loss(&x.view(), &y.view())?, 0.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_xcor_is_absolute() -> Result<(), MedsegError> {
    let x = array(vec![1.0, 2.0, 3.0], &[3]);
    let y = array(vec![3.0, 2.0, 1.0], &[3]);
    assert_relative_eq!(normalised_xcor(&x.view(), &y.view())?, 1.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_xcor_constant_input() -> Result<(), MedsegError> {
    let x = array(vec![2.0; 4], &[4]);
    let y = array(vec![1.0, 2.0, 3.0, 4.0], &[4]);
    let value = normalised_xcor(&x.view(), &y.view())?;
    assert!(!value.is_nan());
    assert_eq!(value, 0.0);
    Ok(())
}

#[test]
fn test_xcor_single_voxel_fallback() -> Result<(), MedsegError> {
    let x = array(vec![2.0], &[1]);
    let y = array(vec![-1.0], &[1]);
    assert_relative_eq!(normalised_xcor(&x.view(), &y.view())?, 3.0);
    Ok(())
}

#[test]
fn test_xcor_loss_empty() -> Result<(), MedsegError> {
    let x = array(vec![], &[0]);
    assert_eq!(normalised_xcor_loss(&x.view(), &x.view())?, 0.0);
    Ok(())
}

#[test]
fn test_xcor_shape_mismatch() {
    let x = array(vec![1.0, 2.0], &[2]);
    let y = array(vec![1.0, 2.0, 3.0], &[3]);
    assert!(matches!(
        normalised_xcor(&x.view(), &y.view()),
        Err(MedsegError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_mahalanobis() -> Result<(), MedsegError> {
    // mean 2, sample std 1 for both; means differ by 2.
    let x = array(vec![1.0, 2.0, 3.0], &[3]);
    let y = array(vec![3.0, 4.0, 5.0], &[3]);
    assert_relative_eq!(mahalanobis_loss(&x.view(), &y.view())?, 4.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_mahalanobis_zero_spread() -> Result<(), MedsegError> {
    let x = array(vec![1.0, 1.0, 1.0], &[3]);
    let y = array(vec![3.0, 4.0, 5.0], &[3]);
    // Only the numerator remains: (0 + 1) * |1 - 4|.
    assert_relative_eq!(mahalanobis_loss(&x.view(), &y.view())?, 3.0, epsilon = 1e-6);
    Ok(())
}
