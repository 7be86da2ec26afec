// medseg-data/src/datasets/bounding_box_test.rs

use super::*;
use ndarray::IxDyn;

fn ramp(shape: &[usize]) -> ArrayD<f32> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| (0..shape.len()).map(|d| idx[d] as f32 * 10f32.powi(d as i32)).sum())
}

fn box_mask(shape: &[usize], lo: &[usize], hi: &[usize]) -> ArrayD<u8> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        (0..shape.len()).all(|d| idx[d] >= lo[d] && idx[d] <= hi[d]) as u8
    })
}

fn two_cases() -> (Vec<ArrayD<f32>>, Vec<ArrayD<u8>>) {
    let cases = vec![ramp(&[1, 10, 10]), ramp(&[1, 10, 10])];
    let masks = vec![
        box_mask(&[10, 10], &[2, 3], &[5, 6]),
        box_mask(&[10, 10], &[4, 1], &[7, 4]),
    ];
    (cases, masks)
}

#[test]
fn test_per_case_boxes() {
    let (cases, masks) = two_cases();
    let dataset = BoundingBoxDataset::new(cases, None, masks, BoxMode::PerCase, false).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.boxes()[0].ranges(), &[2..6, 3..7]);
    assert_eq!(dataset.boxes()[1].ranges(), &[4..8, 1..5]);

    let sample = dataset.get(0).unwrap();
    assert_eq!(sample.inputs.shape(), &[1, 4, 4]);
    // The last voxel of the mask box is part of the crop.
    assert_eq!(sample.inputs[IxDyn(&[0, 3, 3])], 650.0);
    assert!(sample.target.is_none());
}

#[test]
fn test_shared_boxes() {
    let (cases, masks) = two_cases();
    let inter = BoundingBoxDataset::new(cases.clone(), None, masks.clone(), BoxMode::Intersection, false).unwrap();
    assert!(inter.boxes().iter().all(|b| b.ranges() == [4..6, 3..5]));

    let union = BoundingBoxDataset::new(cases, None, masks, BoxMode::Union, false).unwrap();
    assert!(union.boxes().iter().all(|b| b.ranges() == [2..8, 1..7]));
    assert_eq!(union.get(1).unwrap().inputs.shape(), &[1, 6, 6]);
}

#[test]
fn test_disjoint_intersection_is_rejected() {
    let cases = vec![ramp(&[1, 10, 10]), ramp(&[1, 10, 10])];
    let masks = vec![
        box_mask(&[10, 10], &[0, 0], &[2, 2]),
        box_mask(&[10, 10], &[6, 6], &[8, 8]),
    ];
    assert!(matches!(
        BoundingBoxDataset::new(cases, None, masks, BoxMode::Intersection, false),
        Err(MedsegError::InvalidConfig(_))
    ));
}

#[test]
fn test_flip_doubles_and_mirrors() {
    let (cases, masks) = two_cases();
    let labels = masks.clone();
    let dataset = BoundingBoxDataset::new(cases, Some(labels), masks, BoxMode::PerCase, true).unwrap();
    assert_eq!(dataset.len(), 4);

    let plain = dataset.get(2).unwrap();
    let flipped = dataset.get(3).unwrap();
    assert_eq!(plain.inputs.shape(), flipped.inputs.shape());
    for x in 0..4 {
        for y in 0..4 {
            assert_eq!(flipped.inputs[IxDyn(&[0, x, y])], plain.inputs[IxDyn(&[0, 3 - x, y])]);
        }
    }
    let target = flipped.target.unwrap();
    assert_eq!(target.shape(), &[1, 4, 4]);
    assert!(target.iter().all(|&v| v == 1));
    assert!(matches!(dataset.get(4), Err(MedsegError::IndexOutOfBounds { .. })));
}

#[test]
fn test_value_dataset() {
    let (cases, masks) = two_cases();
    let dataset = BoundingBoxValueDataset::new(cases.clone(), Some(vec![0.25, 0.75]), masks.clone(), BoxMode::Union).unwrap();
    let sample = dataset.get(1).unwrap();
    assert_eq!(sample.target, Some(0.75));
    assert_eq!(sample.index, 1);
    assert_eq!(sample.inputs.shape(), &[1, 6, 6]);

    assert!(matches!(
        BoundingBoxValueDataset::new(cases, Some(vec![1.0]), masks, BoxMode::Union),
        Err(MedsegError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_tuple_dataset_mix() {
    let cases = vec![ramp(&[1, 8, 8])];
    let mut mask = ArrayD::<u8>::zeros(IxDyn(&[8, 8]));
    mask[[2, 2].as_slice()] = 1;
    mask[[4, 4].as_slice()] = 1;
    let mut labels = ArrayD::<u8>::zeros(IxDyn(&[8, 8]));
    labels[[2, 2].as_slice()] = 1;

    let dataset = BoundingBoxTupleDataset::new(cases, vec![labels], vec![mask], BoxMode::PerCase).unwrap();
    let (label, mix) = dataset.get(0).unwrap().target;
    assert_eq!(label.shape(), &[1, 3, 3]);
    assert_eq!(mix.shape(), &[1, 3, 3]);
    assert_eq!(mix[IxDyn(&[0, 0, 0])], 2);
    assert_eq!(mix[IxDyn(&[0, 2, 2])], 1);
    assert_eq!(mix.iter().map(|&v| v as u32).sum::<u32>(), 3);
}

#[test]
fn test_empty_mask() {
    let cases = vec![ramp(&[1, 4, 4])];
    let masks = vec![ArrayD::<u8>::zeros(IxDyn(&[4, 4]))];
    assert_eq!(
        BoundingBoxDataset::new(cases, None, masks, BoxMode::PerCase, false).unwrap_err(),
        MedsegError::EmptyMask { case: 0 }
    );
}
