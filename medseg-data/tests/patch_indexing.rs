use medseg_data::indexing::{balanced_slices, grid_slices, PatchTable};
use medseg_data::{CroppingConfig, CroppingDataset, Dataset, PatchSize};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod common;
use common::{body_mask, case_from_labels, sphere_labels};

#[test]
fn test_every_patch_is_in_bounds_and_full_size() {
    let shape = [20, 18, 16];
    let labels = vec![
        sphere_labels(&shape, &[10, 9, 8], 3.0),
        sphere_labels(&shape, &[3, 3, 3], 2.0),
    ];
    let patch = [6, 5, 4];

    let grids = grid_slices(&labels, &patch, 2, None).unwrap();
    let mut rng = StdRng::seed_from_u64(21);
    let balanced = balanced_slices::<u8, u8, _>(&labels, &patch, None, 0, 1.0, &mut rng).unwrap();

    for table in grids.iter().chain(&balanced) {
        assert!(!table.is_empty());
        for slice in table {
            assert!(slice.fits_within(&shape), "{:?} leaves the volume", slice);
            assert_eq!(slice.shape(), patch.to_vec());
        }
    }
}

#[test]
fn test_balanced_counts_match_foreground() {
    let shape = [24, 24, 24];
    let labels = vec![sphere_labels(&shape, &[12, 12, 12], 2.0)];
    let rois = vec![body_mask(&shape, 2)];
    let foreground = labels[0].iter().filter(|&&v| v > 0).count();

    let mut rng = StdRng::seed_from_u64(4);
    let tables = balanced_slices(&labels, &[8, 8, 8], Some(rois.as_slice()), 0, 0.5, &mut rng).unwrap();
    let expected_background = (0.5 * foreground as f64).round() as usize;
    assert_eq!(tables[0].len(), foreground + expected_background);
}

#[test]
fn test_dataset_index_space() {
    let shape = [16, 16, 16];
    let labels = vec![
        sphere_labels(&shape, &[8, 8, 8], 2.5),
        sphere_labels(&shape, &[5, 9, 7], 1.5),
        sphere_labels(&shape, &[10, 4, 11], 2.0),
    ];
    let cases: Vec<_> = labels.iter().map(case_from_labels).collect();
    let masks: Vec<_> = labels.iter().map(|_| body_mask(&shape, 1)).collect();
    let config = CroppingConfig {
        patch_size: PatchSize::PerAxis(vec![6, 6, 4]),
        neg_ratio: 2.0,
        seed: Some(8),
        ..CroppingConfig::default()
    };
    let dataset = CroppingDataset::new(cases, Some(labels), Some(masks), config).unwrap();

    let per_case: Vec<Vec<_>> = (0..dataset.num_cases())
        .map(|c| dataset.table().case_slices(c).unwrap().to_vec())
        .collect();
    assert_eq!(PatchTable::new(per_case).len(), dataset.len());

    let mut last_case = 0;
    for i in 0..dataset.len() {
        let sample = dataset.get(i).unwrap();
        assert!(sample.case >= last_case, "case mapping must be monotonic");
        last_case = sample.case;
        assert_eq!(sample.inputs.shape(), &[2, 6, 6, 4]);
        assert_eq!(sample.target.unwrap().shape(), &[1, 6, 6, 4]);
    }
    assert_eq!(last_case, 2);
    assert!(dataset.get(dataset.len()).is_err());
}
