// medseg-data/src/samplers/weighted_subset_test.rs

use super::*;
use approx::assert_relative_eq;
use std::collections::HashSet;

fn seeded(total: usize, sample_div: usize) -> WeightedSubsetRandomSampler {
    let config = CurriculumConfig {
        sample_div,
        seed: Some(17),
        ..CurriculumConfig::default()
    };
    WeightedSubsetRandomSampler::new(total, config).unwrap()
}

fn report_losses(sampler: &mut WeightedSubsetRandomSampler) {
    // Loss grows with the index: high indices are the hard ones.
    let indices = sampler.indices().to_vec();
    let losses: Vec<f32> = indices.iter().map(|&i| i as f32 + 1.0).collect();
    sampler.update_weights(&losses, &indices).unwrap();
}

#[test]
fn test_budget_rounds_up() {
    let sampler = seeded(10, 3);
    assert_eq!(sampler.num_samples(), 4);
    assert_eq!(sampler.len(10), 4);
    assert_eq!(sampler.total_samples(), 10);
}

#[test]
fn test_warm_up_covers_dataset() {
    let mut sampler = seeded(10, 2);
    let mut seen: HashSet<usize> = sampler.iter(10).collect();
    assert_eq!(seen.len(), 5);
    report_losses(&mut sampler);
    sampler.update().unwrap();
    assert_eq!(sampler.step(), 1);
    seen.extend(sampler.iter(10));
    assert_eq!(seen, (0..10).collect::<HashSet<_>>());
}

#[test]
fn test_curriculum_epoch_has_unique_indices() {
    let mut sampler = seeded(20, 2);
    for _ in 0..6 {
        report_losses(&mut sampler);
        sampler.update().unwrap();
        let indices = sampler.indices();
        assert_eq!(indices.len(), 10);
        let unique: HashSet<_> = indices.iter().collect();
        assert_eq!(unique.len(), 10);
        assert!(indices.iter().all(|&i| i < 20));
    }
}

#[test]
fn test_rate_schedule() {
    let mut sampler = seeded(20, 2);
    let mut rates = Vec::new();
    for _ in 0..8 {
        report_losses(&mut sampler);
        sampler.update().unwrap();
        rates.push(sampler.rate());
    }
    // Steps 1..=8: the rate first grows at step 4, then every two steps.
    let expected = [0.1, 0.1, 0.1, 0.15, 0.15, 0.2, 0.2, 0.25];
    for (rate, expected) in rates.iter().zip(expected) {
        assert_relative_eq!(*rate, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_rate_is_capped() {
    let config = CurriculumConfig {
        initial_rate: 0.95,
        rate_increase: 0.1,
        seed: Some(1),
        ..CurriculumConfig::default()
    };
    let mut sampler = WeightedSubsetRandomSampler::new(8, config).unwrap();
    for _ in 0..10 {
        report_losses(&mut sampler);
        sampler.update().unwrap();
        assert!(sampler.rate() <= 1.0);
    }
    assert_relative_eq!(sampler.rate(), 1.0);
    // Every sample is hard now: the epoch holds the heaviest weights.
    assert_eq!(sampler.indices().len(), 4);
}

#[test]
fn test_failed_update_leaves_state_untouched() {
    let mut sampler = seeded(6, 2);
    sampler.update().unwrap();
    // Equal weights leave no positive easy weight.
    sampler.update_weights(&[1.0f32; 6], &[0, 1, 2, 3, 4, 5]).unwrap();
    let before = sampler.indices().to_vec();
    let err = sampler.update().unwrap_err();
    assert!(matches!(err, MedsegError::InsufficientSamples { .. }));
    assert_eq!(sampler.step(), 1);
    assert_eq!(sampler.indices(), before.as_slice());
}

#[test]
fn test_update_weights_errors() {
    let mut sampler = seeded(4, 2);
    assert!(matches!(
        sampler.update_weights(&[1.0f32], &[4]),
        Err(MedsegError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        sampler.update_weights(&[1.0f32, 2.0], &[0]),
        Err(MedsegError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_seed_reproducibility() {
    let mut a = seeded(30, 3);
    let mut b = seeded(30, 3);
    for _ in 0..5 {
        report_losses(&mut a);
        report_losses(&mut b);
        a.update().unwrap();
        b.update().unwrap();
        assert_eq!(a.indices(), b.indices());
    }
}

#[test]
fn test_invalid_config() {
    let config = CurriculumConfig {
        sample_div: 0,
        ..CurriculumConfig::default()
    };
    assert!(WeightedSubsetRandomSampler::new(10, config).is_err());
    assert!(WeightedSubsetRandomSampler::new(0, CurriculumConfig::default()).is_err());
}

#[test]
fn test_hard_count_ignores_rate_rounding() {
    assert_eq!(hard_count(20, 0.1 + 0.05), 3);
    assert_eq!(hard_count(20, 0.16), 4);
    assert_eq!(hard_count(20, 0.0), 0);
    assert_eq!(hard_count(20, 1.0), 20);
}

#[test]
fn test_easy_share_after_first_rate_increase() {
    let mut sampler = seeded(40, 2);
    let all: Vec<usize> = (0..40).collect();
    let distinct: Vec<f64> = all.iter().map(|&i| i as f64 + 1.0).collect();
    sampler.update_weights(&distinct, &all).unwrap();
    for _ in 0..4 {
        sampler.update().unwrap();
    }
    assert_relative_eq!(sampler.rate(), 0.15, epsilon = 1e-12);

    // 17 light samples are the only easy candidates; a budget of 20 at
    // rate 0.15 takes 3 hard and 17 easy ones.
    let weights: Vec<f64> = all.iter().map(|&i| if i < 17 { 1.0 } else { 2.0 }).collect();
    sampler.update_weights(&weights, &all).unwrap();
    sampler.update().unwrap();
    let light = sampler.indices().iter().filter(|&&i| i < 17).count();
    assert_eq!(sampler.indices().len(), 20);
    assert_eq!(light, 17);
}
