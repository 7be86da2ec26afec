//! Exemple de boucle d'entraînement avec un sampler "curriculum"
//!
//! Des volumes synthétiques (une sphère lésionnelle par cas) sont découpés en patches équilibrés,
//! puis chaque epoch tire un sous-ensemble de patches selon les pertes observées à l'epoch précédente.

use medseg_core::criteria::{per_sample_losses, Criterion};
use medseg_data::{
    collate_patches, CroppingConfig, CroppingDataset, CurriculumConfig, DataLoader, Dataset, PatchSize,
    WeightedSubsetRandomSampler,
};
use ndarray::{ArrayD, IxDyn};

fn synthetic_case(shape: &[usize], center: &[usize], radius: f64) -> (ArrayD<f32>, ArrayD<u8>) {
    let labels = ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let dist2: f64 = (0..shape.len()).map(|d| (idx[d] as f64 - center[d] as f64).powi(2)).sum();
        (dist2 <= radius * radius) as u8
    });
    let mut case_shape = vec![1];
    case_shape.extend_from_slice(shape);
    let case = ArrayD::from_shape_fn(IxDyn(&case_shape), |idx| {
        let spatial: Vec<usize> = (1..case_shape.len()).map(|d| idx[d]).collect();
        labels[spatial.as_slice()] as f32 * 0.8 + (spatial[0] % 3) as f32 * 0.1
    });
    (case, labels)
}

fn main() {
    let shape = [24, 24, 24];
    let (cases, labels): (Vec<_>, Vec<_>) = [([12, 12, 12], 3.0), ([8, 14, 10], 2.0), ([15, 9, 13], 2.5)]
        .iter()
        .map(|(center, radius)| synthetic_case(&shape, center, *radius))
        .unzip();

    let config = CroppingConfig {
        patch_size: PatchSize::Uniform(8),
        neg_ratio: 1.0,
        seed: Some(42),
        ..CroppingConfig::default()
    };
    let dataset = CroppingDataset::new(cases, Some(labels), None, config).expect("Volumes compatibles");
    println!("{} patches sur {} cas", dataset.len(), dataset.num_cases());

    let sampler = WeightedSubsetRandomSampler::new(
        dataset.len(),
        CurriculumConfig {
            seed: Some(7),
            ..CurriculumConfig::default()
        },
    )
    .expect("Configuration valide");
    let mut loader = DataLoader::new(dataset, 16, sampler, false, None).with_parallel(true);
    let criterion: Criterion = "dice".parse().expect("Critère connu");

    for epoch in 0..8 {
        let mut epoch_loss = 0.0;
        let mut count = 0;
        while let Some(batch) = loader.next() {
            let batch = collate_patches(batch.expect("Pas d'erreur attendue")).expect("Patches empilables");
            let Some(targets) = batch.targets else { continue };
            let targets = targets.mapv(|v| v as f32);
            // Prédiction fictive : le canal d'entrée seuillé, qui manque une partie de la lésion.
            let prediction = batch.inputs.mapv(|v| if v > 0.85 { 1.0 } else { 0.0 });
            let losses = per_sample_losses(&prediction.view(), &targets.view(), |p, t| criterion.evaluate(p, t))
                .expect("Formes identiques");
            epoch_loss += losses.iter().sum::<f32>();
            count += losses.len();
            loader
                .sampler_mut()
                .update_weights(&losses, &batch.indices)
                .expect("Indices valides");
        }
        let sampler = loader.sampler();
        println!(
            "Epoch {epoch} : {count} patches, perte moyenne {:.4}, taux difficile {:.2}",
            epoch_loss / count.max(1) as f32,
            sampler.rate()
        );
        if let Err(e) = loader.sampler_mut().update() {
            println!("Arrêt du curriculum : {e}");
            break;
        }
        loader.reset();
    }

    println!("Taille des patches : {:?}", loader.dataset().patch_size());
}
