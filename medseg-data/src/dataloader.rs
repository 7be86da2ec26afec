// dataloader.rs
//! # DataLoader
//!
//! Le module `DataLoader` regroupe les indices d'un sampler en batches et récupère les patches correspondants dans un dataset.
//!
//! ## Exemple d'utilisation basique
//!
//! ```rust
//! use medseg_data::dataloader::DataLoader;
//! use medseg_data::datasets::{CroppingConfig, CroppingDataset};
//! use medseg_data::samplers::SequentialSampler;
//! use medseg_data::PatchSize;
//! use ndarray::{ArrayD, IxDyn};
//!
//! let cases = vec![ArrayD::<f32>::zeros(IxDyn(&[1, 8, 8]))];
//! let config = CroppingConfig { patch_size: PatchSize::Uniform(4), ..CroppingConfig::default() };
//! let dataset = CroppingDataset::new(cases, None, None, config).expect("Dataset valide");
//! let loader = DataLoader::new(dataset, 2, SequentialSampler::new(), false, None);
//! for batch in loader {
//!     let batch = batch.expect("Pas d'erreur attendue");
//!     assert_eq!(batch.len(), 2);
//! }
//! ```
//!
//! ## Fonctionnalités principales
//!
//! - Batching automatique des données
//! - Sampling flexible via le trait `Sampler`, y compris les samplers pondérés mis à jour entre les epochs
//! - Fonction de collation personnalisable
//! - Option pour ignorer le dernier batch incomplet (`drop_last`)
//! - Récupération parallèle des items d'un batch (`rayon`)
//!
//! ## Types supportés
//!
//! Le DataLoader est générique sur le type de dataset (`D: Dataset`) et le sampler (`S: Sampler`).

use crate::datasets::{Dataset, PatchSample};
use crate::samplers::Sampler;
use medseg_core::MedsegError;
use ndarray::{ArrayD, ArrayViewD, Axis};
use rayon::prelude::*;

/// Type pour la fonction de collation personnalisée.
///
/// Cette fonction prend un vecteur de samples (issus du dataset) et retourne le batch transformé
/// (normalisation, augmentation, filtrage...).
pub type CollateFn<D> = Box<dyn Fn(Vec<<D as Dataset>::Item>) -> Result<Vec<<D as Dataset>::Item>, MedsegError> + Send + Sync>;

/// DataLoader générique pour le batching et le sampling de données.
///
/// # Paramètres de type
/// - `D`: Le type du dataset, qui doit implémenter le trait [`Dataset`].
/// - `S`: Le type du sampler, qui doit implémenter le trait [`Sampler`].
///
/// # Entre deux epochs
///
/// Les samplers pondérés changent leurs indices à chaque `update()`. La boucle d'entraînement
/// y accède via [`DataLoader::sampler_mut`] puis appelle [`DataLoader::reset`] pour relancer
/// l'itération sur les nouveaux indices.
pub struct DataLoader<D: Dataset, S: Sampler> {
    /// Le dataset source.
    pub dataset: D,
    /// La taille des batches.
    pub batch_size: usize,
    /// Le sampler utilisé pour générer les indices.
    pub sampler: S,
    /// Si vrai, le dernier batch est ignoré s'il est incomplet.
    pub drop_last: bool,
    /// Fonction de collation optionnelle appliquée à chaque batch.
    pub collate_fn: Option<CollateFn<D>>,
    /// Si vrai, les items d'un batch sont récupérés en parallèle.
    pub parallel: bool,
    indices_iter: Box<dyn Iterator<Item = usize> + Send + Sync>,
}

impl<D: Dataset, S: Sampler> DataLoader<D, S> {
    /// Crée un nouveau DataLoader.
    ///
    /// # Arguments
    /// - `dataset`: Le dataset à utiliser.
    /// - `batch_size`: La taille des batches.
    /// - `sampler`: Le sampler pour générer les indices.
    /// - `drop_last`: Si vrai, le dernier batch est ignoré s'il est incomplet.
    /// - `collate_fn`: Fonction de collation personnalisée (optionnelle).
    pub fn new(dataset: D, batch_size: usize, sampler: S, drop_last: bool, collate_fn: Option<CollateFn<D>>) -> Self {
        let indices_iter = sampler.iter(dataset.len());
        Self {
            dataset,
            batch_size: batch_size.max(1),
            sampler,
            drop_last,
            collate_fn,
            parallel: false,
            indices_iter,
        }
    }

    /// Active ou désactive la récupération parallèle des items.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Relance l'itération à partir des indices courants du sampler.
    ///
    /// À appeler au début de chaque epoch, après `update()` pour un sampler pondéré.
    pub fn reset(&mut self) {
        self.indices_iter = self.sampler.iter(self.dataset.len());
    }

    /// Accès au sampler, par exemple pour lui transmettre les pertes de chaque sample.
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Nombre de batches d'une epoch complète.
    pub fn num_batches(&self) -> usize {
        let samples = self.sampler.len(self.dataset.len());
        if self.drop_last {
            samples / self.batch_size
        } else {
            samples.div_ceil(self.batch_size)
        }
    }
}

impl<D: Dataset + Sync, S: Sampler> Iterator for DataLoader<D, S> {
    type Item = Result<Vec<<D as Dataset>::Item>, MedsegError>;

    /// Renvoie le prochain batch de données.
    ///
    /// # Retour
    /// - `Some(Ok(batch))` : Un batch de données prêt à l'emploi.
    /// - `Some(Err(e))` : Une erreur lors de la récupération d'un item.
    /// - `None` : Plus de données à itérer.
    fn next(&mut self) -> Option<Self::Item> {
        let indices: Vec<usize> = self.indices_iter.by_ref().take(self.batch_size).collect();
        if indices.is_empty() || (self.drop_last && indices.len() < self.batch_size) {
            return None;
        }
        let dataset = &self.dataset;
        let batch: Result<Vec<_>, MedsegError> = if self.parallel {
            indices.par_iter().map(|&idx| dataset.get(idx)).collect()
        } else {
            indices.iter().map(|&idx| dataset.get(idx)).collect()
        };
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => return Some(Err(e)),
        };
        if let Some(ref collate_fn) = self.collate_fn {
            Some(collate_fn(batch))
        } else {
            Some(Ok(batch))
        }
    }
}

/// Patches of one batch stacked along a new leading axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchBatch {
    /// `(batch, channels, *patch_size)`.
    pub inputs: ArrayD<f32>,
    /// `(batch, 1, *patch_size)` when every patch carries a target.
    pub targets: Option<ArrayD<u8>>,
    /// Global dataset index of every patch, in batch order.
    pub indices: Vec<usize>,
}

/// Stacks arrays of identical shape along a new leading axis.
///
/// # Errors
///
/// `ShapeMismatch` for an empty list or arrays of different shapes.
pub fn stack_patches<T: Clone>(patches: &[ArrayD<T>]) -> Result<ArrayD<T>, MedsegError> {
    let views: Vec<ArrayViewD<'_, T>> = patches.iter().map(|p| p.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| MedsegError::ShapeMismatch {
        expected: "patches of identical shape".to_string(),
        actual: e.to_string(),
        operation: "stack_patches".to_string(),
    })
}

/// Collates a batch of [`PatchSample`]s into stacked arrays.
///
/// Targets are stacked only when every sample has one.
pub fn collate_patches(samples: Vec<PatchSample>) -> Result<PatchBatch, MedsegError> {
    let indices = samples.iter().map(|s| s.index).collect();
    let inputs: Vec<ArrayD<f32>> = samples.iter().map(|s| s.inputs.clone()).collect();
    let targets: Option<Vec<ArrayD<u8>>> = samples.into_iter().map(|s| s.target).collect();
    Ok(PatchBatch {
        inputs: stack_patches(&inputs)?,
        targets: targets.map(|t| stack_patches(&t)).transpose()?,
        indices,
    })
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
