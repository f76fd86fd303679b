use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::{PassFailClassifier, PercentageRegressor, Predictor, Trainable, TrainedModels};
use crate::dataset::{Dataset, Feature, Outcome, StudentFeatures};
use crate::ml::FitError;
use crate::ml::forest::{DEFAULT_TREES, ForestOptions};
use crate::ml::metrics::{ConfusionMatrix, accuracy, mean_absolute_error, r2_score};
use crate::ml::split::{SplitError, train_test_split};
use crate::ml::tree::TreeOptions;

/// Training hyperparameters shared by both forests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    /// Seed for the split and for every tree.
    pub seed: u64,
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            n_trees: DEFAULT_TREES,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TrainOptions {
    pub fn forest_options(&self) -> ForestOptions {
        ForestOptions {
            n_trees: self.n_trees,
            seed: self.seed,
            bootstrap: true,
            tree: TreeOptions {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
                ..TreeOptions::default()
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("split failed: {0}")]
    Split(#[from] SplitError),
    #[error("classifier training failed: {0}")]
    Classifier(FitError),
    #[error("regressor training failed: {0}")]
    Regressor(FitError),
}

/// Split, fit both forests on the same training rows and score them on the
/// held-out rows.
pub fn train_models(dataset: &Dataset, options: &TrainOptions) -> Result<TrainedModels, TrainError> {
    let started = Instant::now();
    let records = dataset.records();
    let split = train_test_split(records.len(), options.test_fraction, options.seed)?;

    let pick_features = |rows: &[usize]| -> Vec<StudentFeatures> {
        rows.iter().map(|&idx| records[idx].features).collect()
    };
    let train_x = pick_features(&split.train);
    let test_x = pick_features(&split.test);
    let train_outcomes: Vec<Outcome> = split.train.iter().map(|&idx| records[idx].outcome).collect();
    let train_percentages: Vec<f64> = split
        .train
        .iter()
        .map(|&idx| records[idx].semester_percentage)
        .collect();

    let forest = options.forest_options();
    let classifier = PassFailClassifier::train(&train_x, &train_outcomes, &forest)
        .map_err(TrainError::Classifier)?;
    let regressor = PercentageRegressor::train(&train_x, &train_percentages, &forest)
        .map_err(TrainError::Regressor)?;

    let truth_labels: Vec<usize> = split
        .test
        .iter()
        .map(|&idx| records[idx].outcome.index())
        .collect();
    let predicted_labels: Vec<usize> = test_x
        .iter()
        .map(|features| classifier.predict(features).index())
        .collect();
    let cm = ConfusionMatrix::from_labels(Outcome::ALL.len(), &truth_labels, &predicted_labels);

    let truth_percentages: Vec<f64> = split
        .test
        .iter()
        .map(|&idx| records[idx].semester_percentage)
        .collect();
    let predicted_percentages: Vec<f64> = test_x
        .iter()
        .map(|features| regressor.predict(features))
        .collect();

    let models = TrainedModels {
        model_version: super::MODEL_VERSION,
        feature_names: Feature::column_names(),
        dataset: dataset.fingerprint(),
        options: *options,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        accuracy: accuracy(&cm),
        r2: r2_score(&truth_percentages, &predicted_percentages),
        mae: mean_absolute_error(&truth_percentages, &predicted_percentages),
        confusion: cm.counts.clone(),
        classifier,
        regressor,
    };
    info!(
        train_rows = models.train_rows,
        test_rows = models.test_rows,
        accuracy = models.accuracy,
        r2 = models.r2,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Trained pass/fail classifier and percentage regressor"
    );
    Ok(models)
}
