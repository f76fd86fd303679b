//! Trained model pair and the service that serves predictions from it.
//!
//! Both models consume [`StudentFeatures`] directly; positional rows are built
//! inside this module only, through [`StudentFeatures::to_row`].

mod service;
mod train;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{DatasetFingerprint, Feature, Outcome, StudentFeatures};
use crate::ml::FitError;
use crate::ml::forest::{ForestOptions, RandomForestClassifier, RandomForestRegressor};
use crate::ml::metrics::ConfusionMatrix;

pub use service::{PredictError, PredictionService, ServiceError};
pub use train::{TrainError, TrainOptions, train_models};

/// Serialized bundle format version.
pub const MODEL_VERSION: i64 = 1;

/// Fit a model on named feature records.
pub trait Trainable: Sized {
    type Target;

    fn train(
        features: &[StudentFeatures],
        targets: &[Self::Target],
        options: &ForestOptions,
    ) -> Result<Self, FitError>;
}

/// Predict from one query vector.
pub trait Predictor {
    type Output;

    fn predict(&self, features: &StudentFeatures) -> Self::Output;
}

fn feature_rows(features: &[StudentFeatures]) -> Vec<Vec<f64>> {
    features.iter().map(|f| f.to_row().to_vec()).collect()
}

/// Pass/fail random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassFailClassifier {
    forest: RandomForestClassifier,
}

impl PassFailClassifier {
    /// Probability of [`Outcome::Pass`].
    pub fn pass_probability(&self, features: &StudentFeatures) -> f64 {
        self.forest
            .predict_proba(&features.to_row())
            .get(Outcome::Pass.index())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn forest(&self) -> &RandomForestClassifier {
        &self.forest
    }
}

impl Trainable for PassFailClassifier {
    type Target = Outcome;

    fn train(
        features: &[StudentFeatures],
        targets: &[Outcome],
        options: &ForestOptions,
    ) -> Result<Self, FitError> {
        let labels: Vec<usize> = targets.iter().map(|outcome| outcome.index()).collect();
        let forest = RandomForestClassifier::fit(
            &feature_rows(features),
            &labels,
            Outcome::ALL.len(),
            options,
        )?;
        Ok(Self { forest })
    }
}

impl Predictor for PassFailClassifier {
    type Output = Outcome;

    fn predict(&self, features: &StudentFeatures) -> Outcome {
        let idx = self.forest.predict(&features.to_row());
        Outcome::from_index(idx).unwrap_or(Outcome::Fail)
    }
}

/// Semester percentage random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageRegressor {
    forest: RandomForestRegressor,
}

impl PercentageRegressor {
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }
}

impl Trainable for PercentageRegressor {
    type Target = f64;

    fn train(
        features: &[StudentFeatures],
        targets: &[f64],
        options: &ForestOptions,
    ) -> Result<Self, FitError> {
        let forest = RandomForestRegressor::fit(&feature_rows(features), targets, options)?;
        Ok(Self { forest })
    }
}

impl Predictor for PercentageRegressor {
    type Output = f64;

    fn predict(&self, features: &StudentFeatures) -> f64 {
        self.forest.predict(&features.to_row())
    }
}

/// Point prediction for one student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub percentage: f64,
    pub outcome: Outcome,
}

/// Immutable result of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModels {
    pub model_version: i64,
    /// Feature columns in the order the forests were trained on.
    pub feature_names: Vec<String>,
    /// Snapshot the models were trained on.
    pub dataset: DatasetFingerprint,
    pub options: TrainOptions,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Held-out pass/fail accuracy in `[0, 1]`.
    pub accuracy: f64,
    /// Held-out R² of the percentage regressor.
    pub r2: f64,
    /// Held-out mean absolute error in percentage points.
    pub mae: f64,
    /// Held-out confusion counts, `truth * 2 + predicted` over [`Outcome::ALL`].
    pub confusion: Vec<u32>,
    pub classifier: PassFailClassifier,
    pub regressor: PercentageRegressor,
}

#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported model version {0}")]
    Version(i64),
    #[error("model features {found:?} do not match {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("invalid model: {0}")]
    Invalid(String),
}

impl TrainedModels {
    pub fn predict(&self, features: &StudentFeatures) -> Prediction {
        Prediction {
            percentage: self.regressor.predict(features),
            outcome: self.classifier.predict(features),
        }
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix {
            n_classes: Outcome::ALL.len(),
            counts: self.confusion.clone(),
        }
    }

    /// Check the bundle was trained on the current feature layout.
    pub fn validate(&self) -> Result<(), ModelIoError> {
        if self.model_version != MODEL_VERSION {
            return Err(ModelIoError::Version(self.model_version));
        }
        let expected = Feature::column_names();
        if self.feature_names != expected {
            return Err(ModelIoError::FeatureMismatch {
                expected,
                found: self.feature_names.clone(),
            });
        }
        if self.confusion.len() != Outcome::ALL.len() * Outcome::ALL.len() {
            return Err(ModelIoError::Invalid("confusion matrix size".to_string()));
        }
        if self.classifier.forest.n_classes() != Outcome::ALL.len() {
            return Err(ModelIoError::Invalid("classifier class count".to_string()));
        }
        self.classifier
            .forest
            .validate()
            .map_err(ModelIoError::Invalid)?;
        self.regressor
            .forest
            .validate()
            .map_err(ModelIoError::Invalid)?;
        Ok(())
    }

    pub fn save_json(&self, path: &Path) -> Result<(), ModelIoError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, ModelIoError> {
        let bytes = std::fs::read(path)?;
        let models: Self = serde_json::from_slice(&bytes)?;
        models.validate()?;
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, StudentRecord};
    use tempfile::tempdir;

    fn record(i: usize) -> StudentRecord {
        let attendance = 50.0 + (i % 50) as f64;
        let mids = (i * 13 % 100) as f64;
        let percentage = (0.4 * attendance + 0.6 * mids).clamp(0.0, 100.0);
        StudentRecord {
            features: StudentFeatures {
                attendance,
                previous_cgpa: (i % 10) as f64,
                study_hours: (i % 7) as f64,
                assignments: (i * 3 % 100) as f64,
                mid1_marks: mids / 2.0,
                mid2_marks: mids / 2.0,
                quiz_scores: (i % 30) as f64,
            },
            outcome: if percentage >= 40.0 {
                Outcome::Pass
            } else {
                Outcome::Fail
            },
            semester_percentage: percentage,
        }
    }

    fn quick_models() -> TrainedModels {
        let dataset = Dataset::from_records((0..60).map(record).collect());
        let options = TrainOptions {
            n_trees: 8,
            ..TrainOptions::default()
        };
        train_models(&dataset, &options).unwrap()
    }

    #[test]
    fn bundle_records_training_context() {
        let models = quick_models();
        assert_eq!(models.train_rows, 48);
        assert_eq!(models.test_rows, 12);
        assert_eq!(models.feature_names, Feature::column_names());
        assert_eq!(models.classifier.forest().trees().len(), 8);
        assert_eq!(models.regressor.forest().trees().len(), 8);
        assert_eq!(models.classifier.forest().n_features(), 7);
        let total: u32 = models.confusion_matrix().counts.iter().sum();
        assert_eq!(total as usize, models.test_rows);
        assert!((0.0..=1.0).contains(&models.accuracy));
    }

    #[test]
    fn json_round_trip_preserves_predictions() {
        let models = quick_models();
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("models.json");
        models.save_json(&path).unwrap();
        let loaded = TrainedModels::load_json(&path).unwrap();
        let query = record(7).features;
        let before = models.predict(&query);
        let after = loaded.predict(&query);
        assert_eq!(after.outcome, before.outcome);
        assert!((after.percentage - before.percentage).abs() < 1e-9);
        assert_eq!(loaded.dataset, models.dataset);
    }

    #[test]
    fn load_rejects_reordered_features() {
        let mut models = quick_models();
        models.feature_names.swap(4, 6);
        let dir = tempdir().unwrap();
        let path = dir.path().join("models.json");
        models.save_json(&path).unwrap();
        assert!(matches!(
            TrainedModels::load_json(&path),
            Err(ModelIoError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn pass_probability_agrees_with_label() {
        let models = quick_models();
        for i in 0..60 {
            let features = record(i).features;
            let p = models.classifier.pass_probability(&features);
            assert!((0.0..=1.0).contains(&p));
            if p > 0.5 {
                assert_eq!(models.classifier.predict(&features), Outcome::Pass);
            } else if p < 0.5 {
                assert_eq!(models.classifier.predict(&features), Outcome::Fail);
            }
        }
    }
}
