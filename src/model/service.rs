use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::train::{TrainError, TrainOptions, train_models};
use super::{Prediction, TrainedModels};
use crate::config::{self, ConfigError};
use crate::dataset::{Dataset, DatasetFingerprint, DatasetLoadError, StudentFeatures, load_dataset};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("models are not trained yet")]
    ModelNotReady,
}

/// Startup failures; any of them halts the application.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),
    #[error(transparent)]
    Train(#[from] TrainError),
}

/// Owns the trained model pair and serves predictions from it.
///
/// The service starts untrained and becomes trained once a bundle is fitted or
/// handed in; there is no way back. Training is memoized on the dataset
/// fingerprint: calling [`PredictionService::train_once`] again with the same
/// snapshot reuses the cached bundle.
#[derive(Debug)]
pub struct PredictionService {
    options: TrainOptions,
    models: Option<TrainedModels>,
    training_runs: usize,
}

impl PredictionService {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            models: None,
            training_runs: 0,
        }
    }

    /// Serve a bundle trained elsewhere, e.g. loaded from JSON.
    pub fn with_models(models: TrainedModels) -> Self {
        Self {
            options: models.options,
            models: Some(models),
            training_runs: 0,
        }
    }

    /// Load the dataset at `path` and train on it.
    pub fn from_dataset_path(path: &Path, options: TrainOptions) -> Result<Self, ServiceError> {
        let dataset = load_dataset(path)?;
        let mut service = Self::new(options);
        service.train_once(&dataset)?;
        Ok(service)
    }

    /// Load settings, pick the dataset and train on it.
    ///
    /// `dataset` takes precedence over the configured path. Unreadable
    /// settings abort startup instead of falling back to defaults.
    pub fn from_settings(dataset: Option<PathBuf>) -> Result<Self, ServiceError> {
        let config = config::load_or_default()?;
        let dataset = dataset.unwrap_or(config.dataset_path);
        Self::from_dataset_path(&dataset, config.training)
    }

    /// Train unless a bundle for this exact dataset snapshot already exists.
    pub fn train_once(&mut self, dataset: &Dataset) -> Result<&TrainedModels, TrainError> {
        let fingerprint = dataset.fingerprint();
        let models = match self.models.take() {
            Some(models) if models.dataset == fingerprint => {
                debug!(%fingerprint, "Reusing trained models");
                models
            }
            previous => {
                if previous.is_some() {
                    warn!(%fingerprint, "Dataset changed; retraining models");
                }
                match train_models(dataset, &self.options) {
                    Ok(models) => {
                        self.training_runs += 1;
                        info!(%fingerprint, runs = self.training_runs, "Models ready");
                        models
                    }
                    Err(err) => {
                        self.models = previous;
                        return Err(err);
                    }
                }
            }
        };
        Ok(&*self.models.insert(models))
    }

    pub fn predict(&self, features: &StudentFeatures) -> Result<Prediction, PredictError> {
        let models = self.models().ok_or(PredictError::ModelNotReady)?;
        let prediction = models.predict(features);
        debug!(
            percentage = prediction.percentage,
            outcome = %prediction.outcome,
            "Served prediction"
        );
        Ok(prediction)
    }

    pub fn models(&self) -> Option<&TrainedModels> {
        self.models.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.models().is_some()
    }

    /// Fingerprint of the dataset behind the current bundle.
    pub fn dataset(&self) -> Option<DatasetFingerprint> {
        self.models().map(|models| models.dataset)
    }

    /// Number of times this service actually fitted models.
    pub fn training_runs(&self) -> usize {
        self.training_runs
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }
}
