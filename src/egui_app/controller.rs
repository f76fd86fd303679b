use tracing::{info, warn};

use crate::form::StudentForm;
use crate::model::{Prediction, PredictionService, TrainedModels};

/// Bridges the form state to the prediction service.
///
/// The desktop entry point only builds one from a trained service, so the form
/// is never shown without models behind it.
pub struct PredictorController {
    service: PredictionService,
    pub form: StudentForm,
    last_prediction: Option<Prediction>,
    status: Option<String>,
}

impl PredictorController {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service,
            form: StudentForm::default(),
            last_prediction: None,
            status: None,
        }
    }

    pub fn models(&self) -> Option<&TrainedModels> {
        self.service.models()
    }

    /// Run both models on the current form and keep the result for display.
    pub fn predict(&mut self) -> Option<Prediction> {
        let features = self.form.to_features();
        match self.service.predict(&features) {
            Ok(prediction) => {
                info!(
                    percentage = prediction.percentage,
                    outcome = %prediction.outcome,
                    "Prediction requested from form"
                );
                self.status = None;
                self.last_prediction = Some(prediction);
            }
            Err(err) => {
                warn!("Prediction failed: {err}");
                self.status = Some(format!("Prediction failed: {err}"));
                self.last_prediction = None;
            }
        }
        self.last_prediction
    }

    pub fn last_prediction(&self) -> Option<Prediction> {
        self.last_prediction
    }

    /// Forget the shown result, e.g. after the form changed.
    pub fn clear_prediction(&mut self) {
        self.last_prediction = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }
}
