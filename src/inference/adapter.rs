//! Inference adapter: normalized record → preprocessor → model → probability.

use tokio::sync::Mutex;
use tracing::debug;

use crate::assets::Assets;
use crate::error::PredictError;
use crate::features::NormalizedRecord;

/// Runs the loaded assets on a single record.
pub struct InferenceAdapter {
    assets: Assets,
    /// Present when the model must not be called concurrently.
    model_lock: Option<Mutex<()>>,
}

impl InferenceAdapter {
    pub fn new(assets: Assets, serialize_inference: bool) -> Self {
        Self {
            assets,
            model_lock: serialize_inference.then(|| Mutex::new(())),
        }
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Produce the positive-class probability for one record.
    pub async fn infer(&self, record: &NormalizedRecord) -> Result<f64, PredictError> {
        let features = self
            .assets
            .preprocessor
            .transform(record)
            .map_err(PredictError::Preprocessing)?;
        debug!(width = features.len(), "Record preprocessed");

        let output = {
            let _guard = match &self.model_lock {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };
            self.assets
                .model
                .predict(&features)
                .map_err(PredictError::Inference)?
        };

        extract_probability(output.first())
    }
}

fn extract_probability(value: Option<f64>) -> Result<f64, PredictError> {
    match value {
        None => Err(PredictError::OutputFormat(
            "model returned an empty output".to_string(),
        )),
        Some(p) if !p.is_finite() => Err(PredictError::OutputFormat(format!(
            "model returned non-finite value {p}"
        ))),
        Some(p) if !(0.0..=1.0).contains(&p) => Err(PredictError::OutputFormat(format!(
            "model returned {p}, outside [0, 1]"
        ))),
        Some(p) => Ok(p),
    }
}
