//! Per-request prediction pipeline.
//!
//! `RiskPredictor` ties the pieces together for one request:
//! field check → normalize → unknown-category policy → inference → response.

pub mod adapter;
pub mod response;

pub use adapter::InferenceAdapter;
pub use response::{
    HIGH_RISK_MESSAGE, LOW_RISK_MESSAGE, RISK_THRESHOLD_PERCENT, RiskAssessment, build_response,
};

use tracing::{debug, info};

use crate::assets::Assets;
use crate::config::{ServiceConfig, UnknownCategoryPolicy};
use crate::error::PredictError;
use crate::features::{Feature, FeatureValue, NormalizedRecord, RawRequest, normalize};

/// Request-level options taken from [`ServiceConfig`].
#[derive(Debug, Clone, Copy)]
pub struct PredictorOptions {
    pub unknown_category: UnknownCategoryPolicy,
    pub require_all_fields: bool,
    pub serialize_inference: bool,
}

impl From<&ServiceConfig> for PredictorOptions {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            unknown_category: config.unknown_category,
            require_all_fields: config.require_all_fields,
            serialize_inference: config.serialize_inference,
        }
    }
}

/// Shared, read-only prediction service.
pub struct RiskPredictor {
    adapter: InferenceAdapter,
    options: PredictorOptions,
}

impl RiskPredictor {
    pub fn new(assets: Assets, options: PredictorOptions) -> Self {
        Self {
            adapter: InferenceAdapter::new(assets, options.serialize_inference),
            options,
        }
    }

    pub fn preprocessor_name(&self) -> &str {
        self.adapter.assets().preprocessor.name()
    }

    /// Score one raw request.
    pub async fn predict(&self, raw: &RawRequest) -> Result<RiskAssessment, PredictError> {
        if self.options.require_all_fields {
            let missing: Vec<String> = Feature::ALL
                .iter()
                .filter(|f| !raw.contains_key(f.name()))
                .map(|f| f.name().to_string())
                .collect();
            if !missing.is_empty() {
                return Err(PredictError::MissingFields { missing });
            }
        }

        let mut record = normalize(raw);
        self.apply_category_policy(&mut record)?;
        debug!(missing = ?record.missing_features(), "Request normalized");

        let probability = self.adapter.infer(&record).await?;
        let assessment = build_response(probability);
        info!(
            probability,
            risk_percent = assessment.risk_percent,
            high_risk = assessment.is_high_risk(),
            "Prediction complete"
        );
        Ok(assessment)
    }

    fn apply_category_policy(&self, record: &mut NormalizedRecord) -> Result<(), PredictError> {
        let unrecognized: Vec<(Feature, String)> = record
            .unrecognized()
            .into_iter()
            .map(|(f, t)| (f, t.to_string()))
            .collect();

        match self.options.unknown_category {
            UnknownCategoryPolicy::PassThrough => {}
            UnknownCategoryPolicy::Missing => {
                for (feature, _) in unrecognized {
                    record.set(feature, FeatureValue::Missing);
                }
            }
            UnknownCategoryPolicy::Reject => {
                if let Some((feature, value)) = unrecognized.into_iter().next() {
                    return Err(PredictError::UnknownCategory {
                        field: feature.name().to_string(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}
