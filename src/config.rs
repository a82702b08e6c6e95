//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// How the fitted scaler is applied to a normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessingStrategy {
    /// Scaler was fitted on all 13 schema columns; every value must be numeric.
    Direct,
    /// Scaler was fitted on the continuous columns only; the rest are zero-filled.
    ColumnSplit,
}

impl PreprocessingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::ColumnSplit => "column-split",
        }
    }
}

/// What to do with a categorical value that is neither a known label nor numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Forward the raw text; the preprocessor decides.
    PassThrough,
    /// Downgrade to the missing marker.
    Missing,
    /// Fail the request with a 400.
    Reject,
}

/// Key set used when rendering a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKeys {
    English,
    Spanish,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Serialized model artifact.
    pub model_path: PathBuf,
    /// Serialized preprocessing artifact.
    pub preprocessor_path: PathBuf,
    pub preprocessing: PreprocessingStrategy,
    pub unknown_category: UnknownCategoryPolicy,
    /// Reject requests that omit any schema field.
    pub require_all_fields: bool,
    /// Hold a lock around model inference (for models that are not safe to call concurrently).
    pub serialize_inference: bool,
    pub response_keys: ResponseKeys,
    /// Directory for daily-rolling log files. Stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            model_path: PathBuf::from("model_files/model.json"),
            preprocessor_path: PathBuf::from("model_files/scaler.json"),
            preprocessing: PreprocessingStrategy::Direct,
            unknown_category: UnknownCategoryPolicy::PassThrough,
            require_all_fields: true,
            serialize_inference: false,
            response_keys: ResponseKeys::English,
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Build config from `LIVER_RISK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let preprocessing = match get("LIVER_RISK_PREPROCESSING").as_deref() {
            None => defaults.preprocessing,
            Some("direct") => PreprocessingStrategy::Direct,
            Some("column-split") => PreprocessingStrategy::ColumnSplit,
            Some(other) => return Err(invalid("LIVER_RISK_PREPROCESSING", other)),
        };

        let unknown_category = match get("LIVER_RISK_UNKNOWN_CATEGORY").as_deref() {
            None => defaults.unknown_category,
            Some("pass-through") => UnknownCategoryPolicy::PassThrough,
            Some("missing") => UnknownCategoryPolicy::Missing,
            Some("reject") => UnknownCategoryPolicy::Reject,
            Some(other) => return Err(invalid("LIVER_RISK_UNKNOWN_CATEGORY", other)),
        };

        let response_keys = match get("LIVER_RISK_RESPONSE_KEYS").as_deref() {
            None => defaults.response_keys,
            Some("english") => ResponseKeys::English,
            Some("spanish") => ResponseKeys::Spanish,
            Some(other) => return Err(invalid("LIVER_RISK_RESPONSE_KEYS", other)),
        };

        let require_all_fields = parse_bool(
            "LIVER_RISK_REQUIRE_ALL_FIELDS",
            get("LIVER_RISK_REQUIRE_ALL_FIELDS"),
            defaults.require_all_fields,
        )?;
        let serialize_inference = parse_bool(
            "LIVER_RISK_SERIALIZE_INFERENCE",
            get("LIVER_RISK_SERIALIZE_INFERENCE"),
            defaults.serialize_inference,
        )?;

        Ok(Self {
            bind_addr: get("LIVER_RISK_BIND_ADDR").unwrap_or(defaults.bind_addr),
            model_path: get("LIVER_RISK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            preprocessor_path: get("LIVER_RISK_PREPROCESSOR_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preprocessor_path),
            preprocessing,
            unknown_category,
            require_all_fields,
            serialize_inference,
            response_keys,
            log_dir: get("LIVER_RISK_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("unrecognized value {:?}", value),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(invalid(key, other)),
    }
}
