//! Error types for the hepatic risk service.

use std::path::PathBuf;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Startup-time artifact errors. Both are fatal.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("{kind} not found at {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("Failed to load {kind} from {}: {reason}", path.display())]
    Load {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
}

/// Per-request errors raised anywhere in the prediction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Missing fields in request: {}", missing.join(", "))]
    MissingFields { missing: Vec<String> },

    #[error("Unrecognized value {value:?} for categorical field {field}")]
    UnknownCategory { field: String, value: String },

    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unexpected model output: {0}")]
    OutputFormat(String),
}

impl PredictError {
    /// Whether the failure is the caller's fault (4xx) rather than the service's (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest(_) | Self::MissingFields { .. } | Self::UnknownCategory { .. }
        )
    }
}
