//! Asset loading — the model and preprocessing artifacts, read once at startup.
//!
//! Both artifacts are JSON documents. A missing file is reported as
//! [`AssetError::NotFound`]; anything else that goes wrong while reading,
//! parsing, or validating is [`AssetError::Load`]. Neither is retried.

pub mod model;
pub mod scaler;

pub use model::{Activation, DenseLayer, DenseNetwork, Model, ModelOutput};
pub use scaler::{ColumnSplitScaling, DirectScaling, Preprocessor, StandardScaler};

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::{PreprocessingStrategy, ServiceConfig};
use crate::error::AssetError;

const MODEL: &str = "model";
const PREPROCESSOR: &str = "preprocessor";

/// Immutable, process-wide inference assets.
#[derive(Clone)]
pub struct Assets {
    pub model: Arc<dyn Model>,
    pub preprocessor: Arc<dyn Preprocessor>,
}

impl Assets {
    pub fn new(model: Arc<dyn Model>, preprocessor: Arc<dyn Preprocessor>) -> Self {
        Self {
            model,
            preprocessor,
        }
    }
}

impl std::fmt::Debug for Assets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assets")
            .field("model", &self.model.name())
            .field("preprocessor", &self.preprocessor.name())
            .finish()
    }
}

/// Load both artifacts from the configured paths.
pub fn load(config: &ServiceConfig) -> Result<Assets, AssetError> {
    // Both paths are checked before either file is parsed.
    ensure_exists(MODEL, &config.model_path)?;
    ensure_exists(PREPROCESSOR, &config.preprocessor_path)?;

    let network: DenseNetwork = read_json(MODEL, &config.model_path)?;
    network
        .validate()
        .map_err(|reason| load_error(MODEL, &config.model_path, reason))?;

    let scaler: StandardScaler = read_json(PREPROCESSOR, &config.preprocessor_path)?;
    let preprocessor: Arc<dyn Preprocessor> = match config.preprocessing {
        PreprocessingStrategy::Direct => Arc::new(DirectScaling::new(scaler).map_err(
            |reason| load_error(PREPROCESSOR, &config.preprocessor_path, reason),
        )?),
        PreprocessingStrategy::ColumnSplit => Arc::new(ColumnSplitScaling::new(scaler).map_err(
            |reason| load_error(PREPROCESSOR, &config.preprocessor_path, reason),
        )?),
    };

    info!(
        model = %config.model_path.display(),
        preprocessor = %config.preprocessor_path.display(),
        strategy = config.preprocessing.as_str(),
        layers = network.layers.len(),
        "Inference assets loaded"
    );

    Ok(Assets::new(Arc::new(network), preprocessor))
}

fn ensure_exists(kind: &'static str, path: &Path) -> Result<(), AssetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AssetError::NotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn read_json<T: DeserializeOwned>(kind: &'static str, path: &Path) -> Result<T, AssetError> {
    let bytes = std::fs::read(path).map_err(|e| load_error(kind, path, e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| load_error(kind, path, e.to_string()))
}

fn load_error(kind: &'static str, path: &Path, reason: String) -> AssetError {
    AssetError::Load {
        kind,
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::features::Feature;

    fn write(dir: &TempDir, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
        path
    }

    fn model_json(input_dim: usize) -> serde_json::Value {
        json!({
            "input_dim": input_dim,
            "layers": [{
                "weights": vec![vec![0.1]; input_dim],
                "bias": [0.0],
                "activation": "sigmoid"
            }]
        })
    }

    fn scaler_json(features: &[Feature]) -> serde_json::Value {
        json!({
            "columns": features.iter().map(|f| f.name()).collect::<Vec<_>>(),
            "mean": vec![0.0; features.len()],
            "scale": vec![1.0; features.len()],
        })
    }

    fn config(dir: &TempDir, strategy: PreprocessingStrategy) -> ServiceConfig {
        ServiceConfig {
            model_path: dir.path().join("model.json"),
            preprocessor_path: dir.path().join("scaler.json"),
            preprocessing: strategy,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn loads_valid_artifacts() {
        let dir = TempDir::new().unwrap();
        write(&dir, "model.json", &model_json(13));
        write(&dir, "scaler.json", &scaler_json(&Feature::ALL));

        let assets = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap();
        assert_eq!(assets.model.name(), "dense");
        assert_eq!(assets.preprocessor.name(), "direct");
    }

    #[test]
    fn loads_column_split_scaler() {
        let dir = TempDir::new().unwrap();
        write(&dir, "model.json", &model_json(13));
        write(&dir, "scaler.json", &scaler_json(&Feature::CONTINUOUS));

        let assets = load(&config(&dir, PreprocessingStrategy::ColumnSplit)).unwrap();
        assert_eq!(assets.preprocessor.name(), "column-split");
    }

    #[test]
    fn missing_model_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(&dir, "scaler.json", &scaler_json(&Feature::ALL));

        let err = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { kind: "model", .. }));
    }

    #[test]
    fn missing_preprocessor_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(&dir, "model.json", &model_json(13));

        let err = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap_err();
        assert!(matches!(
            err,
            AssetError::NotFound {
                kind: "preprocessor",
                ..
            }
        ));
    }

    #[test]
    fn corrupt_model_is_load_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("model.json"), b"\x80HDF\r\n").unwrap();
        write(&dir, "scaler.json", &scaler_json(&Feature::ALL));

        let err = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap_err();
        assert!(matches!(err, AssetError::Load { kind: "model", .. }));
    }

    #[test]
    fn inconsistent_model_shape_is_load_error() {
        let dir = TempDir::new().unwrap();
        let mut model = model_json(13);
        model["input_dim"] = json!(12);
        write(&dir, "model.json", &model);
        write(&dir, "scaler.json", &scaler_json(&Feature::ALL));

        let err = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap_err();
        assert!(matches!(err, AssetError::Load { kind: "model", .. }));
    }

    #[test]
    fn scaler_strategy_mismatch_is_load_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "model.json", &model_json(13));
        write(&dir, "scaler.json", &scaler_json(&Feature::CONTINUOUS));

        let err = load(&config(&dir, PreprocessingStrategy::Direct)).unwrap_err();
        assert!(matches!(
            err,
            AssetError::Load {
                kind: "preprocessor",
                ..
            }
        ));
    }
}
