//! Binary classifier artifact: a small fully-connected network.

use serde::Deserialize;

/// Raw model output. Batch predictions nest, e.g. `[[p]]` for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Scalar(f64),
    Batch(Vec<ModelOutput>),
}

impl ModelOutput {
    /// First scalar in row-major order, if any.
    pub fn first(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Batch(items) => items.first().and_then(ModelOutput::first),
        }
    }
}

/// Anything that scores a preprocessed feature vector.
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    /// Run inference on a single feature vector.
    fn predict(&self, features: &[f64]) -> Result<ModelOutput, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

/// A dense layer. `weights[i][j]` connects input `i` to output `j`.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn outputs(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.weights) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        out.iter_mut()
            .for_each(|v| *v = self.activation.apply(*v));
        out
    }
}

/// Sequential stack of dense layers.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseNetwork {
    pub input_dim: usize,
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Check that layer shapes chain from `input_dim`.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }
        let mut width = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != width {
                return Err(format!(
                    "layer {idx}: expected {width} weight rows, found {}",
                    layer.weights.len()
                ));
            }
            if let Some(bad) = layer.weights.iter().position(|r| r.len() != layer.outputs()) {
                return Err(format!(
                    "layer {idx}: weight row {bad} has {} columns, bias has {}",
                    layer.weights[bad].len(),
                    layer.outputs()
                ));
            }
            width = layer.outputs();
        }
        if width == 0 {
            return Err("network produces no outputs".to_string());
        }
        Ok(())
    }
}

impl Model for DenseNetwork {
    fn name(&self) -> &str {
        "dense"
    }

    fn predict(&self, features: &[f64]) -> Result<ModelOutput, String> {
        if features.len() != self.input_dim {
            return Err(format!(
                "input shape mismatch: expected {} features, got {}",
                self.input_dim,
                features.len()
            ));
        }
        let mut activations = features.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        let row = activations.into_iter().map(ModelOutput::Scalar).collect();
        Ok(ModelOutput::Batch(vec![ModelOutput::Batch(row)]))
    }
}
