//! Fitted standard-scaling transform and the two ways of applying it.

use serde::Deserialize;

use crate::features::{Feature, FeatureValue, NormalizedRecord};

/// Maps a normalized record to the numeric vector the model expects.
pub trait Preprocessor: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn name(&self) -> &str;

    /// Transform one record. The error string describes why the input was rejected.
    fn transform(&self, record: &NormalizedRecord) -> Result<Vec<f64>, String>;
}

/// Per-column `(x - mean) / scale`, as fitted offline.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check internal consistency of a deserialized scaler.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.columns.len();
        if n == 0 {
            return Err("scaler has no columns".to_string());
        }
        if self.mean.len() != n || self.scale.len() != n {
            return Err(format!(
                "scaler shape mismatch: {} columns, {} means, {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            ));
        }
        for (column, (&m, &s)) in self.columns.iter().zip(self.mean.iter().zip(&self.scale)) {
            if !m.is_finite() {
                return Err(format!("non-finite mean for column {column}"));
            }
            if !s.is_finite() || s == 0.0 {
                return Err(format!("invalid scale {s} for column {column}"));
            }
        }
        Ok(())
    }

    /// Fail unless the scaler was fitted on exactly these columns, in this order.
    pub fn expect_columns(&self, features: &[Feature]) -> Result<(), String> {
        let expected: Vec<&str> = features.iter().map(Feature::name).collect();
        if self.columns.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(format!(
                "scaler columns {:?} do not match expected {:?}",
                self.columns, expected
            ));
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, String> {
        if row.len() != self.columns.len() {
            return Err(format!(
                "expected {} values, got {}",
                self.columns.len(),
                row.len()
            ));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

fn require_number(feature: Feature, value: &FeatureValue) -> Result<f64, String> {
    match value {
        FeatureValue::Number(n) => Ok(*n),
        FeatureValue::Missing => Err(format!("{feature} is missing")),
        FeatureValue::Text(t) => Err(format!("could not convert {t:?} in {feature} to float")),
    }
}

/// The scaler covers every schema column.
#[derive(Debug, Clone)]
pub struct DirectScaling {
    scaler: StandardScaler,
}

impl DirectScaling {
    pub fn new(scaler: StandardScaler) -> Result<Self, String> {
        scaler.validate()?;
        scaler.expect_columns(&Feature::ALL)?;
        Ok(Self { scaler })
    }
}

impl Preprocessor for DirectScaling {
    fn name(&self) -> &str {
        "direct"
    }

    fn transform(&self, record: &NormalizedRecord) -> Result<Vec<f64>, String> {
        let row = record
            .iter()
            .map(|(f, v)| require_number(f, v))
            .collect::<Result<Vec<_>, _>>()?;
        self.scaler.transform_row(&row)
    }
}

/// The scaler covers the continuous columns only. Remaining columns follow
/// unscaled in schema order, with missing values filled as 0.
#[derive(Debug, Clone)]
pub struct ColumnSplitScaling {
    scaler: StandardScaler,
}

impl ColumnSplitScaling {
    pub fn new(scaler: StandardScaler) -> Result<Self, String> {
        scaler.validate()?;
        scaler.expect_columns(&Feature::CONTINUOUS)?;
        Ok(Self { scaler })
    }
}

impl Preprocessor for ColumnSplitScaling {
    fn name(&self) -> &str {
        "column-split"
    }

    fn transform(&self, record: &NormalizedRecord) -> Result<Vec<f64>, String> {
        let continuous = Feature::CONTINUOUS
            .iter()
            .map(|&f| require_number(f, record.get(f)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = self.scaler.transform_row(&continuous)?;

        for (feature, value) in record.iter() {
            if Feature::CONTINUOUS.contains(&feature) {
                continue;
            }
            out.push(match value {
                FeatureValue::Missing => 0.0,
                other => require_number(feature, other)?,
            });
        }
        Ok(out)
    }
}
